use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::{Context, source::SourceError};

use super::BackupService;

/// A cleanup step that failed. Never escalated, only logged and reported.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum CleanupWarning {
    #[error("Could not remove staging file {path:?}: {source}")]
    StagingFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not delete snapshot '{snapshot}' from the source: {source}")]
    RemoteSnapshot {
        snapshot: String,
        #[source]
        source: SourceError,
    },
}

impl BackupService {
    /// Remove the staging file and the remote snapshot, if they were created.
    pub(super) async fn cleanup(
        &self,
        context: &mut Context,
        staging_file: Option<&Path>,
        snapshot: Option<&str>,
    ) -> Vec<CleanupWarning> {
        context.current_context = "Cleanup";

        let mut warnings = Vec::new();

        if let Some(path) = staging_file {
            match fs::remove_file(path).await {
                Ok(()) => info!("{context}Removed staging file {path:?}"),
                Err(error) if error.kind() == ErrorKind::NotFound => {
                    debug!("{context}Staging file {path:?} was never written");
                }
                Err(error) => {
                    let warning = CleanupWarning::StagingFile {
                        path: path.to_path_buf(),
                        source: error,
                    };
                    warn!("{context}{warning}");
                    warnings.push(warning);
                }
            }
        }

        if let Some(snapshot) = snapshot {
            match self
                .source
                .delete_snapshot(&context.collection, snapshot)
                .await
            {
                Ok(()) => info!("{context}Deleted snapshot from the source"),
                Err(error) => {
                    let warning = CleanupWarning::RemoteSnapshot {
                        snapshot: snapshot.to_string(),
                        source: error,
                    };
                    warn!("{context}{warning}");
                    warnings.push(warning);
                }
            }
        }

        warnings
    }
}
