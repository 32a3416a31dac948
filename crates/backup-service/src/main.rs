//! # Backup service
//! The HTTP service that backs up Qdrant collections to object storage.
//!

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::{path::PathBuf, sync::Arc};

use backup_service::{
    BackupService, Config, PipelineSettings,
    destination::{Destination, GcsBucket, LocalDirectory},
    server,
    source::Qdrant,
};
use mimalloc::MiMalloc;
use shared::{Fatal, ProcessEnvironment, env::string_or, init_logger};
use tokio::{fs, net::TcpListener};
use tracing::info;

#[tokio::main]
async fn main() {
    let log_directory = PathBuf::from(string_or(&ProcessEnvironment, "LOG_DIRECTORY", "./logs"));
    let _logger =
        init_logger(&log_directory, "backup-service").or_log_and_exit("Could not start logger");

    let config = Config::from_env().or_log_and_exit("Could not load config");

    info!("Qdrant URL: {}", config.qdrant.url());
    info!("Bucket: {}", config.destination.bucket_name);
    info!("Staging directory: {:?}", config.staging_directory);

    fs::create_dir_all(&config.staging_directory)
        .await
        .or_log_and_exit("Could not create staging directory");

    let source = Qdrant::new(&config.qdrant, config.timeouts.clone())
        .or_log_and_exit("Could not create Qdrant client");

    let destination: Arc<dyn Destination> = match &config.destination.local_directory {
        Some(directory) => {
            info!("Writing backups to local directory {directory:?}");
            Arc::new(LocalDirectory::new(
                directory,
                &config.destination.bucket_name,
            ))
        }
        None => Arc::new(
            GcsBucket::new(&config.destination.bucket_name)
                .await
                .or_log_and_exit("Could not create Google Cloud Storage client"),
        ),
    };

    let service = BackupService::new(
        Arc::new(source),
        destination,
        PipelineSettings::from(&config),
    );

    let listener = TcpListener::bind(config.listen_address)
        .await
        .or_log_and_exit("Could not bind listener");
    info!("Listening on: {}", config.listen_address);

    server::serve(listener, Arc::new(service))
        .await
        .or_log_and_exit("Server stopped unexpectedly");
}
