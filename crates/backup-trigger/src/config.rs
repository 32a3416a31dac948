//! Backup trigger config
//!

use core::{net::SocketAddr, time::Duration};

use shared::{
    ConfigError, Lookup, ProcessEnvironment,
    env::{optional, parse_or},
};

/// The relay's config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Base URL of the backup service, the relay refuses to trigger without it.
    pub backup_api_url: Option<String>,

    /// How long to wait for the backup service to finish, in seconds.
    pub timeout_seconds: u64,

    /// Sent as a bearer token when present.
    pub authorization_token: Option<String>,

    /// The address to serve the HTTP API on.
    pub listen_address: SocketAddr,
}

impl RelayConfig {
    /// Tries to load the config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(&ProcessEnvironment)
    }

    /// Tries to load the config from a lookup.
    ///
    /// A missing `VM_BACKUP_API_URL` is not an error here, it is reported per request.
    pub fn load(lookup: &impl Lookup) -> Result<Self, ConfigError> {
        Ok(Self {
            backup_api_url: optional(lookup, "VM_BACKUP_API_URL"),
            timeout_seconds: parse_or(lookup, "BACKUP_API_TIMEOUT", 60 * 15)?,
            authorization_token: optional(lookup, "AUTHORIZATION_TOKEN"),
            listen_address: parse_or(
                lookup,
                "LISTEN_ADDRESS",
                SocketAddr::from(([0, 0, 0, 0], 8080)),
            )?,
        })
    }

    /// Timeout for a relayed backup.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// The backup service URL for `path`, without doubling slashes.
    pub fn endpoint(&self, path: &str) -> Option<String> {
        self.backup_api_url
            .as_deref()
            .map(|url| format!("{}/{path}", url.trim_end_matches('/')))
    }
}
