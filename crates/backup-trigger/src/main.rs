//! # Backup trigger
//! Receives scheduled triggers and relays them to the backup service.
//!

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::{path::PathBuf, sync::Arc};

use backup_trigger::{Relay, RelayConfig, server};
use mimalloc::MiMalloc;
use shared::{Fatal, ProcessEnvironment, env::string_or, init_logger};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    let log_directory = PathBuf::from(string_or(&ProcessEnvironment, "LOG_DIRECTORY", "./logs"));
    let _logger =
        init_logger(&log_directory, "backup-trigger").or_log_and_exit("Could not start logger");

    let config = RelayConfig::from_env().or_log_and_exit("Could not load config");

    match &config.backup_api_url {
        Some(url) => info!("Backup API: {url}"),
        None => warn!("VM_BACKUP_API_URL is not set, triggers will fail"),
    }
    info!("Timeout: {}s", config.timeout_seconds);

    let listen_address = config.listen_address;
    let relay = Relay::new(config).or_log_and_exit("Could not create HTTP client");

    let listener = TcpListener::bind(listen_address)
        .await
        .or_log_and_exit("Could not bind listener");
    info!("Listening on: {listen_address}");

    server::serve(listener, Arc::new(relay))
        .await
        .or_log_and_exit("Server stopped unexpectedly");
}
