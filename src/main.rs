//! Keepsake server entry point.

use mimalloc::MiMalloc;

/// Global allocator for improved performance.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use dotenvy::dotenv;

use keepsake::config::AppConfig;
use keepsake::{server, telemetry};

#[tokio::main]
async fn main() {
    // Load .env first so RUST_LOG and collaborator keys are visible below.
    let _ = dotenv();

    telemetry::init();

    let config = match AppConfig::load() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = server::start_server(config).await {
        tracing::error!(error = ?e, "Server exited with error");
        std::process::exit(1);
    }
}
