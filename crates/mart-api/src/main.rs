//! `mart-api` binary: serves the marketplace REST API
//!
//! Reads its settings from the environment (`.env` is honoured). The
//! maintenance sweep is a separate binary, see `mart-sweep`.

use std::process::ExitCode;

use mart_common::{try_init_tracing, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = try_init_tracing(&TracingConfig::default()) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    info!(
        app = %config.app.name,
        env = ?config.app.env,
        address = %config.api.address(),
        worker_id = config.snowflake.worker_id,
        rate_limit_rps = config.rate_limit.requests_per_second,
        "Starting Mart API"
    );

    match mart_api::run(config).await {
        Ok(()) => {
            info!("Mart API stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Mart API terminated with an error");
            ExitCode::FAILURE
        }
    }
}
