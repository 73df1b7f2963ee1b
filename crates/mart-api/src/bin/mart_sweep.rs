//! One-shot maintenance sweep, meant for cron.
//!
//! Clears elapsed featured and promotion flags and expires active listings
//! past their expiry date, then exits.

use chrono::Utc;
use mart_api::server::connect_database;
use mart_api::build_service_context;
use mart_common::{try_init_tracing, AppConfig, TracingConfig};
use mart_service::ListingService;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = try_init_tracing(&TracingConfig::default()) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run().await {
        error!(error = %e, "Maintenance sweep failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    let pool = connect_database(&config).await?;
    let ctx = build_service_context(&pool, &config)?;

    let counts = ListingService::new(&ctx).run_maintenance(Utc::now()).await?;
    info!(
        featured_cleared = counts.featured_cleared,
        promotions_cleared = counts.promotions_cleared,
        listings_expired = counts.listings_expired,
        "Maintenance sweep finished"
    );

    pool.close().await;
    Ok(())
}
