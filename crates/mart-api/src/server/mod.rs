//! Server setup and initialization
//!
//! Wires the PostgreSQL repositories, token service, ID generator and
//! importer into a service context, then serves the router.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use mart_common::{AppConfig, AppError, JwtService};
use mart_core::SnowflakeGenerator;
use mart_db::{
    create_pool, run_migrations, PgCategoryRepository, PgConversationRepository,
    PgFavoriteRepository, PgListingRepository, PgPool, PgReportRepository, PgUserRepository,
    PoolConfig,
};
use mart_import::ListingImporter;
use mart_service::{ServiceContext, ServiceContextBuilder};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use crate::middleware::{apply_middleware, apply_middleware_with_config};
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware.
///
/// Health probes sit outside the rate limiter.
pub fn create_app(state: AppState) -> Result<Router, AppError> {
    let config = state.config();
    let api = apply_middleware_with_config(
        create_router(),
        &config.rate_limit,
        &config.cors,
        config.app.env.is_production(),
    )?;
    let health = apply_middleware(health_routes());

    Ok(api.merge(health).with_state(state))
}

/// Connect to PostgreSQL and apply pending migrations
pub async fn connect_database(config: &AppConfig) -> Result<PgPool, AppError> {
    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&PoolConfig::from(&config.database))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    run_migrations(&pool)
        .await
        .map_err(|e| AppError::Database(format!("migration failed: {e}")))?;
    info!("Database migrations applied");

    Ok(pool)
}

/// Assemble the service context over an open pool
pub fn build_service_context(pool: &PgPool, config: &AppConfig) -> Result<ServiceContext, AppError> {
    let jwt_service = Arc::new(JwtService::from_config(&config.jwt, &config.app.name));

    let snowflake_generator = SnowflakeGenerator::new(config.snowflake.worker_id)
        .map_err(|e| AppError::internal(anyhow::anyhow!("invalid WORKER_ID: {e}")))?;

    let importer = ListingImporter::new(config.import.clone())
        .map_err(|e| AppError::internal(anyhow::anyhow!("importer setup failed: {e}")))?;

    ServiceContextBuilder::new()
        .user_repo(Arc::new(PgUserRepository::new(pool.clone())))
        .listing_repo(Arc::new(PgListingRepository::new(pool.clone())))
        .category_repo(Arc::new(PgCategoryRepository::new(pool.clone())))
        .conversation_repo(Arc::new(PgConversationRepository::new(pool.clone())))
        .report_repo(Arc::new(PgReportRepository::new(pool.clone())))
        .favorite_repo(Arc::new(PgFavoriteRepository::new(pool.clone())))
        .jwt_service(jwt_service)
        .snowflake_generator(Arc::new(snowflake_generator))
        .importer(Arc::new(importer))
        .build()
        .map_err(AppError::from)
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    let pool = connect_database(&config).await?;
    let service_context = build_service_context(&pool, &config)?;
    Ok(AppState::new(service_context, config, pool))
}

/// Run the HTTP server until SIGINT or SIGTERM
pub async fn run_server(app: Router, addr: &str) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::internal(anyhow::anyhow!("failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::internal(anyhow::anyhow!("server error: {e}")))?;

    info!("Server shutdown complete");
    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.api.address();
    let state = create_app_state(config).await?;
    let app = create_app(state)?;
    run_server(app, &addr).await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
