use jwks_service::config::Config;
use jwks_service::db;
use jwks_service::handlers::auth_handler::AppState;
use jwks_service::routes;
use jwks_service::services::key_management_service;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jwks_service=debug,jwks_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JWKS server");

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        policy = config.key_selection_policy.as_str(),
        "Configuration loaded successfully"
    );

    // Open the key database
    let db_pool = db::connect(&config.database_url).await.map_err(|e| {
        error!("Failed to open key database: {}", e);
        e
    })?;

    info!("Key database opened");

    // Keys must exist before the listener accepts anything
    info!("Generating signing keys...");
    key_management_service::bootstrap_signing_keys(&db_pool, &config)
        .await
        .map_err(|e| {
            error!("Failed to bootstrap signing keys: {}", e);
            e
        })?;

    info!("Signing keys initialized");

    let metrics_handle = routes::init_metrics_recorder().map_err(|e| {
        error!("Failed to initialize metrics: {}", e);
        e
    })?;

    // Parse bind address before moving config
    let bind_address = config.bind_address.clone();
    let drain_seconds = config.drain_seconds;

    // Create application state
    let state = Arc::new(AppState {
        pool: db_pool.clone(),
        config,
    });

    // Build application routes
    let app = routes::build_routes(state, metrics_handle);

    // Parse bind address
    let addr: SocketAddr = bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    info!("JWKS server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(drain_seconds))
        .await?;

    db_pool.close().await;
    info!("JWKS server shutdown complete");

    Ok(())
}

/// Listens for shutdown signals (SIGTERM, SIGINT).
/// Returns when a shutdown signal is received and drain period is complete.
async fn shutdown_signal(drain_seconds: u64) {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    if drain_seconds > 0 {
        info!(drain_seconds, "Draining in-flight requests");
        tokio::time::sleep(Duration::from_secs(drain_seconds)).await;
    }
}
