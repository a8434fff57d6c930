use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kanban_board::api::{create_router, AppState};
use kanban_board::config::Config;
use kanban_board::infrastructure::db;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,kanban_board=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Kanban Board v{}...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config from env, using defaults: {}", e);
        Config::default()
    });

    let db_pool = match db::init_db(&config).await {
        Ok(pool) => {
            match db::verify_wal_mode(&pool).await {
                Ok(mode) => tracing::info!(journal_mode = mode.as_str(), "Database initialized successfully"),
                Err(e) => tracing::warn!("Could not read journal mode: {}", e),
            }
            Some(pool)
        }
        Err(e) => {
            tracing::error!("Failed to initialize database: {}", e);
            None
        }
    };

    let config = Arc::new(config);
    let state = AppState::new(db_pool.clone(), Arc::clone(&config));
    let app = create_router(state, &config);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Kanban Board listening on http://{}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Requests still in flight were dropped with their units of work rolled back.
    if let Some(pool) = db_pool {
        pool.close().await;
    }

    tracing::info!("Kanban Board shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
