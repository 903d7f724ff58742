use anyhow::{self, Error as AnyhowError};
use db::{DBService, DbError};
use server::{AppState, file_logging, routes, state::StateError};
use services::services::config::{AppConfig, ConfigError};
use thiserror::Error;
use utils::{assets::asset_dir, build_info::BUILD_INFO};

#[derive(Debug, Error)]
pub enum AgencyServerError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Database(#[from] DbError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Other(#[from] AnyhowError),
}

#[tokio::main]
async fn main() -> Result<(), AgencyServerError> {
    dotenvy::dotenv().ok();

    // Held for the whole run so buffered file logs are flushed on exit
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let _file_log_guard = file_logging::init_logging(&log_level);
    tracing::info!("Starting {BUILD_INFO}");

    if !asset_dir().exists() {
        std::fs::create_dir_all(asset_dir())?;
    }

    let config = AppConfig::from_env()?;
    let db = DBService::new(&config.database_path).await?;

    let host = config.host.clone();
    let port = config.port;
    let state = AppState::from_config(db.clone(), config)?;
    let app_router = routes::router(state);

    let listener = tokio::net::TcpListener::bind(format!("{host}:{port}")).await?;
    let actual_port = listener.local_addr()?.port();
    tracing::info!("Server running on http://{host}:{actual_port}");

    axum::serve(listener, app_router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("server error: {e}"))?;

    db.shutdown().await;
    Ok(())
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let terminate = async {
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
            } else {
                tracing::error!("Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await;
    }

    tracing::info!("Shutdown signal received");
}
