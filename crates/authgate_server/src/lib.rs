//! HTTP surface for authgate.
//!
//! Exposes `POST /api/auth/login`, `POST /api/auth/register` and
//! `GET /health` over one SQLite-backed [`AppState`].

pub mod config;
pub mod dto;
pub mod error;
pub mod router;
pub mod state;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use router::{cors_layer, create_router};
pub use state::AppState;

use anyhow::Context;
use authgate_core::db::open_db;
use log::{error, info};
use tokio::net::TcpListener;

/// Initializes process logging from the server configuration.
pub fn init_logging(config: &ServerConfig) -> anyhow::Result<()> {
    let level = config.log_level();
    let result = match config.log_dir.as_deref() {
        Some(dir) => {
            let dir = dir
                .to_str()
                .with_context(|| format!("log dir `{}` is not valid UTF-8", dir.display()))?;
            authgate_core::init_logging(level, dir)
        }
        None => authgate_core::init_stderr_logging(level),
    };
    result.map_err(anyhow::Error::msg)
}

/// Opens the database, binds the listener and serves until shutdown.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let conn = open_db(&config.database)
        .with_context(|| format!("failed to open database `{}`", config.database.display()))?;
    let app = create_router(AppState::new(conn), cors_layer(&config.cors_origins)?);

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!(
        "event=server_start module=server status=ok bind={}",
        listener.local_addr()?
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("event=signal_install module=server status=error signal=ctrl_c error={err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!("event=signal_install module=server status=error signal=sigterm error={err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("event=shutdown_requested module=server status=ok");
}
