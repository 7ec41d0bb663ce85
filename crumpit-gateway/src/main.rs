//! Entry point for the `crumpit-gateway` HTTP server.

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use crumpit_core::ConfigHandle;
use crumpit_gateway::{
    logging::{init_logging, DEFAULT_LOG_FILE},
    routes::create_router,
    state::AppState,
};
use tracing::info;

const DEFAULT_CONFIG_PATH: &str = "configs/config.yaml";

#[tokio::main]
async fn main() {
    let log_dir = std::env::var("CRUMPIT_LOG_DIR").map_or_else(|_| PathBuf::from("."), PathBuf::from);
    let _log_guard = match init_logging(&log_dir, DEFAULT_LOG_FILE) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("failed to initialise logging in {}: {e}", log_dir.display());
            std::process::exit(1);
        }
    };

    let config_path = std::env::var("CRUMPIT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());
    let config = match ConfigHandle::from_file(&config_path) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            tracing::error!(path = %config_path, error = %e, "failed to load configuration");
            std::process::exit(1);
        }
    };

    let port = config.snapshot().listen_port();
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    #[cfg(unix)]
    spawn_reload_on_hangup(Arc::clone(&config));

    let app = create_router(AppState::unlinked(config));

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    info!(addr = %addr, "crumpit-gateway listening");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}

/// Re-read the configuration file on every `SIGHUP`.
#[cfg(unix)]
fn spawn_reload_on_hangup(config: Arc<ConfigHandle>) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangups = match signal(SignalKind::hangup()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "cannot listen for SIGHUP; configuration reload disabled");
            return;
        }
    };
    tokio::spawn(async move {
        while hangups.recv().await.is_some() {
            if let Err(e) = config.reload() {
                tracing::warn!(error = %e, "configuration reload failed; keeping previous configuration");
            }
        }
    });
}
