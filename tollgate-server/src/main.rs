//! Tollgate server binary

use anyhow::Context;
use std::sync::Arc;
use tollgate_core::{
    Clock, MemoryKeyAuthority, MemoryRevocationStore, SessionAuthenticator, SystemClock,
};
use tollgate_server::sweeper::spawn_sweeper;
use tollgate_server::{config, logging, App, ServerConfig, WebServer};
use tollgate_store::FjallUserStore;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_matches(&config::command().get_matches())?;
    let _log_guard = logging::init_logging(config.log_format, config.log_file.as_deref())?;

    info!("Starting Tollgate {}", env!("CARGO_PKG_VERSION"));
    info!("Data directory: {}", config.data_dir.display());
    info!("Bind address: {}", config.bind);
    info!("Session lifetime: {}s", config.session_ttl.as_secs());

    if !config.data_dir.exists() {
        std::fs::create_dir_all(&config.data_dir).with_context(|| {
            format!("Failed to create data directory {}", config.data_dir.display())
        })?;
        info!("Created data directory: {}", config.data_dir.display());
    }

    let users = FjallUserStore::new(&config.data_dir).context("Failed to open user store")?;
    info!("User store initialized");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let sessions = SessionAuthenticator::new(
        Arc::new(MemoryKeyAuthority::new(clock.clone())),
        Arc::new(MemoryRevocationStore::new()),
        clock,
    )
    .with_ttl(config.session_ttl);

    let app = Arc::new(App::new(sessions, Arc::new(users)));
    let sweeper = spawn_sweeper(app.sessions.clone(), config.sweep_interval);

    let result = WebServer::new(app).serve(config.bind, shutdown_signal()).await;
    sweeper.abort();

    match result {
        Ok(()) => info!("Server shutdown gracefully"),
        Err(e) => {
            warn!("Server error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
}
