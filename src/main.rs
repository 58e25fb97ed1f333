//! InboxHub sync daemon
//!
//! Wires the remote service, push channel and notification store together,
//! runs an authenticated session until shutdown and logs every store change.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tracing_subscriber::{EnvFilter, fmt};

use inboxhub_core::config::AppConfig;
use inboxhub_core::error::AppError;
use inboxhub_service::HttpNotificationService;
use inboxhub_sync::{InboxEngine, MemoryPushChannel, StoreEvent};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Sync error: {e}");
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("INBOXHUB_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting InboxHub sync v{}", env!("CARGO_PKG_VERSION"));

    let authenticated = config.remote.is_authenticated();
    if !authenticated {
        tracing::warn!("No access token configured, staying signed out");
    }

    // A 401 from the remote flips this signal and ends the session.
    let (auth_tx, auth_rx) = watch::channel(authenticated);
    let remote = HttpNotificationService::new(&config.remote)?.with_auth_signal(auth_tx);
    tracing::info!("Remote notification service at {}", remote.api_url());

    let channel = Arc::new(MemoryPushChannel::new());
    let engine = InboxEngine::new(&config, Arc::new(remote), channel);

    let event_log = tokio::spawn(log_events(engine.subscribe()));
    let follow = engine.spawn_follow(auth_rx);

    shutdown_signal().await;
    tracing::info!("Shutdown signal received");

    follow.abort();
    engine.shutdown().await;
    event_log.abort();

    tracing::info!("InboxHub sync shut down");
    Ok(())
}

/// Log store changes as they happen
async fn log_events(mut events: broadcast::Receiver<StoreEvent>) {
    loop {
        match events.recv().await {
            Ok(StoreEvent::Replaced { count, unread }) => {
                tracing::info!(count, unread, "Notifications replaced");
            }
            Ok(StoreEvent::Appended { page, count, unread }) => {
                tracing::info!(page, count, unread, "Page appended");
            }
            Ok(StoreEvent::Pushed { id, unread }) => {
                tracing::info!(notification_id = %id, unread, "Notification received");
            }
            Ok(StoreEvent::ReadStateChanged { unread }) => {
                tracing::debug!(unread, "Read state changed");
            }
            Ok(StoreEvent::RolledBack { unread }) => {
                tracing::warn!(unread, "Read state rolled back");
            }
            Ok(StoreEvent::ConnectionChanged(state)) => {
                tracing::info!(%state, "Connection state changed");
            }
            Ok(StoreEvent::ErrorChanged(Some(message))) => {
                tracing::warn!(%message, "Store error");
            }
            Ok(StoreEvent::ErrorChanged(None)) => {}
            Ok(StoreEvent::LoadingChanged { loading, marking_all }) => {
                tracing::trace!(loading, marking_all, "Loading flags changed");
            }
            Ok(StoreEvent::Reset { epoch }) => {
                tracing::info!(epoch, "Store reset");
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Store event log lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
