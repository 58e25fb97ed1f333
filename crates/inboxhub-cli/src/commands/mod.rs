//! CLI command definitions and dispatch.

pub mod config;
pub mod list;
pub mod read;
pub mod read_all;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use tracing::debug;

use crate::output::OutputFormat;
use inboxhub_core::config::AppConfig;
use inboxhub_core::error::AppError;
use inboxhub_entity::NotificationRecord;
use inboxhub_service::HttpNotificationService;
use inboxhub_sync::{FetchCoordinator, NotificationStore};

/// InboxHub: read and manage your notifications
#[derive(Debug, Parser)]
#[command(name = "inboxhub", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List notifications, newest first
    List(list::ListArgs),
    /// Mark one notification as read
    Read(read::ReadArgs),
    /// Mark every notification as read
    ReadAll(read_all::ReadAllArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::List(args) => list::execute(args, &self.config, self.format).await,
            Commands::Read(args) => read::execute(args, &self.config).await,
            Commands::ReadAll(args) => read_all::execute(args, &self.config).await,
            Commands::Config(args) => config::execute(args, &self.config, self.format).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load_from(config_path)
}

/// Helper: build a store backed by the configured remote service
pub fn open_store(config: &AppConfig) -> Result<(Arc<NotificationStore>, FetchCoordinator), AppError> {
    if !config.remote.is_authenticated() {
        return Err(AppError::authentication(
            "No access token configured (set remote.access_token or INBOXHUB__REMOTE__ACCESS_TOKEN)",
        ));
    }

    let remote = Arc::new(HttpNotificationService::new(&config.remote)?);
    debug!(api_url = %remote.api_url(), "Opening notification store");
    let store = Arc::new(NotificationStore::new(
        remote,
        &config.store,
        config.realtime.event_buffer_size,
    ));
    let fetcher = FetchCoordinator::new(store.clone(), config.store.page_size);
    Ok((store, fetcher))
}

/// Helper: turn the store's error slot into a command failure
pub fn store_failure(store: &NotificationStore) -> AppError {
    store
        .error()
        .unwrap_or_else(|| AppError::internal("Operation failed without an error message"))
}

/// Notification display row
#[derive(Debug, Serialize, Tabled)]
pub struct NotificationRow {
    /// Notification ID
    id: String,
    /// Kind
    kind: String,
    /// Message
    message: String,
    /// Subject
    subject: String,
    /// Created
    created: String,
    /// Read
    read: String,
}

impl From<&NotificationRecord> for NotificationRow {
    fn from(record: &NotificationRecord) -> Self {
        Self {
            id: record.id.to_string(),
            kind: record.kind.to_string(),
            message: record.message.clone(),
            subject: record.subject().to_string(),
            created: record.created_at.format("%Y-%m-%d %H:%M").to_string(),
            read: if record.read { "✓" } else { "✗" }.to_string(),
        }
    }
}
