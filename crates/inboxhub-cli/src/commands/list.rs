//! List notifications.

use clap::Args;

use crate::output::{self, OutputFormat};
use inboxhub_core::error::AppError;
use inboxhub_sync::FetchOutcome;

use super::NotificationRow;

/// Arguments for the list command
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Number of pages to load
    #[arg(short, long, default_value_t = 1)]
    pub pages: u64,
}

/// Execute the list command
pub async fn execute(args: &ListArgs, config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let (store, fetcher) = super::open_store(&config)?;

    if !fetcher.load_initial().await.is_applied() {
        return Err(super::store_failure(&store));
    }

    for _ in 1..args.pages.max(1) {
        match fetcher.load_more().await {
            FetchOutcome::Applied { .. } => {}
            FetchOutcome::NoMorePages => break,
            _ => return Err(super::store_failure(&store)),
        }
    }

    let snapshot = store.snapshot();
    let rows: Vec<NotificationRow> = snapshot.records.iter().map(NotificationRow::from).collect();
    output::print_list(&rows, format);

    if format == OutputFormat::Table {
        let meta = snapshot.meta;
        output::print_kv("Page", &format!("{}/{}", meta.current_page, meta.total_pages));
        output::print_kv("Total", &meta.total_items.to_string());
        output::print_kv("Unread", &snapshot.unread_count.to_string());
    }

    Ok(())
}
