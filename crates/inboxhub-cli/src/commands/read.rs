//! Mark a single notification as read.

use clap::Args;

use crate::output;
use inboxhub_core::error::AppError;
use inboxhub_core::types::NotificationId;
use inboxhub_service::RemoteNotificationService;

/// Arguments for the read command
#[derive(Debug, Args)]
pub struct ReadArgs {
    /// Notification ID
    pub id: String,
}

/// Execute the read command
pub async fn execute(args: &ReadArgs, config_path: &str) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let (store, fetcher) = super::open_store(&config)?;
    let Ok(id) = args.id.parse::<NotificationId>();

    // The first page tells us whether the notification is already read.
    fetcher.load_initial().await;

    match store.records().iter().find(|r| r.id == id) {
        Some(record) if record.read => {
            output::print_warning(&format!("Notification {id} is already read"));
        }
        Some(_) => {
            if !store.mark_one_read(&id).await {
                return Err(super::store_failure(&store));
            }
            output::print_success(&format!("Notification {id} marked as read"));
        }
        None => {
            store.remote().mark_one_read(&id).await?;
            output::print_success(&format!("Notification {id} marked as read"));
        }
    }

    Ok(())
}
