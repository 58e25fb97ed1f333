//! Mark every notification as read.

use clap::Args;

use crate::output;
use inboxhub_core::error::AppError;

/// Arguments for the read-all command
#[derive(Debug, Args)]
pub struct ReadAllArgs {
    /// Skip confirmation
    #[arg(long)]
    pub force: bool,
}

/// Execute the read-all command
pub async fn execute(args: &ReadAllArgs, config_path: &str) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let (store, fetcher) = super::open_store(&config)?;

    if !args.force {
        let confirm = dialoguer::Confirm::new()
            .with_prompt("Mark all notifications as read?")
            .default(false)
            .interact()
            .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

        if !confirm {
            println!("Cancelled.");
            return Ok(());
        }
    }

    fetcher.load_initial().await;
    let unread = store.unread_count();

    if !store.mark_all_read().await {
        return Err(super::store_failure(&store));
    }

    output::print_success(&format!(
        "Marked all notifications as read ({unread} unread on the first page)"
    ));
    Ok(())
}
