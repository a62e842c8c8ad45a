//! Notification commands.

use anyhow::Result;
use clap::Subcommand;
use rust_i18n::t;

use crate::config::build_authed_client;
use crate::handlers::notification as handlers;
use crate::output::{print_table, OutputFormat};

#[derive(Subcommand)]
pub enum NotificationAction {
    /// List notifications
    #[command(alias = "ls")]
    List {
        /// Page number
        #[arg(short, long, default_value = "1")]
        page: u32,
        /// Only unread notifications
        #[arg(short, long)]
        unread: bool,
    },

    /// Mark a notification as read
    Read {
        /// Notification ID
        id: String,
    },

    /// Mark all notifications as read
    ReadAll,
}

pub async fn handle(action: NotificationAction, format: OutputFormat, _verbose: bool) -> Result<()> {
    match action {
        NotificationAction::List { page, unread } => list_notifications(page, unread, format).await,
        NotificationAction::Read { id } => mark_read(&id).await,
        NotificationAction::ReadAll => mark_all_read().await,
    }
}

async fn list_notifications(page: u32, unread: bool, format: OutputFormat) -> Result<()> {
    let client = build_authed_client()?;
    let result = handlers::list_notifications(&client, page, unread).await?;

    if format.is_human() {
        println!(
            "{}\n",
            t!("notifications_header", page = result.page, unread = result.unread_total)
        );
    }

    let has_more = result.has_more;
    print_table(result.notifications, format);

    if has_more && format.is_human() {
        println!("\n{}", t!("more_pages", next = page + 1));
    }
    Ok(())
}

async fn mark_read(id: &str) -> Result<()> {
    let client = build_authed_client()?;
    handlers::mark_read(&client, id).await?;
    println!("{}", t!("marked_read"));
    Ok(())
}

async fn mark_all_read() -> Result<()> {
    let client = build_authed_client()?;
    let count = handlers::mark_all_read(&client).await?;
    println!("{}", t!("marked_all_read", count = count));
    Ok(())
}
