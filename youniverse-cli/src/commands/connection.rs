//! Connection commands.

use anyhow::Result;
use clap::Subcommand;
use rust_i18n::t;

use crate::config::build_authed_client;
use crate::handlers::connection as handlers;
use crate::output::{print_structured, print_table, OutputFormat};

#[derive(Subcommand)]
pub enum ConnectionAction {
    /// List accepted connections
    #[command(alias = "ls")]
    List,

    /// List pending requests sent to you
    Pending,

    /// Send a connection request
    Request {
        /// User ID
        user_id: String,
    },

    /// Accept a pending request
    Accept {
        /// Connection ID
        id: String,
    },

    /// Reject a pending request
    Reject {
        /// Connection ID
        id: String,
    },
}

pub async fn handle(action: ConnectionAction, format: OutputFormat, _verbose: bool) -> Result<()> {
    let client = build_authed_client()?;
    match action {
        ConnectionAction::List => {
            let connections = handlers::list_connections(&client).await?;
            if format.is_human() {
                println!("{}\n", t!("connections_count", count = connections.len()));
            }
            print_table(connections, format);
        }
        ConnectionAction::Pending => {
            let pending = handlers::pending_requests(&client).await?;
            if format.is_human() {
                println!("{}\n", t!("pending_count", count = pending.len()));
            }
            print_table(pending, format);
        }
        ConnectionAction::Request { user_id } => {
            let change = handlers::send_request(&client, &user_id).await?;
            report(&change, t!("request_sent", user = &user_id).to_string(), format);
        }
        ConnectionAction::Accept { id } => {
            let change = handlers::accept_request(&client, &id).await?;
            report(&change, t!("request_accepted").to_string(), format);
        }
        ConnectionAction::Reject { id } => {
            let change = handlers::reject_request(&client, &id).await?;
            report(&change, t!("request_rejected").to_string(), format);
        }
    }
    Ok(())
}

fn report(change: &handlers::ConnectionChange, message: String, format: OutputFormat) {
    if matches!(format, OutputFormat::Json | OutputFormat::Toon) {
        print_structured(change, format);
    } else {
        println!("{message}");
    }
}
