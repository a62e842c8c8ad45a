//! Message commands.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use rust_i18n::t;

use crate::config::build_authed_client;
use crate::handlers::message as handlers;
use crate::output::{print_structured, print_table, OutputFormat};

#[derive(Subcommand)]
pub enum MessageAction {
    /// List conversations
    #[command(alias = "ls")]
    Chats,

    /// View the conversation with a user
    Read {
        /// Partner user ID
        user_id: String,
        /// Leave messages unread
        #[arg(long)]
        keep_unread: bool,
    },

    /// Send a message
    Send {
        /// Recipient user ID
        #[arg(short, long)]
        to: String,
        /// Message content
        content: String,
    },
}

pub async fn handle(action: MessageAction, format: OutputFormat, _verbose: bool) -> Result<()> {
    match action {
        MessageAction::Chats => list_chats(format).await,
        MessageAction::Read {
            user_id,
            keep_unread,
        } => read_conversation(&user_id, !keep_unread, format).await,
        MessageAction::Send { to, content } => send_message(&to, &content, format).await,
    }
}

async fn list_chats(format: OutputFormat) -> Result<()> {
    let client = build_authed_client()?;
    let result = handlers::list_chats(&client).await?;

    if format.is_human() {
        println!(
            "{}\n",
            t!(
                "conversations",
                count = result.chats.len(),
                unread = result.total_unread
            )
        );
    }

    print_table(result.chats, format);
    Ok(())
}

async fn read_conversation(user_id: &str, mark_read: bool, format: OutputFormat) -> Result<()> {
    let client = build_authed_client()?;
    let result = handlers::read_conversation(&client, user_id, mark_read).await?;

    if format.is_human() {
        println!(
            "{}\n",
            t!(
                "conversation_with",
                user = result.partner_name.green(),
                count = result.messages.len()
            )
        );
    }

    print_table(result.messages, format);
    Ok(())
}

async fn send_message(to: &str, content: &str, format: OutputFormat) -> Result<()> {
    let client = build_authed_client()?;
    let result = handlers::send_message(&client, to, content).await?;

    if matches!(format, OutputFormat::Json | OutputFormat::Toon) {
        print_structured(&result, format);
    } else {
        println!("{}", t!("message_sent_to", user = result.to));
    }
    Ok(())
}
