//! Message handlers.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;
use rust_i18n::t;
use serde::Serialize;
use youniverse::{ChatSummary, MessageWithProfiles, UserId, YouniverseClient};

use crate::output::{format_relative_time, truncate, PlainPrint, TableRow};

/// Conversation summary info.
#[derive(Debug, Clone, Serialize)]
pub struct ChatInfo {
    pub partner_id: String,
    pub partner_name: String,
    pub last_message: String,
    pub from_me: bool,
    pub last_time: DateTime<Utc>,
    pub unread_count: u32,
}

impl ChatInfo {
    fn new(chat: &ChatSummary<MessageWithProfiles>, viewer: &UserId) -> Self {
        Self {
            partner_id: chat.partner_id.to_string(),
            partner_name: chat
                .partner()
                .map(|p| p.name.clone())
                .unwrap_or_else(|| chat.partner_id.to_string()),
            last_message: chat.last_message.message.content.clone(),
            from_me: chat.last_message.message.is_from(viewer),
            last_time: chat.last_activity(),
            unread_count: chat.unread_count,
        }
    }
}

impl TableRow for ChatInfo {
    fn headers() -> Vec<&'static str> {
        vec!["With", "Last Message", "Last", "Unread"]
    }
    fn row(&self) -> Vec<String> {
        vec![
            self.partner_name.clone(),
            truncate(&self.last_message, 50),
            format_relative_time(self.last_time),
            if self.unread_count > 0 {
                self.unread_count.to_string()
            } else {
                String::new()
            },
        ]
    }
}

impl PlainPrint for ChatInfo {
    fn plain_print(&self) {
        let unread_marker = if self.unread_count > 0 {
            format!("● {} ", self.unread_count).red().to_string()
        } else {
            String::new()
        };
        println!(
            "{}{} {} {}",
            unread_marker,
            self.partner_name.green(),
            format!("[{}]", self.partner_id).dimmed(),
            format_relative_time(self.last_time).dimmed()
        );
        let prefix = if self.from_me {
            format!("{}: ", t!("you_label"))
        } else {
            String::new()
        };
        println!("   {}{}", prefix, truncate(&self.last_message, 80));
    }
}

/// Chat list result.
#[derive(Debug, Clone, Serialize)]
pub struct ChatListOutput {
    pub total_unread: u32,
    pub chats: Vec<ChatInfo>,
}

/// Message info.
#[derive(Debug, Clone, Serialize)]
pub struct MessageInfo {
    pub id: String,
    pub from: String,
    pub is_mine: bool,
    pub content: String,
    pub read: bool,
    pub time: DateTime<Utc>,
}

impl TableRow for MessageInfo {
    fn headers() -> Vec<&'static str> {
        vec!["From", "Content", "Time"]
    }
    fn row(&self) -> Vec<String> {
        vec![
            self.from.clone(),
            self.content.clone(),
            format_relative_time(self.time),
        ]
    }
}

impl PlainPrint for MessageInfo {
    fn plain_print(&self) {
        let from_display = if self.is_mine {
            t!("you_label").to_string().green().to_string()
        } else {
            self.from.clone()
        };
        println!("{} {}", from_display, format_relative_time(self.time).dimmed());
        for line in self.content.lines() {
            if !line.trim().is_empty() {
                println!("   {}", line);
            }
        }
        println!();
    }
}

/// Conversation result.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationOutput {
    pub partner_id: String,
    pub partner_name: String,
    pub marked_read: usize,
    pub messages: Vec<MessageInfo>,
}

/// Send message result.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageOutput {
    pub id: String,
    pub to: String,
    pub success: bool,
}

/// List conversations.
pub async fn list_chats(client: &YouniverseClient) -> Result<ChatListOutput> {
    let viewer = client
        .current_user_id()
        .context("Authentication required")?;
    let result = client.messages().chats().await?;
    Ok(ChatListOutput {
        total_unread: result.total_unread,
        chats: result.chats.iter().map(|c| ChatInfo::new(c, viewer)).collect(),
    })
}

/// Read the conversation with a user and mark it read.
pub async fn read_conversation(
    client: &YouniverseClient,
    partner: &str,
    mark_read: bool,
) -> Result<ConversationOutput> {
    let viewer = client
        .current_user_id()
        .context("Authentication required")?;
    let result = client
        .messages()
        .conversation(partner)
        .mark_read(mark_read)
        .send()
        .await?;

    let partner_name = result
        .partner_profile
        .as_ref()
        .map(|p| p.name.clone())
        .unwrap_or_else(|| partner.to_string());

    Ok(ConversationOutput {
        partner_id: result.partner.to_string(),
        marked_read: result.marked_read,
        messages: result
            .messages
            .iter()
            .map(|m| {
                let is_mine = m.message.is_from(viewer);
                MessageInfo {
                    id: m.message.id.to_string(),
                    from: if is_mine {
                        t!("you_label").to_string()
                    } else {
                        partner_name.clone()
                    },
                    is_mine,
                    content: m.message.content.clone(),
                    read: m.message.read,
                    time: m.message.created_at,
                }
            })
            .collect(),
        partner_name,
    })
}

/// Send a message.
pub async fn send_message(
    client: &YouniverseClient,
    to: &str,
    content: &str,
) -> Result<SendMessageOutput> {
    let message = client.messages().send(to).content(content).send().await?;

    Ok(SendMessageOutput {
        id: message.id.to_string(),
        to: to.to_string(),
        success: true,
    })
}
