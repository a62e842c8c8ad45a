//! Message API.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use super::{display_name, NOTIFICATIONS};
use crate::{
    client::{ClientInner, Order, Query},
    error::{Error, Result},
    models::{ChatSummary, Message, MessageWithProfiles, NewNotification, UserId},
    views::{aggregate_chats, total_unread},
};

const MESSAGES: &str = "messages";

/// Message rows with sender and receiver profiles embedded.
const MESSAGE_SELECT: &str = "*,\
sender:profiles!messages_sender_id_fkey(*),\
receiver:profiles!messages_receiver_id_fkey(*)";

/// API for direct messages.
pub struct MessageApi {
    client: Arc<ClientInner>,
}

impl MessageApi {
    pub(crate) fn new(client: Arc<ClientInner>) -> Self {
        Self { client }
    }

    /// Conversation list of the signed-in user, most recent first.
    pub async fn chats(&self) -> Result<ChatListResult> {
        let viewer = self.client.viewer()?;
        let query = Query::new()
            .select(MESSAGE_SELECT)
            .or([
                format!("sender_id.eq.{viewer}"),
                format!("receiver_id.eq.{viewer}"),
            ])
            .order("created_at", Order::Desc);

        let messages: Vec<MessageWithProfiles> =
            self.client.select_rows(MESSAGES, &query).await?;
        log::debug!("aggregating {} messages into chats", messages.len());

        let chats = aggregate_chats(&messages, viewer);
        Ok(ChatListResult {
            total_unread: total_unread(&chats),
            chats,
        })
    }

    /// Open the conversation with `partner`.
    pub fn conversation(&self, partner: impl Into<UserId>) -> ConversationBuilder {
        ConversationBuilder {
            client: self.client.clone(),
            partner: partner.into(),
            mark_read: true,
        }
    }

    /// Send a message.
    pub fn send(&self, receiver: impl Into<UserId>) -> SendMessageBuilder {
        SendMessageBuilder {
            client: self.client.clone(),
            receiver: receiver.into(),
            content: String::new(),
            notify: true,
        }
    }
}

/// Result of a chat list request.
#[derive(Debug, Clone, Default)]
pub struct ChatListResult {
    /// One entry per partner, most recent first.
    pub chats: Vec<ChatSummary<MessageWithProfiles>>,
    /// Unread messages across all chats.
    pub total_unread: u32,
}

/// Builder for conversation requests.
pub struct ConversationBuilder {
    client: Arc<ClientInner>,
    partner: UserId,
    mark_read: bool,
}

impl ConversationBuilder {
    /// Whether to mark the partner's messages as read. Defaults to `true`.
    pub fn mark_read(mut self, mark: bool) -> Self {
        self.mark_read = mark;
        self
    }

    /// Execute the request.
    pub async fn send(self) -> Result<ConversationResult> {
        if self.partner.is_empty() {
            return Err(Error::InvalidArgument("User ID must not be empty".into()));
        }
        let viewer = self.client.viewer()?;
        let partner = &self.partner;

        let query = Query::new()
            .select(MESSAGE_SELECT)
            .or([format!(
                "and(sender_id.eq.{viewer},receiver_id.eq.{partner}),\
                 and(sender_id.eq.{partner},receiver_id.eq.{viewer})"
            )])
            .order("created_at", Order::Asc);

        let mut messages: Vec<MessageWithProfiles> =
            self.client.select_rows(MESSAGES, &query).await?;

        let mut marked_read = 0;
        if self.mark_read && messages.iter().any(|m| m.message.is_unread_for(viewer)) {
            let unread = Query::new()
                .eq("sender_id", partner)
                .eq("receiver_id", viewer)
                .eq("read", false);
            let updated: Vec<Message> = self
                .client
                .update_rows(MESSAGES, &unread, &json!({ "read": true }))
                .await?;
            marked_read = updated.len();

            for m in messages.iter_mut() {
                if m.message.is_from(partner) && &m.message.receiver_id == viewer {
                    m.message.read = true;
                }
            }
        }

        let partner_profile = messages
            .iter()
            .find_map(|m| m.partner_profile(viewer))
            .cloned();

        Ok(ConversationResult {
            partner: self.partner.clone(),
            partner_profile,
            messages,
            marked_read,
        })
    }
}

/// Result of a conversation request.
#[derive(Debug, Clone, Default)]
pub struct ConversationResult {
    /// Conversation partner.
    pub partner: UserId,
    /// Partner profile, when embedded in any message.
    pub partner_profile: Option<crate::models::Profile>,
    /// Messages, oldest first.
    pub messages: Vec<MessageWithProfiles>,
    /// Messages flipped to read by this request.
    pub marked_read: usize,
}

#[derive(Serialize)]
struct NewMessage<'a> {
    sender_id: &'a UserId,
    receiver_id: &'a UserId,
    content: &'a str,
}

/// Builder for sending a message.
pub struct SendMessageBuilder {
    client: Arc<ClientInner>,
    receiver: UserId,
    content: String,
    notify: bool,
}

impl SendMessageBuilder {
    /// Set the message text.
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Whether to create a notification for the receiver. Defaults to `true`.
    pub fn notify(mut self, notify: bool) -> Self {
        self.notify = notify;
        self
    }

    /// Send the message.
    pub async fn send(self) -> Result<Message> {
        let content = self.content.trim();
        if content.is_empty() {
            return Err(Error::InvalidArgument("Message must not be empty".into()));
        }
        if self.receiver.is_empty() {
            return Err(Error::InvalidArgument("Receiver must not be empty".into()));
        }
        let viewer = self.client.viewer()?.clone();

        let message: Message = self
            .client
            .insert_row(
                MESSAGES,
                &NewMessage {
                    sender_id: &viewer,
                    receiver_id: &self.receiver,
                    content,
                },
            )
            .await?;

        if self.notify && self.receiver != viewer {
            let name = display_name(&self.client, &viewer).await;
            let notification = NewNotification::message(self.receiver.clone(), viewer, &name);
            if let Err(e) = self
                .client
                .insert_minimal(NOTIFICATIONS, &notification)
                .await
            {
                log::warn!("message sent but notification failed: {e}");
            }
        }

        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{parse_rows, YouniverseClient};
    use pretty_assertions::assert_eq;

    fn row(id: &str, from: &str, to: &str, read: bool, at: &str) -> serde_json::Value {
        json!({
            "id": id,
            "sender_id": from,
            "receiver_id": to,
            "content": format!("message {id}"),
            "read": read,
            "created_at": at,
            "sender": {
                "id": from, "email": "", "name": from.to_uppercase(),
                "role": "student_abroad", "country": "Canada",
                "created_at": "2024-01-01T00:00:00+00:00",
                "updated_at": "2024-01-01T00:00:00+00:00"
            },
            "receiver": null
        })
    }

    #[test]
    fn test_chats_from_embedded_rows() {
        let rows = json!([
            row("m3", "b", "me", false, "2024-05-03T10:00:00+00:00"),
            row("m2", "me", "c", true, "2024-05-02T10:00:00+00:00"),
            row("m1", "b", "me", false, "2024-05-01T10:00:00+00:00"),
        ]);
        let messages: Vec<MessageWithProfiles> = parse_rows(rows).unwrap();
        let me = UserId::new("me");

        let chats = aggregate_chats(&messages, &me);
        assert_eq!(chats.len(), 2);
        assert_eq!(chats[0].partner_id.as_str(), "b");
        assert_eq!(chats[0].unread_count, 2);
        assert_eq!(chats[0].partner().map(|p| p.name.as_str()), Some("B"));
        assert_eq!(chats[1].partner_id.as_str(), "c");
        assert_eq!(chats[1].unread_count, 0);
        // Receiver profile was not embedded.
        assert!(chats[1].partner().is_none());
        assert_eq!(total_unread(&chats), 2);
    }

    #[tokio::test]
    async fn test_send_rejects_blank_content() {
        let client = YouniverseClient::builder()
            .project_url("http://127.0.0.1:9")
            .auth("token", "me")
            .build()
            .unwrap();

        let err = client
            .messages()
            .send("b")
            .content("   ")
            .send()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(ref m) if m.contains("empty")));
    }

    #[tokio::test]
    async fn test_chats_require_auth() {
        let client = YouniverseClient::builder()
            .project_url("http://127.0.0.1:9")
            .build()
            .unwrap();
        assert!(client.messages().chats().await.unwrap_err().is_auth_error());
    }
}
