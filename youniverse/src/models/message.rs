//! Direct message models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MessageId, Profile, UserId};

/// A row of the `messages` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message ID.
    pub id: MessageId,
    /// Sender user ID.
    pub sender_id: UserId,
    /// Receiver user ID.
    pub receiver_id: UserId,
    /// Message text.
    pub content: String,
    /// Set once the receiver has opened the conversation.
    #[serde(default)]
    pub read: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Check whether this message was sent by `user_id`.
    pub fn is_from(&self, user_id: &UserId) -> bool {
        &self.sender_id == user_id
    }

    /// The conversation partner relative to `viewer`.
    ///
    /// Returns `None` when `viewer` is neither sender nor receiver.
    pub fn partner_of(&self, viewer: &UserId) -> Option<&UserId> {
        if &self.sender_id == viewer {
            Some(&self.receiver_id)
        } else if &self.receiver_id == viewer {
            Some(&self.sender_id)
        } else {
            None
        }
    }

    /// Whether this message is still unread by `viewer`.
    pub fn is_unread_for(&self, viewer: &UserId) -> bool {
        !self.read && &self.receiver_id == viewer && &self.sender_id != viewer
    }
}

impl AsRef<Message> for Message {
    fn as_ref(&self) -> &Message {
        self
    }
}

/// A message with both endpoint profiles embedded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageWithProfiles {
    #[serde(flatten)]
    pub message: Message,
    #[serde(default)]
    pub sender: Option<Profile>,
    #[serde(default)]
    pub receiver: Option<Profile>,
}

impl MessageWithProfiles {
    /// The embedded profile of the conversation partner relative to `viewer`.
    pub fn partner_profile(&self, viewer: &UserId) -> Option<&Profile> {
        if &self.message.sender_id == viewer {
            self.receiver.as_ref()
        } else if &self.message.receiver_id == viewer {
            self.sender.as_ref()
        } else {
            None
        }
    }
}

impl AsRef<Message> for MessageWithProfiles {
    fn as_ref(&self) -> &Message {
        &self.message
    }
}

/// One conversation in the chat list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSummary<M = Message> {
    /// The other participant.
    pub partner_id: UserId,
    /// Most recent message exchanged with the partner.
    pub last_message: M,
    /// Number of partner→viewer messages not yet read.
    pub unread_count: u32,
}

impl<M: AsRef<Message>> ChatSummary<M> {
    /// Check if there are unread messages in this conversation.
    pub fn has_unread(&self) -> bool {
        self.unread_count > 0
    }

    /// Time of the last message.
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_message.as_ref().created_at
    }
}

impl ChatSummary<MessageWithProfiles> {
    /// The partner's profile, when it was embedded in the fetched rows.
    pub fn partner(&self) -> Option<&Profile> {
        let last = &self.last_message;
        if last.message.sender_id == self.partner_id {
            last.sender.as_ref()
        } else {
            last.receiver.as_ref()
        }
    }
}
