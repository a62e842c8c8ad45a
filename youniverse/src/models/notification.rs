//! Notification models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{NotificationId, UserId};

/// A row of the `notifications` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Notification ID.
    pub id: NotificationId,
    /// Recipient.
    pub user_id: UserId,
    /// Type of notification.
    #[serde(rename = "type")]
    pub kind: NotificationType,
    /// Short title.
    pub title: String,
    /// Notification body.
    pub message: String,
    /// Whether notification has been read.
    #[serde(default)]
    pub read: bool,
    /// User who triggered the notification.
    #[serde(default)]
    pub related_user_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

/// Type of notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// Someone sent a connection request.
    #[default]
    ConnectionRequest,
    /// New direct message.
    Message,
    /// A connection request was accepted.
    ConnectionAccepted,
    /// A connection published a post.
    NewPost,
}

impl NotificationType {
    /// Get the API parameter value.
    pub fn param(&self) -> &'static str {
        match self {
            NotificationType::ConnectionRequest => "connection_request",
            NotificationType::Message => "message",
            NotificationType::ConnectionAccepted => "connection_accepted",
            NotificationType::NewPost => "new_post",
        }
    }
}

/// A notification to be inserted for another user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewNotification {
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub related_user_id: Option<UserId>,
}

impl NewNotification {
    /// "New Message" notification for the receiver of a direct message.
    pub fn message(receiver: UserId, sender: UserId, sender_name: &str) -> Self {
        Self {
            user_id: receiver,
            kind: NotificationType::Message,
            title: "New Message".to_owned(),
            message: format!("{sender_name} sent you a message"),
            related_user_id: Some(sender),
        }
    }

    /// "New Connection Request" notification for the addressee.
    pub fn connection_request(addressee: UserId, requester: UserId, requester_name: &str) -> Self {
        Self {
            user_id: addressee,
            kind: NotificationType::ConnectionRequest,
            title: "New Connection Request".to_owned(),
            message: format!("{requester_name} sent you a connection request"),
            related_user_id: Some(requester),
        }
    }

    /// "Connection Accepted" notification for the original requester.
    pub fn connection_accepted(requester: UserId, addressee: UserId, addressee_name: &str) -> Self {
        Self {
            user_id: requester,
            kind: NotificationType::ConnectionAccepted,
            title: "Connection Accepted".to_owned(),
            message: format!("{addressee_name} accepted your connection request"),
            related_user_id: Some(addressee),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_row_parse() {
        let row = r#"{
            "id": "n1", "user_id": "u1", "type": "connection_accepted",
            "title": "Connection Accepted", "message": "Priya accepted your connection request",
            "read": false, "related_user_id": "u2", "created_at": "2024-05-01T08:30:00+00:00"
        }"#;
        let n: Notification = serde_json::from_str(row).unwrap();
        assert_eq!(n.kind, NotificationType::ConnectionAccepted);
        assert_eq!(n.related_user_id, Some(UserId::new("u2")));
    }

    #[test]
    fn test_new_message_notification() {
        let n = NewNotification::message("r".into(), "s".into(), "Priya");
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["type"], "message");
        assert_eq!(json["message"], "Priya sent you a message");
        assert_eq!(json["related_user_id"], "s");
    }
}
