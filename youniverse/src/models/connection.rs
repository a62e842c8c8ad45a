//! Connection (friend request) models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ConnectionId, Profile, UserId};

/// Status of a connection request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl ConnectionStatus {
    /// Get the API parameter value.
    pub fn param(&self) -> &'static str {
        match self {
            ConnectionStatus::Pending => "pending",
            ConnectionStatus::Accepted => "accepted",
            ConnectionStatus::Rejected => "rejected",
        }
    }
}

/// A row of the `connections` table, optionally with both profiles embedded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    /// User who sent the request.
    pub requester_id: UserId,
    /// User who received the request.
    pub addressee_id: UserId,
    pub status: ConnectionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester: Option<Profile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addressee: Option<Profile>,
}

impl Connection {
    /// Check whether the user is one of the two endpoints.
    pub fn involves(&self, user_id: &UserId) -> bool {
        &self.requester_id == user_id || &self.addressee_id == user_id
    }

    /// The endpoint that is not `viewer`, if `viewer` is part of this connection.
    pub fn other_id(&self, viewer: &UserId) -> Option<&UserId> {
        if &self.requester_id == viewer {
            Some(&self.addressee_id)
        } else if &self.addressee_id == viewer {
            Some(&self.requester_id)
        } else {
            None
        }
    }

    /// The embedded profile of the endpoint that is not `viewer`.
    pub fn other_profile(&self, viewer: &UserId) -> Option<&Profile> {
        if &self.requester_id == viewer {
            self.addressee.as_ref()
        } else if &self.addressee_id == viewer {
            self.requester.as_ref()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_other_endpoint() {
        let conn = Connection {
            id: "c1".into(),
            requester_id: "a".into(),
            addressee_id: "b".into(),
            addressee: Some(Profile {
                id: "b".into(),
                name: "Bala".into(),
                ..Default::default()
            }),
            ..Default::default()
        };

        assert_eq!(conn.other_id(&"a".into()), Some(&UserId::new("b")));
        assert_eq!(conn.other_id(&"b".into()), Some(&UserId::new("a")));
        assert_eq!(conn.other_id(&"z".into()), None);
        assert_eq!(conn.other_profile(&"a".into()).map(|p| p.name.as_str()), Some("Bala"));
        assert!(conn.other_profile(&"b".into()).is_none());
        assert!(conn.involves(&"a".into()));
    }

    #[test]
    fn test_status_serde() {
        let s: ConnectionStatus = serde_json::from_str("\"accepted\"").unwrap();
        assert_eq!(s, ConnectionStatus::Accepted);
        assert_eq!(ConnectionStatus::Rejected.param(), "rejected");
    }
}
