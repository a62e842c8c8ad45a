//! Connection API.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use super::{display_name, NOTIFICATIONS};
use crate::{
    client::{ClientInner, Order, Query},
    error::{Error, Result},
    models::{Connection, ConnectionId, ConnectionStatus, NewNotification, UserId},
    views::{connection_status, StudentConnectionStatus},
};

const CONNECTIONS: &str = "connections";

/// Connection rows with both endpoint profiles embedded.
const CONNECTION_SELECT: &str = "*,\
requester:profiles!connections_requester_id_fkey(*),\
addressee:profiles!connections_addressee_id_fkey(*)";

/// API for connection requests between students.
pub struct ConnectionApi {
    client: Arc<ClientInner>,
}

#[derive(Serialize)]
struct NewConnection<'a> {
    requester_id: &'a UserId,
    addressee_id: &'a UserId,
    status: ConnectionStatus,
}

impl ConnectionApi {
    pub(crate) fn new(client: Arc<ClientInner>) -> Self {
        Self { client }
    }

    /// Accepted connections of the signed-in user, newest first.
    pub async fn accepted(&self) -> Result<Vec<Connection>> {
        let viewer = self.client.viewer()?;
        let query = Query::new()
            .select(CONNECTION_SELECT)
            .or([
                format!("requester_id.eq.{viewer}"),
                format!("addressee_id.eq.{viewer}"),
            ])
            .eq("status", ConnectionStatus::Accepted.param())
            .order("created_at", Order::Desc);

        self.client.select_rows(CONNECTIONS, &query).await
    }

    /// Pending requests addressed to the signed-in user, newest first.
    pub async fn pending(&self) -> Result<Vec<Connection>> {
        let viewer = self.client.viewer()?;
        let query = Query::new()
            .select(CONNECTION_SELECT)
            .eq("addressee_id", viewer)
            .eq("status", ConnectionStatus::Pending.param())
            .order("created_at", Order::Desc);

        self.client.select_rows(CONNECTIONS, &query).await
    }

    /// Every non-rejected connection row touching the signed-in user.
    async fn involving_viewer(&self) -> Result<Vec<Connection>> {
        let viewer = self.client.viewer()?;
        let query = Query::new()
            .or([
                format!("requester_id.eq.{viewer}"),
                format!("addressee_id.eq.{viewer}"),
            ])
            .filter("status", format!("neq.{}", ConnectionStatus::Rejected.param()));

        self.client.select_rows(CONNECTIONS, &query).await
    }

    /// Relationship between the signed-in user and `other`.
    pub async fn status_with(&self, other: impl Into<UserId>) -> Result<StudentConnectionStatus> {
        let other = other.into();
        let viewer = self.client.viewer()?.clone();
        if viewer == other {
            return Ok(StudentConnectionStatus::Myself);
        }
        let connections = self.involving_viewer().await?;
        Ok(connection_status(&viewer, &other, &connections))
    }

    /// Send a connection request and notify the addressee.
    pub async fn request(&self, addressee: impl Into<UserId>) -> Result<Connection> {
        let addressee = addressee.into();
        let viewer = self.client.viewer()?.clone();

        if addressee.is_empty() {
            return Err(Error::InvalidArgument("User ID must not be empty".into()));
        }
        if addressee == viewer {
            return Err(Error::InvalidArgument(
                "Cannot send a connection request to yourself".into(),
            ));
        }

        let existing = self.involving_viewer().await?;
        match connection_status(&viewer, &addressee, &existing) {
            StudentConnectionStatus::Connected => {
                return Err(Error::InvalidArgument(format!(
                    "Already connected with {addressee}"
                )));
            }
            StudentConnectionStatus::PendingSent | StudentConnectionStatus::PendingReceived => {
                return Err(Error::InvalidArgument(format!(
                    "A connection request with {addressee} is already pending"
                )));
            }
            _ => {}
        }

        let connection: Connection = self
            .client
            .insert_row(
                CONNECTIONS,
                &NewConnection {
                    requester_id: &viewer,
                    addressee_id: &addressee,
                    status: ConnectionStatus::Pending,
                },
            )
            .await?;

        let name = display_name(&self.client, &viewer).await;
        let notification = NewNotification::connection_request(addressee, viewer, &name);
        if let Err(e) = self
            .client
            .insert_minimal(NOTIFICATIONS, &notification)
            .await
        {
            log::warn!("connection request sent but notification failed: {e}");
        }

        Ok(connection)
    }

    /// Accept a pending request addressed to the signed-in user.
    pub async fn accept(&self, connection_id: impl Into<ConnectionId>) -> Result<Connection> {
        let connection = self
            .respond(connection_id.into(), ConnectionStatus::Accepted)
            .await?;

        let viewer = self.client.viewer()?.clone();
        let name = display_name(&self.client, &viewer).await;
        let notification =
            NewNotification::connection_accepted(connection.requester_id.clone(), viewer, &name);
        if let Err(e) = self
            .client
            .insert_minimal(NOTIFICATIONS, &notification)
            .await
        {
            log::warn!("connection accepted but notification failed: {e}");
        }

        Ok(connection)
    }

    /// Reject a pending request addressed to the signed-in user.
    pub async fn reject(&self, connection_id: impl Into<ConnectionId>) -> Result<Connection> {
        self.respond(connection_id.into(), ConnectionStatus::Rejected)
            .await
    }

    async fn respond(
        &self,
        connection_id: ConnectionId,
        status: ConnectionStatus,
    ) -> Result<Connection> {
        let viewer = self.client.viewer()?;
        let query = Query::new()
            .eq("id", &connection_id)
            .eq("addressee_id", viewer)
            .eq("status", ConnectionStatus::Pending.param());

        let rows: Vec<Connection> = self
            .client
            .update_rows(CONNECTIONS, &query, &json!({ "status": status }))
            .await?;

        rows.into_iter().next().ok_or_else(|| {
            Error::api(
                "404",
                format!("No pending request {connection_id} addressed to you"),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::YouniverseClient;
    use pretty_assertions::assert_eq;

    fn client_as(user: &str) -> YouniverseClient {
        YouniverseClient::builder()
            .project_url("http://127.0.0.1:9")
            .auth("token", user)
            .build()
            .unwrap()
    }

    #[test]
    fn test_connection_row_with_profiles() {
        let row = serde_json::json!([{
            "id": "c1",
            "requester_id": "u1",
            "addressee_id": "u2",
            "status": "pending",
            "created_at": "2024-05-01T08:30:00+00:00",
            "updated_at": "2024-05-01T08:30:00+00:00",
            "requester": {
                "id": "u1", "email": "a@x.in", "name": "Aarav",
                "role": "student_in_india", "country": "India",
                "created_at": "2024-01-01T00:00:00+00:00",
                "updated_at": "2024-01-01T00:00:00+00:00"
            },
            "addressee": null
        }]);
        let rows: Vec<Connection> = crate::client::parse_rows(row).unwrap();
        let conn = &rows[0];
        assert_eq!(conn.status, ConnectionStatus::Pending);
        assert_eq!(
            conn.other_profile(&"u2".into()).map(|p| p.name.as_str()),
            Some("Aarav")
        );
        assert!(conn.addressee.is_none());
    }

    #[tokio::test]
    async fn test_request_to_self_rejected() {
        let err = client_as("u1")
            .connections()
            .request("u1")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(ref m) if m.contains("yourself")));
    }

    #[tokio::test]
    async fn test_status_with_self_needs_no_request() {
        let status = client_as("u1")
            .connections()
            .status_with("u1")
            .await
            .unwrap();
        assert_eq!(status, StudentConnectionStatus::Myself);
    }

    #[tokio::test]
    async fn test_listing_requires_auth() {
        let client = YouniverseClient::builder()
            .project_url("http://127.0.0.1:9")
            .build()
            .unwrap();
        assert!(client.connections().pending().await.unwrap_err().is_auth_error());
    }
}
