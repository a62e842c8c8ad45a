//! Connection handlers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use youniverse::{Connection, ConnectionStatus, UserId, YouniverseClient};

use crate::output::{format_relative_time, PlainPrint, TableRow};

/// A connection seen from the signed-in user's side.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionInfo {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub headline: String,
    pub status: String,
    pub incoming: bool,
    pub since: String,
}

impl ConnectionInfo {
    fn new(conn: &Connection, viewer: &UserId) -> Self {
        let other = conn.other_profile(viewer);
        Self {
            id: conn.id.to_string(),
            user_id: conn
                .other_id(viewer)
                .map(|id| id.to_string())
                .unwrap_or_default(),
            name: other.map(|p| p.name.clone()).unwrap_or_default(),
            headline: other.map(|p| p.headline()).unwrap_or_default(),
            status: conn.status.param().to_string(),
            incoming: &conn.addressee_id == viewer,
            since: format_relative_time(conn.updated_at),
        }
    }
}

impl TableRow for ConnectionInfo {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "User", "Name", "Studying", "Status", "Since"]
    }
    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.user_id.clone(),
            self.name.clone(),
            self.headline.clone(),
            self.status.clone(),
            self.since.clone(),
        ]
    }
}

impl PlainPrint for ConnectionInfo {
    fn plain_print(&self) {
        println!(
            "{} {} {}",
            format!("[{}]", self.id).cyan(),
            self.name.green(),
            format!("({})", self.user_id).dimmed()
        );
        println!("   {} | {}", self.headline, self.since.dimmed());
    }
}

fn to_infos(client: &YouniverseClient, connections: &[Connection]) -> Vec<ConnectionInfo> {
    let Some(viewer) = client.current_user_id() else {
        return Vec::new();
    };
    connections
        .iter()
        .map(|c| ConnectionInfo::new(c, viewer))
        .collect()
}

/// Accepted connections.
pub async fn list_connections(client: &YouniverseClient) -> Result<Vec<ConnectionInfo>> {
    let connections = client.connections().accepted().await?;
    Ok(to_infos(client, &connections))
}

/// Pending requests addressed to the signed-in user.
pub async fn pending_requests(client: &YouniverseClient) -> Result<Vec<ConnectionInfo>> {
    let connections = client.connections().pending().await?;
    Ok(to_infos(client, &connections))
}

/// Result of a connection state change.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionChange {
    pub id: String,
    pub status: ConnectionStatus,
    pub requester_id: String,
    pub addressee_id: String,
}

impl From<Connection> for ConnectionChange {
    fn from(c: Connection) -> Self {
        Self {
            id: c.id.to_string(),
            status: c.status,
            requester_id: c.requester_id.to_string(),
            addressee_id: c.addressee_id.to_string(),
        }
    }
}

/// Send a connection request.
pub async fn send_request(client: &YouniverseClient, user_id: &str) -> Result<ConnectionChange> {
    Ok(client.connections().request(user_id).await?.into())
}

/// Accept a pending request.
pub async fn accept_request(
    client: &YouniverseClient,
    connection_id: &str,
) -> Result<ConnectionChange> {
    Ok(client.connections().accept(connection_id).await?.into())
}

/// Reject a pending request.
pub async fn reject_request(
    client: &YouniverseClient,
    connection_id: &str,
) -> Result<ConnectionChange> {
    Ok(client.connections().reject(connection_id).await?.into())
}
