//! Notification API.

use std::sync::Arc;

use serde_json::json;

use super::NOTIFICATIONS;
use crate::{
    client::{ClientInner, Order, Query},
    error::{Error, Result},
    models::{Notification, NotificationId, NotificationType},
};

/// Default page size of notification lists.
pub const NOTIFICATION_PAGE_SIZE: u32 = 20;

/// API for notification operations.
pub struct NotificationApi {
    client: Arc<ClientInner>,
}

impl NotificationApi {
    pub(crate) fn new(client: Arc<ClientInner>) -> Self {
        Self { client }
    }

    /// List the signed-in user's notifications.
    pub fn list(&self) -> NotificationListBuilder {
        NotificationListBuilder {
            client: self.client.clone(),
            kind: None,
            unread_only: false,
            page: 1,
            per_page: NOTIFICATION_PAGE_SIZE,
        }
    }

    /// Mark one notification as read.
    pub async fn mark_read(&self, notification_id: impl Into<NotificationId>) -> Result<()> {
        let notification_id = notification_id.into();
        let viewer = self.client.viewer()?;
        let query = Query::new()
            .eq("id", &notification_id)
            .eq("user_id", viewer);

        let updated: Vec<Notification> = self
            .client
            .update_rows(NOTIFICATIONS, &query, &json!({ "read": true }))
            .await?;

        if updated.is_empty() {
            return Err(Error::api(
                "404",
                format!("Notification {notification_id} not found"),
            ));
        }
        Ok(())
    }

    /// Mark every unread notification as read. Returns how many changed.
    pub async fn mark_all_read(&self) -> Result<usize> {
        let viewer = self.client.viewer()?;
        let query = Query::new().eq("user_id", viewer).eq("read", false);

        let updated: Vec<Notification> = self
            .client
            .update_rows(NOTIFICATIONS, &query, &json!({ "read": true }))
            .await?;
        Ok(updated.len())
    }

    /// Number of unread notifications.
    pub async fn unread_count(&self) -> Result<usize> {
        let viewer = self.client.viewer()?;
        let query = Query::new()
            .select("id")
            .eq("user_id", viewer)
            .eq("read", false);

        let rows: Vec<serde_json::Value> = self.client.select_rows(NOTIFICATIONS, &query).await?;
        Ok(rows.len())
    }
}

/// Builder for notification list requests.
pub struct NotificationListBuilder {
    client: Arc<ClientInner>,
    kind: Option<NotificationType>,
    unread_only: bool,
    page: u32,
    per_page: u32,
}

impl NotificationListBuilder {
    /// Only notifications of this type.
    pub fn kind(mut self, kind: NotificationType) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Only unread notifications.
    pub fn unread_only(mut self, unread: bool) -> Self {
        self.unread_only = unread;
        self
    }

    /// Set the page number.
    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Set the page size.
    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    /// Execute the request.
    pub async fn send(self) -> Result<NotificationListResult> {
        let viewer = self.client.viewer()?;
        let mut query = Query::new().eq("user_id", viewer);
        if let Some(kind) = self.kind {
            query = query.eq("type", kind.param());
        }
        if self.unread_only {
            query = query.eq("read", false);
        }
        // One extra row tells whether another page exists.
        let query = query
            .order("created_at", Order::Desc)
            .limit(self.per_page + 1)
            .offset((self.page - 1) * self.per_page);

        let mut notifications: Vec<Notification> =
            self.client.select_rows(NOTIFICATIONS, &query).await?;

        let has_more = notifications.len() > self.per_page as usize;
        notifications.truncate(self.per_page as usize);

        Ok(NotificationListResult {
            notifications,
            page: self.page,
            has_more,
        })
    }
}

/// Result of a notification list request.
#[derive(Debug, Clone, Default)]
pub struct NotificationListResult {
    /// Notifications, newest first.
    pub notifications: Vec<Notification>,
    /// Current page.
    pub page: u32,
    /// Whether a further page exists.
    pub has_more: bool,
}

impl NotificationListResult {
    /// Unread notifications on this page.
    pub fn unread(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{parse_rows, YouniverseClient};

    #[test]
    fn test_notification_rows() {
        let rows = serde_json::json!([
            {
                "id": "n2", "user_id": "me", "type": "message", "title": "New Message",
                "message": "Zoya sent you a message", "read": false, "related_user_id": "z",
                "created_at": "2024-05-02T08:30:00+00:00"
            },
            {
                "id": "n1", "user_id": "me", "type": "connection_request",
                "title": "New Connection Request", "message": "Dev sent you a connection request",
                "read": true, "related_user_id": null,
                "created_at": "2024-05-01T08:30:00+00:00"
            }
        ]);
        let result = NotificationListResult {
            notifications: parse_rows(rows).unwrap(),
            page: 1,
            has_more: false,
        };
        assert_eq!(result.unread(), 1);
        assert_eq!(result.notifications[0].kind, NotificationType::Message);
    }

    #[tokio::test]
    async fn test_requires_auth() {
        let client = YouniverseClient::builder()
            .project_url("http://127.0.0.1:9")
            .build()
            .unwrap();
        assert!(client
            .notifications()
            .unread_count()
            .await
            .unwrap_err()
            .is_auth_error());
        assert!(client
            .notifications()
            .list()
            .send()
            .await
            .unwrap_err()
            .is_auth_error());
    }
}
