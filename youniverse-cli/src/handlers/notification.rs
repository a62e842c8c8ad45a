//! Notification handlers.

use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use youniverse::{Notification, NotificationType, YouniverseClient};

use crate::output::{format_relative_time, PlainPrint, TableRow};

/// Notification info.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationInfo {
    pub id: String,
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub read: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_user_id: Option<String>,
    pub time: DateTime<Utc>,
}

impl From<&Notification> for NotificationInfo {
    fn from(n: &Notification) -> Self {
        Self {
            id: n.id.to_string(),
            kind: n.kind,
            title: n.title.clone(),
            message: n.message.clone(),
            read: n.read,
            related_user_id: n.related_user_id.as_ref().map(|u| u.to_string()),
            time: n.created_at,
        }
    }
}

impl TableRow for NotificationInfo {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Type", "Message", "Time", "Unread"]
    }
    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.kind.param().to_string(),
            self.message.clone(),
            format_relative_time(self.time),
            if self.read { String::new() } else { "●".to_string() },
        ]
    }
}

impl PlainPrint for NotificationInfo {
    fn plain_print(&self) {
        let marker = if self.read {
            String::new()
        } else {
            "● ".red().to_string()
        };
        println!(
            "{}{} {} {}",
            marker,
            self.title.bold(),
            format!("[{}]", self.id).dimmed(),
            format_relative_time(self.time).dimmed()
        );
        println!("   {}", self.message);
    }
}

/// Notification list result.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationListOutput {
    pub page: u32,
    pub has_more: bool,
    pub unread_total: usize,
    pub notifications: Vec<NotificationInfo>,
}

/// List notifications.
pub async fn list_notifications(
    client: &YouniverseClient,
    page: u32,
    unread_only: bool,
) -> Result<NotificationListOutput> {
    let api = client.notifications();
    let (result, unread_total) = tokio::try_join!(
        api.list().page(page).unread_only(unread_only).send(),
        api.unread_count(),
    )?;

    Ok(NotificationListOutput {
        page: result.page,
        has_more: result.has_more,
        unread_total,
        notifications: result
            .notifications
            .iter()
            .map(NotificationInfo::from)
            .collect(),
    })
}

/// Mark one notification as read.
pub async fn mark_read(client: &YouniverseClient, id: &str) -> Result<()> {
    client.notifications().mark_read(id).await?;
    Ok(())
}

/// Mark all notifications as read.
pub async fn mark_all_read(client: &YouniverseClient) -> Result<usize> {
    Ok(client.notifications().mark_all_read().await?)
}
