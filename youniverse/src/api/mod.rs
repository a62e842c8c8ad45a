//! API modules.

mod connection;
mod message;
mod notification;
mod post;
mod profile;

pub use connection::ConnectionApi;
pub use message::{
    ChatListResult, ConversationBuilder, ConversationResult, MessageApi, SendMessageBuilder,
};
pub use notification::{
    NotificationApi, NotificationListBuilder, NotificationListResult, NOTIFICATION_PAGE_SIZE,
};
pub use post::{
    CommentBuilder, CreatePostBuilder, FeedBuilder, LikeResult, PostApi, ShareBuilder,
    ShareResult, MAX_POST_CHARS,
};
pub use profile::{ProfileApi, StudentSearchBuilder, StudentSearchResult, SEARCH_PAGE_SIZE};

use crate::client::{ClientInner, Query};
use crate::models::UserId;

pub(crate) const NOTIFICATIONS: &str = "notifications";

/// Name used in outgoing notifications. Falls back to a neutral label.
pub(crate) async fn display_name(client: &ClientInner, user_id: &UserId) -> String {
    let query = Query::new().select("name").eq("id", user_id);
    match client.select_one::<NameRow>("profiles", query).await {
        Ok(Some(row)) if !row.name.trim().is_empty() => row.name,
        Ok(_) => "Someone".to_owned(),
        Err(e) => {
            log::debug!("could not load profile {user_id} for notification: {e}");
            "Someone".to_owned()
        }
    }
}

#[derive(serde::Deserialize)]
struct NameRow {
    name: String,
}
