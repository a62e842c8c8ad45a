//! Rust client library and view models for the Youniverse student network.
//!
//! The [`views`] module holds the pure transforms (chat aggregation, comment
//! threading, student filtering); [`YouniverseClient`] fetches the rows they
//! work on from the hosted REST backend.

pub mod api;
pub mod cache;
pub mod client;
pub mod error;
pub mod models;
pub mod views;

// Re-export main types
pub use client::{AuthInfo, HttpConfig, Order, Query, YouniverseClient, YouniverseClientBuilder};
pub use error::{Error, Result};

// Re-export commonly used models
pub use models::{
    ChatSummary, Comment, CommentId, Connection, ConnectionId, ConnectionStatus, FeedComment,
    FeedPost, LinkPreview, MediaKind, Message, MessageId, MessageWithProfiles, NewNotification,
    Notification, NotificationId, NotificationType, Post, PostId, Profile, ProfileUpdate,
    ShareType, StudentRole, UserId,
};

// Re-export view transforms
pub use views::{aggregate_chats, build_comment_threads, CommentThread, CommentThreads};

// Re-export API types
pub use api::{
    ChatListResult, ConversationResult, LikeResult, NotificationListResult, ShareResult,
    StudentSearchResult,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builder() {
        let client = YouniverseClient::builder()
            .project_url("https://abc.supabase.co")
            .api_key("anon")
            .build();
        assert!(client.is_ok());

        let client = client.unwrap();
        assert!(!client.is_authenticated());
        assert!(client.current_user_id().is_none());
    }

    #[test]
    fn test_client_with_auth() {
        let client = YouniverseClient::builder()
            .project_url("https://abc.supabase.co")
            .api_key("anon")
            .auth("test_token", "7d3f")
            .build()
            .unwrap();

        assert!(client.is_authenticated());
        assert_eq!(client.current_user_id().map(UserId::as_str), Some("7d3f"));
    }
}
