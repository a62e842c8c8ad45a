//! Typed rows of the Youniverse backend tables.

mod comment;
mod connection;
mod ids;
mod message;
mod notification;
mod post;
mod profile;

pub use comment::{Comment, FeedComment};
pub use connection::{Connection, ConnectionStatus};
pub use ids::{CommentId, ConnectionId, MessageId, NotificationId, PostId, UserId};
pub use message::{ChatSummary, Message, MessageWithProfiles};
pub use notification::{NewNotification, Notification, NotificationType};
pub use post::{FeedPost, LinkPreview, MediaKind, Post, ShareType};
pub use profile::{Profile, ProfileUpdate, StudentRole};
