//! Comment models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CommentId, PostId, Profile, UserId};

/// A row of the `comments` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment ID.
    pub id: CommentId,
    /// Post this comment belongs to.
    pub post_id: PostId,
    /// Author of the comment.
    pub author_id: UserId,
    /// Text content.
    pub content: String,
    /// Parent comment, `None` for top-level comments.
    #[serde(default)]
    pub parent_comment_id: Option<CommentId>,
    #[serde(default)]
    pub likes_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    /// Check if this is a top-level comment.
    pub fn is_top_level(&self) -> bool {
        self.parent_comment_id.is_none()
    }
}

impl AsRef<Comment> for Comment {
    fn as_ref(&self) -> &Comment {
        self
    }
}

/// A comment as shown in the feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedComment {
    #[serde(flatten)]
    pub comment: Comment,
    /// Author profile, when embedded.
    #[serde(default)]
    pub author: Option<Profile>,
    /// Whether the viewer liked this comment.
    #[serde(default)]
    pub liked: bool,
}

impl AsRef<Comment> for FeedComment {
    fn as_ref(&self) -> &Comment {
        &self.comment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_row_parse() {
        let row = r#"{
            "id": "c2", "post_id": "p1", "author_id": "u2", "content": "Same here",
            "parent_comment_id": "c1", "likes_count": 0,
            "created_at": "2024-05-01T09:00:00+00:00", "updated_at": "2024-05-01T09:00:00+00:00",
            "author": {"id": "u2", "email": "r@example.com", "name": "Rahul", "role": "student_in_india",
                       "country": "India", "profile_completed": true, "is_new_user": false,
                       "created_at": "2024-01-01T00:00:00+00:00", "updated_at": "2024-01-01T00:00:00+00:00"}
        }"#;
        let c: FeedComment = serde_json::from_str(row).unwrap();
        assert!(!c.comment.is_top_level());
        assert_eq!(c.comment.parent_comment_id, Some(CommentId::new("c1")));
        assert_eq!(c.author.as_ref().map(|a| a.name.as_str()), Some("Rahul"));
        assert!(!c.liked);
    }
}
