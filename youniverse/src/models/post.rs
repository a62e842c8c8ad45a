//! Feed post models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FeedComment, PostId, Profile, UserId};
use crate::views::CommentThread;

/// A row of the `posts` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Post ID.
    pub id: PostId,
    /// Author of the post.
    pub author_id: UserId,
    /// Text content.
    pub content: String,
    /// Hashtags, without the leading `#`.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub likes_count: i32,
    #[serde(default)]
    pub comments_count: i32,
    #[serde(default)]
    pub shares_count: i32,
    /// Public URLs of uploaded media.
    #[serde(default)]
    pub media_urls: Option<Vec<String>>,
    /// MIME types, parallel to `media_urls`.
    #[serde(default)]
    pub media_types: Option<Vec<String>>,
    #[serde(default)]
    pub link_preview: Option<LinkPreview>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Media attachments paired with their kind.
    pub fn media(&self) -> Vec<(&str, MediaKind)> {
        let urls = self.media_urls.as_deref().unwrap_or_default();
        let types = self.media_types.as_deref().unwrap_or_default();
        urls.iter()
            .enumerate()
            .map(|(i, url)| {
                let kind = types
                    .get(i)
                    .and_then(|t| MediaKind::from_mime(t))
                    .unwrap_or(MediaKind::Unknown);
                (url.as_str(), kind)
            })
            .collect()
    }

    /// Tags, or an empty slice.
    pub fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or_default()
    }
}

/// Preview metadata for a link attached to a post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkPreview {
    pub url: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl LinkPreview {
    /// Placeholder preview used until a real unfurling service is wired in.
    pub fn placeholder(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: "Link Preview".to_owned(),
            description: "Click to view the link".to_owned(),
            image: None,
        }
    }
}

/// Media attachment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    Image,
    Video,
    /// Stored type is missing or not one we render.
    Unknown,
}

impl MediaKind {
    /// Determine the kind from an accepted MIME type.
    ///
    /// Only JPEG, PNG and GIF images and MP4 and QuickTime videos are accepted.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_lowercase().as_str() {
            "image/jpeg" | "image/png" | "image/gif" => Some(MediaKind::Image),
            "video/mp4" | "video/quicktime" => Some(MediaKind::Video),
            _ => None,
        }
    }
}

/// How a post was shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareType {
    /// Reshared inside the network.
    Internal,
    /// Shared to an external platform.
    External,
    /// Link copied.
    Link,
}

impl ShareType {
    /// Get the API parameter value.
    pub fn param(&self) -> &'static str {
        match self {
            ShareType::Internal => "internal",
            ShareType::External => "external",
            ShareType::Link => "link",
        }
    }

    /// Parse a share type from user input.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "internal" => Some(ShareType::Internal),
            "external" => Some(ShareType::External),
            "link" => Some(ShareType::Link),
            _ => None,
        }
    }
}

/// A post as shown in the feed: author, like state and comment threads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedPost {
    #[serde(flatten)]
    pub post: Post,
    /// Author profile, when embedded.
    pub author: Option<Profile>,
    /// Whether the viewer liked this post.
    pub liked: bool,
    /// Top-level comments with their replies, oldest first.
    pub comments: Vec<CommentThread<FeedComment>>,
}

impl FeedPost {
    /// Find a comment or reply by ID.
    pub fn find_comment(&self, comment_id: &super::CommentId) -> Option<&FeedComment> {
        self.comments.iter().find_map(|thread| {
            if &thread.comment.comment.id == comment_id {
                Some(&thread.comment)
            } else {
                thread.replies.iter().find(|r| &r.comment.id == comment_id)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind() {
        assert_eq!(MediaKind::from_mime("image/jpeg"), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_mime("VIDEO/MP4"), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_mime("image/webp"), None);
        assert_eq!(MediaKind::from_mime("application/pdf"), None);
    }

    #[test]
    fn test_post_media_pairs() {
        let post = Post {
            media_urls: Some(vec!["a.png".into(), "b.mov".into(), "c.bin".into()]),
            media_types: Some(vec!["image/png".into(), "video/quicktime".into()]),
            ..Default::default()
        };
        assert_eq!(
            post.media(),
            vec![
                ("a.png", MediaKind::Image),
                ("b.mov", MediaKind::Video),
                ("c.bin", MediaKind::Unknown),
            ]
        );
        assert!(Post::default().media().is_empty());
    }

    #[test]
    fn test_post_row_parse() {
        let row = r#"{
            "id": "p1", "author_id": "u1", "content": "Visa tips #germany",
            "tags": ["germany"], "likes_count": 3, "comments_count": 1, "shares_count": 0,
            "media_urls": null, "media_types": null,
            "link_preview": {"url": "https://example.com", "title": "Link Preview",
                             "description": "Click to view the link", "image": null},
            "created_at": "2024-05-01T08:30:00+00:00", "updated_at": "2024-05-01T08:30:00+00:00"
        }"#;
        let post: Post = serde_json::from_str(row).unwrap();
        assert_eq!(post.tags(), ["germany".to_string()]);
        assert_eq!(post.link_preview, Some(LinkPreview::placeholder("https://example.com")));
    }

    #[test]
    fn test_share_type_parse() {
        assert_eq!(ShareType::parse("Link"), Some(ShareType::Link));
        assert_eq!(ShareType::parse("email"), None);
        assert_eq!(ShareType::External.param(), "external");
    }
}
