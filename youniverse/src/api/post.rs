//! Post and feed API.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    client::{ClientInner, Order, Query},
    error::{Error, Result},
    models::{
        Comment, CommentId, FeedComment, FeedPost, LinkPreview, MediaKind, Post, PostId, Profile,
        ShareType, UserId,
    },
    views::{build_comment_threads, extract_hashtags},
};

const POSTS: &str = "posts";
const COMMENTS: &str = "comments";
const POST_LIKES: &str = "post_likes";
const COMMENT_LIKES: &str = "comment_likes";
const SHARES: &str = "shares";

const POST_SELECT: &str = "*,author:profiles!posts_author_id_fkey(*)";
const COMMENT_SELECT: &str = "*,author:profiles!comments_author_id_fkey(*)";

/// Maximum post length in characters.
pub const MAX_POST_CHARS: usize = 2000;

/// API for posts, comments, likes and shares.
pub struct PostApi {
    client: Arc<ClientInner>,
}

/// A post row with its author embedded.
#[derive(Deserialize)]
struct PostRow {
    #[serde(flatten)]
    post: Post,
    #[serde(default)]
    author: Option<Profile>,
}

#[derive(Deserialize)]
struct PostIdRow {
    post_id: PostId,
}

#[derive(Deserialize)]
struct CommentIdRow {
    comment_id: CommentId,
}

#[derive(Deserialize)]
struct IdRow {
    id: String,
}

impl PostApi {
    pub(crate) fn new(client: Arc<ClientInner>) -> Self {
        Self { client }
    }

    /// Fetch the feed.
    pub fn feed(&self) -> FeedBuilder {
        FeedBuilder {
            client: self.client.clone(),
            limit: None,
            author: None,
        }
    }

    /// Fetch a single post with its comment threads.
    pub async fn get(&self, post_id: impl Into<PostId>) -> Result<FeedPost> {
        let post_id = post_id.into();
        let query = Query::new().select(POST_SELECT).eq("id", &post_id);
        let row: PostRow = self
            .client
            .select_one(POSTS, query)
            .await?
            .ok_or_else(|| Error::api("404", format!("Post {post_id} not found")))?;

        let mut posts = assemble_feed(&self.client, vec![row]).await?;
        posts
            .pop()
            .ok_or_else(|| Error::missing(format!("post {post_id}")))
    }

    /// Compose a new post.
    pub fn create(&self) -> CreatePostBuilder {
        CreatePostBuilder {
            client: self.client.clone(),
            content: String::new(),
            media: Vec::new(),
            link: None,
        }
    }

    /// Like the post, or remove the like if already liked.
    pub async fn toggle_like(&self, post_id: impl Into<PostId>) -> Result<LikeResult> {
        let post_id = post_id.into();
        let viewer = self.client.viewer()?;
        let existing = Query::new()
            .select("id")
            .eq("post_id", &post_id)
            .eq("user_id", viewer);

        let liked = match self.client.select_one::<IdRow>(POST_LIKES, existing).await? {
            Some(row) => {
                self.client
                    .delete_rows(POST_LIKES, &Query::new().eq("id", &row.id))
                    .await?;
                false
            }
            None => {
                self.client
                    .insert_minimal(
                        POST_LIKES,
                        &json!({ "post_id": post_id, "user_id": viewer }),
                    )
                    .await?;
                true
            }
        };

        let delta = if liked { 1 } else { -1 };
        let likes_count =
            bump_counter(&self.client, POSTS, post_id.as_str(), "likes_count", delta).await?;
        Ok(LikeResult { liked, likes_count })
    }

    /// Comment on a post.
    pub fn comment(&self, post_id: impl Into<PostId>) -> CommentBuilder {
        CommentBuilder {
            client: self.client.clone(),
            post_id: post_id.into(),
            parent: None,
            content: String::new(),
        }
    }

    /// Like the comment, or remove the like if already liked.
    pub async fn toggle_comment_like(&self, comment_id: impl Into<CommentId>) -> Result<LikeResult> {
        let comment_id = comment_id.into();
        let viewer = self.client.viewer()?;
        let existing = Query::new()
            .select("id")
            .eq("comment_id", &comment_id)
            .eq("user_id", viewer);

        let liked = match self.client.select_one::<IdRow>(COMMENT_LIKES, existing).await? {
            Some(row) => {
                self.client
                    .delete_rows(COMMENT_LIKES, &Query::new().eq("id", &row.id))
                    .await?;
                false
            }
            None => {
                self.client
                    .insert_minimal(
                        COMMENT_LIKES,
                        &json!({ "comment_id": comment_id, "user_id": viewer }),
                    )
                    .await?;
                true
            }
        };

        let delta = if liked { 1 } else { -1 };
        let likes_count =
            bump_counter(&self.client, COMMENTS, comment_id.as_str(), "likes_count", delta).await?;
        Ok(LikeResult { liked, likes_count })
    }

    /// Share a post.
    pub fn share(&self, post_id: impl Into<PostId>, kind: ShareType) -> ShareBuilder {
        ShareBuilder {
            client: self.client.clone(),
            post_id: post_id.into(),
            kind,
            platform: None,
        }
    }

    /// Delete one of the signed-in user's comments.
    ///
    /// Replies to a deleted top-level comment stay in the table but are no
    /// longer reachable from any thread.
    pub async fn delete_comment(&self, comment_id: impl Into<CommentId>) -> Result<()> {
        let comment_id = comment_id.into();
        let viewer = self.client.viewer()?;
        let own = Query::new()
            .eq("id", &comment_id)
            .eq("author_id", viewer);

        let comment: Comment = self
            .client
            .select_one(COMMENTS, own.clone())
            .await?
            .ok_or_else(|| {
                Error::api("404", format!("Comment {comment_id} not found or not yours"))
            })?;

        self.client.delete_rows(COMMENTS, &own).await?;
        bump_counter(
            &self.client,
            POSTS,
            comment.post_id.as_str(),
            "comments_count",
            -1,
        )
        .await?;
        Ok(())
    }
}

/// Read a counter column, apply `delta` and write it back, never below zero.
async fn bump_counter(
    client: &ClientInner,
    table: &str,
    id: &str,
    column: &str,
    delta: i32,
) -> Result<i32> {
    let current: serde_json::Value = client
        .select_one(table, Query::new().select(column).eq("id", id))
        .await?
        .ok_or_else(|| Error::api("404", format!("{table} row {id} not found")))?;

    let count = current
        .get(column)
        .and_then(|v| v.as_i64())
        .unwrap_or_default() as i32;
    let next = (count + delta).max(0);

    client
        .update_rows::<_, serde_json::Value>(
            table,
            &Query::new().eq("id", id),
            &json!({ column: next }),
        )
        .await?;
    Ok(next)
}

/// Attach authors, like state and comment threads to post rows.
async fn assemble_feed(client: &ClientInner, rows: Vec<PostRow>) -> Result<Vec<FeedPost>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let viewer = client.auth.as_ref().map(|a| &a.user_id);
    let post_ids: Vec<&PostId> = rows.iter().map(|r| &r.post.id).collect();

    let comments_query = Query::new()
        .select(COMMENT_SELECT)
        .in_list("post_id", post_ids.iter())
        .order("created_at", Order::Asc);

    let (comments, liked_posts, liked_comments) = tokio::try_join!(
        client.select_rows::<FeedComment>(COMMENTS, &comments_query),
        liked_post_ids(client, viewer, &post_ids),
        liked_comment_ids(client, viewer),
    )?;

    let comments = comments.into_iter().map(|mut c| {
        c.liked = liked_comments.contains(&c.comment.id);
        c
    });
    let mut threads = build_comment_threads(comments);

    Ok(rows
        .into_iter()
        .map(|row| FeedPost {
            liked: liked_posts.contains(&row.post.id),
            comments: threads.take(&row.post.id),
            author: row.author,
            post: row.post,
        })
        .collect())
}

async fn liked_post_ids(
    client: &ClientInner,
    viewer: Option<&UserId>,
    post_ids: &[&PostId],
) -> Result<HashSet<PostId>> {
    let Some(viewer) = viewer else {
        return Ok(HashSet::new());
    };
    let query = Query::new()
        .select("post_id")
        .eq("user_id", viewer)
        .in_list("post_id", post_ids.iter());
    let rows: Vec<PostIdRow> = client.select_rows(POST_LIKES, &query).await?;
    Ok(rows.into_iter().map(|r| r.post_id).collect())
}

async fn liked_comment_ids(
    client: &ClientInner,
    viewer: Option<&UserId>,
) -> Result<HashSet<CommentId>> {
    let Some(viewer) = viewer else {
        return Ok(HashSet::new());
    };
    let query = Query::new().select("comment_id").eq("user_id", viewer);
    let rows: Vec<CommentIdRow> = client.select_rows(COMMENT_LIKES, &query).await?;
    Ok(rows.into_iter().map(|r| r.comment_id).collect())
}

/// Builder for feed requests.
pub struct FeedBuilder {
    client: Arc<ClientInner>,
    limit: Option<u32>,
    author: Option<UserId>,
}

impl FeedBuilder {
    /// Limit the number of posts.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Only posts by this author.
    pub fn author(mut self, author: impl Into<UserId>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Execute the request. Posts come newest first.
    pub async fn send(self) -> Result<Vec<FeedPost>> {
        let mut query = Query::new()
            .select(POST_SELECT)
            .order("created_at", Order::Desc);
        if let Some(ref author) = self.author {
            query = query.eq("author_id", author);
        }
        if let Some(limit) = self.limit {
            query = query.limit(limit);
        }

        let rows: Vec<PostRow> = self.client.select_rows(POSTS, &query).await?;
        log::debug!("fetched {} posts", rows.len());
        assemble_feed(&self.client, rows).await
    }
}

#[derive(Debug, Serialize)]
struct NewPost<'a> {
    author_id: &'a UserId,
    content: &'a str,
    tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    media_urls: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    media_types: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    link_preview: Option<LinkPreview>,
}

/// Builder for new posts.
pub struct CreatePostBuilder {
    client: Arc<ClientInner>,
    content: String,
    media: Vec<(String, String)>,
    link: Option<String>,
}

impl CreatePostBuilder {
    /// Set the text content. Hashtags in it become the post's tags.
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Attach an uploaded media file by public URL and MIME type.
    pub fn media(mut self, url: impl Into<String>, mime: impl Into<String>) -> Self {
        self.media.push((url.into(), mime.into()));
        self
    }

    /// Attach a link.
    pub fn link(mut self, url: impl Into<String>) -> Self {
        self.link = Some(url.into());
        self
    }

    fn validate(&self) -> Result<()> {
        let chars = self.content.chars().count();
        if chars > MAX_POST_CHARS {
            return Err(Error::InvalidArgument(format!(
                "Post is {chars} characters, the limit is {MAX_POST_CHARS}"
            )));
        }

        let link = self.link.as_deref().map(str::trim).filter(|l| !l.is_empty());
        if self.content.trim().is_empty() && self.media.is_empty() && link.is_none() {
            return Err(Error::InvalidArgument(
                "Post needs content, media or a link".into(),
            ));
        }
        if let Some(link) = link {
            url::Url::parse(link)
                .map_err(|e| Error::InvalidArgument(format!("Invalid link {link}: {e}")))?;
        }

        for (url, mime) in &self.media {
            if url.trim().is_empty() {
                return Err(Error::InvalidArgument("Media URL must not be empty".into()));
            }
            if MediaKind::from_mime(mime).is_none() {
                return Err(Error::InvalidArgument(format!(
                    "Unsupported media type {mime}"
                )));
            }
        }
        Ok(())
    }

    /// Publish the post.
    pub async fn send(self) -> Result<Post> {
        self.validate()?;
        let viewer = self.client.viewer()?;
        let content = self.content.trim();

        let (media_urls, media_types) = if self.media.is_empty() {
            (None, None)
        } else {
            let (urls, types): (Vec<String>, Vec<String>) = self
                .media
                .iter()
                .map(|(u, m)| (u.trim().to_owned(), m.trim().to_lowercase()))
                .unzip();
            (Some(urls), Some(types))
        };

        let link_preview = self
            .link
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(LinkPreview::placeholder);

        let body = NewPost {
            author_id: viewer,
            content,
            tags: extract_hashtags(content),
            media_urls,
            media_types,
            link_preview,
        };
        self.client.insert_row(POSTS, &body).await
    }
}

#[derive(Serialize)]
struct NewComment<'a> {
    post_id: &'a PostId,
    author_id: &'a UserId,
    content: &'a str,
    parent_comment_id: Option<&'a CommentId>,
}

/// Builder for comments and replies.
pub struct CommentBuilder {
    client: Arc<ClientInner>,
    post_id: PostId,
    parent: Option<CommentId>,
    content: String,
}

impl CommentBuilder {
    /// Set the comment text.
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Reply to a top-level comment of the same post.
    pub fn reply_to(mut self, parent: impl Into<CommentId>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Publish the comment.
    pub async fn send(self) -> Result<Comment> {
        let content = self.content.trim();
        if content.is_empty() {
            return Err(Error::InvalidArgument("Comment must not be empty".into()));
        }
        let viewer = self.client.viewer()?;

        if let Some(ref parent_id) = self.parent {
            let parent: Comment = self
                .client
                .select_one(COMMENTS, Query::new().eq("id", parent_id))
                .await?
                .ok_or_else(|| Error::api("404", format!("Comment {parent_id} not found")))?;
            check_reply_target(&parent, &self.post_id)?;
        }

        let comment: Comment = self
            .client
            .insert_row(
                COMMENTS,
                &NewComment {
                    post_id: &self.post_id,
                    author_id: viewer,
                    content,
                    parent_comment_id: self.parent.as_ref(),
                },
            )
            .await?;

        bump_counter(&self.client, POSTS, self.post_id.as_str(), "comments_count", 1).await?;
        Ok(comment)
    }
}

/// Replies nest one level: only top-level comments of the same post accept them.
fn check_reply_target(parent: &Comment, post_id: &PostId) -> Result<()> {
    if &parent.post_id != post_id {
        return Err(Error::InvalidArgument(format!(
            "Comment {} belongs to another post",
            parent.id
        )));
    }
    if !parent.is_top_level() {
        return Err(Error::InvalidArgument(
            "Replies can only be made to top-level comments".into(),
        ));
    }
    Ok(())
}

/// Builder for shares.
pub struct ShareBuilder {
    client: Arc<ClientInner>,
    post_id: PostId,
    kind: ShareType,
    platform: Option<String>,
}

impl ShareBuilder {
    /// External platform the post was shared to.
    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    /// Record the share.
    pub async fn send(self) -> Result<ShareResult> {
        let viewer = self.client.viewer()?;
        self.client
            .insert_minimal(
                SHARES,
                &json!({
                    "post_id": self.post_id,
                    "user_id": viewer,
                    "share_type": self.kind,
                    "platform": self.platform,
                }),
            )
            .await?;

        let shares_count =
            bump_counter(&self.client, POSTS, self.post_id.as_str(), "shares_count", 1).await?;
        Ok(ShareResult { shares_count })
    }
}

/// Result of toggling a like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeResult {
    /// Whether the item is now liked by the viewer.
    pub liked: bool,
    /// Like count after the toggle.
    pub likes_count: i32,
}

/// Result of a share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShareResult {
    pub shares_count: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{parse_rows, YouniverseClient};
    use pretty_assertions::assert_eq;

    fn client() -> YouniverseClient {
        YouniverseClient::builder()
            .project_url("http://127.0.0.1:9")
            .auth("token", "me")
            .build()
            .unwrap()
    }

    fn comment(id: &str, post: &str, parent: Option<&str>) -> Comment {
        Comment {
            id: id.into(),
            post_id: post.into(),
            author_id: "u1".into(),
            content: "nice".into(),
            parent_comment_id: parent.map(CommentId::new),
            ..Default::default()
        }
    }

    #[test]
    fn test_post_row_with_author() {
        let rows = serde_json::json!([{
            "id": "p1", "author_id": "u1", "content": "Visa slot booked! #f1visa",
            "tags": ["f1visa"], "likes_count": 3, "comments_count": 1, "shares_count": 0,
            "media_urls": null, "media_types": null, "link_preview": null,
            "created_at": "2024-05-01T08:30:00+00:00",
            "updated_at": "2024-05-01T08:30:00+00:00",
            "author": {
                "id": "u1", "email": "", "name": "Meera Pillai",
                "role": "student_in_india", "country": "India",
                "created_at": "2024-01-01T00:00:00+00:00",
                "updated_at": "2024-01-01T00:00:00+00:00"
            }
        }]);
        let rows: Vec<PostRow> = parse_rows(rows).unwrap();
        assert_eq!(rows[0].post.tags().to_vec(), vec!["f1visa".to_owned()]);
        assert_eq!(rows[0].author.as_ref().map(|a| a.initials()), Some("MP".to_owned()));
    }

    #[test]
    fn test_reply_target_rules() {
        let top = comment("c1", "p1", None);
        let reply = comment("c2", "p1", Some("c1"));

        assert!(check_reply_target(&top, &"p1".into()).is_ok());
        assert!(check_reply_target(&top, &"p2".into()).is_err());
        assert!(check_reply_target(&reply, &"p1".into()).is_err());
    }

    #[tokio::test]
    async fn test_create_validation() {
        let posts = client().posts();

        let err = posts.create().content("   ").send().await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(ref m) if m.contains("content, media or a link")));

        let long = "a".repeat(MAX_POST_CHARS + 1);
        let err = client().posts().create().content(long).send().await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(ref m) if m.contains("2000")));

        let err = client()
            .posts()
            .create()
            .media("https://cdn.example.com/a.webp", "image/webp")
            .send()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(ref m) if m.contains("image/webp")));

        let err = client()
            .posts()
            .create()
            .link("not a url")
            .send()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(ref m) if m.contains("Invalid link")));
    }

    #[test]
    fn test_exactly_max_chars_is_valid() {
        let builder = client()
            .posts()
            .create()
            .content("é".repeat(MAX_POST_CHARS));
        assert!(builder.validate().is_ok());
    }

    #[tokio::test]
    async fn test_media_only_post_passes_validation() {
        let builder = client()
            .posts()
            .create()
            .media("https://cdn.example.com/v.mov", "video/quicktime");
        assert!(builder.validate().is_ok());
    }

    #[tokio::test]
    async fn test_comment_rejects_blank() {
        let err = client()
            .posts()
            .comment("p1")
            .content("\n")
            .send()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_writes_require_auth() {
        let anon = YouniverseClient::builder()
            .project_url("http://127.0.0.1:9")
            .build()
            .unwrap();
        assert!(anon.posts().toggle_like("p1").await.unwrap_err().is_auth_error());
        assert!(anon
            .posts()
            .share("p1", ShareType::Link)
            .send()
            .await
            .unwrap_err()
            .is_auth_error());
    }
}
