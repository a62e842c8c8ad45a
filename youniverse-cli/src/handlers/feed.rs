//! Feed handlers.

use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use rust_i18n::t;
use serde::Serialize;
use youniverse::{
    views::CommentThread, FeedComment, FeedPost, LikeResult, MediaKind, ShareResult, ShareType,
    YouniverseClient,
};

use crate::output::{format_relative_time, truncate, PlainPrint, TableRow};

/// Comment info, with replies for top-level comments.
#[derive(Debug, Clone, Serialize)]
pub struct CommentInfo {
    pub id: String,
    pub author: String,
    pub author_id: String,
    pub content: String,
    pub likes: i32,
    pub liked: bool,
    pub time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<CommentInfo>,
}

impl From<&FeedComment> for CommentInfo {
    fn from(c: &FeedComment) -> Self {
        Self {
            id: c.comment.id.to_string(),
            author: c
                .author
                .as_ref()
                .map(|a| a.name.clone())
                .unwrap_or_else(|| c.comment.author_id.to_string()),
            author_id: c.comment.author_id.to_string(),
            content: c.comment.content.clone(),
            likes: c.comment.likes_count,
            liked: c.liked,
            time: c.comment.created_at,
            replies: Vec::new(),
        }
    }
}

impl From<&CommentThread<FeedComment>> for CommentInfo {
    fn from(thread: &CommentThread<FeedComment>) -> Self {
        Self {
            replies: thread.replies.iter().map(CommentInfo::from).collect(),
            ..CommentInfo::from(&thread.comment)
        }
    }
}

impl CommentInfo {
    fn print_indented(&self, indent: usize) {
        let pad = " ".repeat(indent);
        let heart = if self.liked { "♥".red().to_string() } else { "♡".dimmed().to_string() };
        println!(
            "{}{} {} {} {} {}",
            pad,
            self.author.green(),
            format!("[{}]", self.id).dimmed(),
            format_relative_time(self.time).dimmed(),
            heart,
            self.likes
        );
        for line in self.content.lines().filter(|l| !l.trim().is_empty()) {
            println!("{}   {}", pad, line);
        }
        for reply in &self.replies {
            reply.print_indented(indent + 4);
        }
    }
}

/// Media attachment info.
#[derive(Debug, Clone, Serialize)]
pub struct MediaInfo {
    pub url: String,
    pub kind: MediaKind,
}

/// Post info.
#[derive(Debug, Clone, Serialize)]
pub struct PostInfo {
    pub id: String,
    pub author: String,
    pub author_id: String,
    pub headline: String,
    pub content: String,
    pub tags: Vec<String>,
    pub media: Vec<MediaInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub likes: i32,
    pub comments_count: i32,
    pub shares: i32,
    pub liked: bool,
    pub time: DateTime<Utc>,
    pub comments: Vec<CommentInfo>,
}

impl From<&FeedPost> for PostInfo {
    fn from(p: &FeedPost) -> Self {
        Self {
            id: p.post.id.to_string(),
            author: p
                .author
                .as_ref()
                .map(|a| a.name.clone())
                .unwrap_or_else(|| p.post.author_id.to_string()),
            author_id: p.post.author_id.to_string(),
            headline: p.author.as_ref().map(|a| a.headline()).unwrap_or_default(),
            content: p.post.content.clone(),
            tags: p.post.tags().to_vec(),
            media: p
                .post
                .media()
                .into_iter()
                .map(|(url, kind)| MediaInfo {
                    url: url.to_string(),
                    kind,
                })
                .collect(),
            link: p.post.link_preview.as_ref().map(|l| l.url.clone()),
            likes: p.post.likes_count,
            comments_count: p.post.comments_count,
            shares: p.post.shares_count,
            liked: p.liked,
            time: p.post.created_at,
            comments: p.comments.iter().map(CommentInfo::from).collect(),
        }
    }
}

impl TableRow for PostInfo {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Author", "Content", "Likes", "Comments", "Time"]
    }
    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.author.clone(),
            truncate(&self.content, 50),
            format!("{}{}", self.likes, if self.liked { " ♥" } else { "" }),
            self.comments_count.to_string(),
            format_relative_time(self.time),
        ]
    }
}

impl PlainPrint for PostInfo {
    fn plain_print(&self) {
        println!(
            "{} {} {}",
            self.author.green().bold(),
            format!("[{}]", self.id).cyan(),
            format_relative_time(self.time).dimmed()
        );
        if !self.headline.is_empty() {
            println!("   {}", self.headline.dimmed());
        }
        for line in self.content.lines().filter(|l| !l.trim().is_empty()) {
            println!("   {}", line);
        }
        for media in &self.media {
            println!("   {} {}", format!("[{:?}]", media.kind).magenta(), media.url);
        }
        if let Some(link) = &self.link {
            println!("   {} {}", "[Link]".magenta(), link.underline());
        }
        if !self.tags.is_empty() {
            let tags: Vec<String> = self.tags.iter().map(|t| format!("#{t}")).collect();
            println!("   {}", tags.join(" ").blue());
        }
        println!(
            "   {}",
            t!(
                "post_stats",
                likes = self.likes,
                comments = self.comments_count,
                shares = self.shares
            )
            .dimmed()
        );
        println!();
    }
}

/// Full post view with comment threads.
pub fn print_post_detail(post: &PostInfo) {
    post.plain_print();
    if post.comments.is_empty() {
        println!("   {}", t!("no_comments").dimmed());
        return;
    }
    for comment in &post.comments {
        comment.print_indented(3);
    }
}

/// Options for creating a post.
#[derive(Debug, Clone, Default)]
pub struct NewPostOptions {
    pub content: String,
    /// `(url, mime)` pairs of uploaded media.
    pub media: Vec<(String, String)>,
    pub link: Option<String>,
}

/// Created post result.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedPost {
    pub id: String,
    pub tags: Vec<String>,
}

/// Created comment result.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedComment {
    pub id: String,
    pub post_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// Fetch the feed.
pub async fn list_feed(
    client: &YouniverseClient,
    limit: u32,
    author: Option<&str>,
) -> Result<Vec<PostInfo>> {
    let mut request = client.posts().feed().limit(limit);
    if let Some(author) = author {
        request = request.author(author);
    }
    let posts = request.send().await?;
    Ok(posts.iter().map(PostInfo::from).collect())
}

/// Fetch one post with its comment threads.
pub async fn show_post(client: &YouniverseClient, post_id: &str) -> Result<PostInfo> {
    let post = client.posts().get(post_id).await?;
    Ok(PostInfo::from(&post))
}

/// Publish a post.
pub async fn create_post(client: &YouniverseClient, options: NewPostOptions) -> Result<CreatedPost> {
    let mut builder = client.posts().create().content(options.content);
    for (url, mime) in options.media {
        builder = builder.media(url, mime);
    }
    if let Some(link) = options.link {
        builder = builder.link(link);
    }
    let post = builder.send().await?;
    Ok(CreatedPost {
        id: post.id.to_string(),
        tags: post.tags().to_vec(),
    })
}

/// Toggle the like on a post.
pub async fn like_post(client: &YouniverseClient, post_id: &str) -> Result<LikeResult> {
    Ok(client.posts().toggle_like(post_id).await?)
}

/// Comment on a post, or reply to one of its top-level comments.
pub async fn add_comment(
    client: &YouniverseClient,
    post_id: &str,
    parent_id: Option<&str>,
    content: &str,
) -> Result<CreatedComment> {
    let mut builder = client.posts().comment(post_id).content(content);
    if let Some(parent) = parent_id {
        builder = builder.reply_to(parent);
    }
    let comment = builder.send().await?;
    Ok(CreatedComment {
        id: comment.id.to_string(),
        post_id: comment.post_id.to_string(),
        parent_id: comment.parent_comment_id.map(|p| p.to_string()),
    })
}

/// Toggle the like on a comment.
pub async fn like_comment(client: &YouniverseClient, comment_id: &str) -> Result<LikeResult> {
    Ok(client.posts().toggle_comment_like(comment_id).await?)
}

/// Record a share.
pub async fn share_post(
    client: &YouniverseClient,
    post_id: &str,
    kind: ShareType,
    platform: Option<String>,
) -> Result<ShareResult> {
    let mut builder = client.posts().share(post_id, kind);
    if let Some(platform) = platform {
        builder = builder.platform(platform);
    }
    Ok(builder.send().await?)
}

/// Delete one of the signed-in user's comments.
pub async fn delete_comment(client: &YouniverseClient, comment_id: &str) -> Result<()> {
    client.posts().delete_comment(comment_id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use youniverse::{build_comment_threads, Comment, Profile};

    fn feed_comment(id: &str, parent: Option<&str>, author: Option<&str>) -> FeedComment {
        FeedComment {
            comment: Comment {
                id: id.into(),
                post_id: "p1".into(),
                author_id: "u1".into(),
                content: format!("comment {id}"),
                parent_comment_id: parent.map(Into::into),
                ..Default::default()
            },
            author: author.map(|name| Profile {
                name: name.into(),
                ..Default::default()
            }),
            liked: false,
        }
    }

    #[test]
    fn test_comment_info_keeps_thread_shape() {
        let threads = build_comment_threads(vec![
            feed_comment("c1", None, Some("Ananya")),
            feed_comment("c2", Some("c1"), None),
            feed_comment("c3", None, None),
        ]);
        let infos: Vec<CommentInfo> = threads
            .threads_for(&"p1".into())
            .iter()
            .map(CommentInfo::from)
            .collect();

        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].author, "Ananya");
        assert_eq!(infos[0].replies.len(), 1);
        assert_eq!(infos[0].replies[0].id, "c2");
        // Missing author falls back to the ID.
        assert_eq!(infos[0].replies[0].author, "u1");
        assert!(infos[1].replies.is_empty());
    }
}
