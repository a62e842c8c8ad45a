//! Feed commands.

use anyhow::{bail, Result};
use clap::Subcommand;
use rust_i18n::t;
use youniverse::ShareType;

use crate::config::{build_authed_client, build_client};
use crate::handlers::feed::{self as handlers, NewPostOptions};
use crate::output::{print_structured, print_table, OutputFormat};

#[derive(Subcommand)]
pub enum FeedAction {
    /// List recent posts
    #[command(alias = "ls")]
    List {
        /// Maximum number of posts
        #[arg(short = 'n', long, default_value = "20")]
        limit: u32,
        /// Only posts by this user ID
        #[arg(short, long)]
        author: Option<String>,
    },

    /// Show a post with its comments
    Show {
        /// Post ID
        post_id: String,
    },

    /// Publish a post
    Post {
        /// Post text; #hashtags become tags
        #[arg(default_value = "")]
        content: String,
        /// Uploaded media as URL=MIME, e.g. https://cdn/x.png=image/png
        #[arg(short, long = "media", value_name = "URL=MIME")]
        media: Vec<String>,
        /// Attach a link
        #[arg(short, long)]
        link: Option<String>,
    },

    /// Like or unlike a post
    Like {
        /// Post ID
        post_id: String,
    },

    /// Comment on a post
    Comment {
        /// Post ID
        post_id: String,
        /// Comment text
        content: String,
    },

    /// Reply to a top-level comment
    Reply {
        /// Post ID
        post_id: String,
        /// Comment ID being replied to
        comment_id: String,
        /// Reply text
        content: String,
    },

    /// Like or unlike a comment
    LikeComment {
        /// Comment ID
        comment_id: String,
    },

    /// Record a share of a post
    Share {
        /// Post ID
        post_id: String,
        /// internal, external or link
        #[arg(short, long, default_value = "link")]
        kind: String,
        /// External platform name
        #[arg(short, long)]
        platform: Option<String>,
    },

    /// Delete one of your comments
    DeleteComment {
        /// Comment ID
        comment_id: String,
    },
}

pub async fn handle(action: FeedAction, format: OutputFormat, _verbose: bool) -> Result<()> {
    match action {
        FeedAction::List { limit, author } => {
            let client = build_client()?;
            let posts = handlers::list_feed(&client, limit, author.as_deref()).await?;
            print_table(posts, format);
        }
        FeedAction::Show { post_id } => {
            let client = build_client()?;
            let post = handlers::show_post(&client, &post_id).await?;
            match format {
                OutputFormat::Plain | OutputFormat::Table => handlers::print_post_detail(&post),
                _ => print_structured(&post, format),
            }
        }
        FeedAction::Post {
            content,
            media,
            link,
        } => {
            let options = NewPostOptions {
                content,
                media: media
                    .iter()
                    .map(|m| parse_media(m))
                    .collect::<Result<Vec<_>>>()?,
                link,
            };
            let client = build_authed_client()?;
            let created = handlers::create_post(&client, options).await?;
            output(&created, t!("post_published", id = &created.id).to_string(), format);
        }
        FeedAction::Like { post_id } => {
            let client = build_authed_client()?;
            let result = handlers::like_post(&client, &post_id).await?;
            let message = if result.liked {
                t!("liked", count = result.likes_count)
            } else {
                t!("unliked", count = result.likes_count)
            };
            output(&result, message.to_string(), format);
        }
        FeedAction::Comment { post_id, content } => {
            let client = build_authed_client()?;
            let created = handlers::add_comment(&client, &post_id, None, &content).await?;
            output(&created, t!("comment_posted", id = &created.id).to_string(), format);
        }
        FeedAction::Reply {
            post_id,
            comment_id,
            content,
        } => {
            let client = build_authed_client()?;
            let created =
                handlers::add_comment(&client, &post_id, Some(&comment_id), &content).await?;
            output(&created, t!("reply_posted", id = &created.id).to_string(), format);
        }
        FeedAction::LikeComment { comment_id } => {
            let client = build_authed_client()?;
            let result = handlers::like_comment(&client, &comment_id).await?;
            let message = if result.liked {
                t!("liked", count = result.likes_count)
            } else {
                t!("unliked", count = result.likes_count)
            };
            output(&result, message.to_string(), format);
        }
        FeedAction::Share {
            post_id,
            kind,
            platform,
        } => {
            let Some(kind) = ShareType::parse(&kind) else {
                bail!("{}", t!("invalid_share_type", value = kind));
            };
            let client = build_authed_client()?;
            let result = handlers::share_post(&client, &post_id, kind, platform).await?;
            output(
                &result,
                t!("shared", count = result.shares_count).to_string(),
                format,
            );
        }
        FeedAction::DeleteComment { comment_id } => {
            let client = build_authed_client()?;
            handlers::delete_comment(&client, &comment_id).await?;
            println!("{}", t!("comment_deleted"));
        }
    }
    Ok(())
}

fn output<T: serde::Serialize>(value: &T, message: String, format: OutputFormat) {
    if matches!(format, OutputFormat::Json | OutputFormat::Toon) {
        print_structured(value, format);
    } else {
        println!("{message}");
    }
}

/// Split `URL=MIME` at the last `=`, since URLs may contain `=` themselves.
fn parse_media(raw: &str) -> Result<(String, String)> {
    match raw.rsplit_once('=') {
        Some((url, mime)) if !url.is_empty() && mime.contains('/') => {
            Ok((url.to_string(), mime.to_string()))
        }
        _ => bail!("{}", t!("invalid_media", value = raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_media() {
        assert_eq!(
            parse_media("https://cdn.example.com/a.png?v=2=image/png").unwrap(),
            (
                "https://cdn.example.com/a.png?v=2".to_string(),
                "image/png".to_string()
            )
        );
        assert!(parse_media("https://cdn.example.com/a.png").is_err());
        assert!(parse_media("=image/png").is_err());
    }
}
