//! Comment thread reconstruction.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{Comment, CommentId, PostId};

/// A top-level comment with its direct replies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentThread<C = Comment> {
    /// The top-level comment.
    #[serde(flatten)]
    pub comment: C,
    /// Direct replies, in arrival order.
    pub replies: Vec<C>,
}

impl<C> CommentThread<C> {
    fn new(comment: C) -> Self {
        Self {
            comment,
            replies: Vec::new(),
        }
    }

    /// Number of comments in this thread, including the top-level one.
    pub fn len(&self) -> usize {
        1 + self.replies.len()
    }

    /// Always false; a thread holds at least its top-level comment.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Comment threads grouped by post.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentThreads<C = Comment> {
    by_post: HashMap<PostId, Vec<CommentThread<C>>>,
}

impl<C> Default for CommentThreads<C> {
    fn default() -> Self {
        Self {
            by_post: HashMap::new(),
        }
    }
}

impl<C> CommentThreads<C> {
    /// Threads of a post, or an empty slice if it has no comments.
    pub fn threads_for(&self, post_id: &PostId) -> &[CommentThread<C>] {
        self.by_post.get(post_id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Take the threads of a post out of the map.
    pub fn take(&mut self, post_id: &PostId) -> Vec<CommentThread<C>> {
        self.by_post.remove(post_id).unwrap_or_default()
    }

    /// Number of posts with at least one top-level comment.
    pub fn post_count(&self) -> usize {
        self.by_post.len()
    }

    /// Iterate over posts and their threads, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&PostId, &[CommentThread<C>])> {
        self.by_post.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Consume into the underlying map.
    pub fn into_map(self) -> HashMap<PostId, Vec<CommentThread<C>>> {
        self.by_post
    }
}

/// Group a flat comment list into per-post threads, one level deep.
///
/// `comments` are expected in ascending creation order; that order is kept
/// for both top-level comments and replies. A reply is attached only when its
/// parent is a top-level comment of the same post; replies to replies and
/// replies whose parent is missing are dropped.
pub fn build_comment_threads<C>(comments: impl IntoIterator<Item = C>) -> CommentThreads<C>
where
    C: AsRef<Comment>,
{
    let mut by_post: HashMap<PostId, Vec<CommentThread<C>>> = HashMap::new();
    // (post, comment) -> index into that post's thread list
    let mut top_level: HashMap<(PostId, CommentId), usize> = HashMap::new();
    let mut replies: Vec<C> = Vec::new();

    for item in comments {
        let comment = item.as_ref();
        if comment.parent_comment_id.is_some() {
            replies.push(item);
            continue;
        }

        let post_id = comment.post_id.clone();
        let key = (post_id.clone(), comment.id.clone());
        let threads = by_post.entry(post_id).or_default();
        top_level.insert(key, threads.len());
        threads.push(CommentThread::new(item));
    }

    for reply in replies {
        let comment = reply.as_ref();
        let Some(parent_id) = comment.parent_comment_id.clone() else {
            continue;
        };
        let key = (comment.post_id.clone(), parent_id);

        match top_level.get(&key) {
            Some(&slot) => {
                if let Some(threads) = by_post.get_mut(&key.0) {
                    threads[slot].replies.push(reply);
                }
            }
            None => {
                log::debug!(
                    "dropping comment {} on post {}: parent {} is not a top-level comment of that post",
                    comment.id,
                    key.0,
                    key.1
                );
            }
        }
    }

    CommentThreads { by_post }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn comment(id: &str, post: &str, parent: Option<&str>) -> Comment {
        Comment {
            id: id.into(),
            post_id: post.into(),
            author_id: "u".into(),
            content: format!("comment {id}"),
            parent_comment_id: parent.map(CommentId::from),
            ..Default::default()
        }
    }

    fn shape(threads: &[CommentThread]) -> Vec<(String, Vec<String>)> {
        threads
            .iter()
            .map(|t| {
                (
                    t.comment.id.to_string(),
                    t.replies.iter().map(|r| r.id.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_single_post_with_orphan() {
        let comments = vec![
            comment("1", "p", None),
            comment("2", "p", None),
            comment("3", "p", Some("1")),
            comment("4", "p", Some("99")),
        ];

        let threads = build_comment_threads(comments);

        assert_eq!(
            shape(threads.threads_for(&"p".into())),
            vec![
                ("1".to_string(), vec!["3".to_string()]),
                ("2".to_string(), vec![]),
            ]
        );
    }

    #[test]
    fn test_reply_to_reply_is_dropped() {
        let comments = vec![
            comment("1", "p", None),
            comment("2", "p", Some("1")),
            comment("3", "p", Some("2")),
        ];

        let threads = build_comment_threads(comments);
        let p = threads.threads_for(&"p".into());

        assert_eq!(shape(p), vec![("1".to_string(), vec!["2".to_string()])]);
        assert!(p.iter().all(|t| t.replies.iter().all(|r| r.id.as_str() != "3")));
    }

    #[test]
    fn test_multiple_posts_partitioned() {
        let comments = vec![
            comment("a1", "a", None),
            comment("b1", "b", None),
            comment("a2", "a", Some("a1")),
            comment("b2", "b", Some("b1")),
            comment("a3", "a", None),
            comment("b3", "b", Some("b1")),
        ];

        let threads = build_comment_threads(comments);

        assert_eq!(threads.post_count(), 2);
        assert_eq!(
            shape(threads.threads_for(&"a".into())),
            vec![
                ("a1".to_string(), vec!["a2".to_string()]),
                ("a3".to_string(), vec![]),
            ]
        );
        assert_eq!(
            shape(threads.threads_for(&"b".into())),
            vec![("b1".to_string(), vec!["b2".to_string(), "b3".to_string()])]
        );
    }

    #[test]
    fn test_parent_on_other_post_is_orphan() {
        let comments = vec![
            comment("a1", "a", None),
            comment("b1", "b", None),
            comment("x", "b", Some("a1")),
        ];

        let threads = build_comment_threads(comments);
        assert_eq!(
            shape(threads.threads_for(&"b".into())),
            vec![("b1".to_string(), vec![])]
        );
        assert_eq!(
            shape(threads.threads_for(&"a".into())),
            vec![("a1".to_string(), vec![])]
        );
    }

    #[test]
    fn test_reply_arriving_before_parent_still_attaches() {
        let comments = vec![comment("2", "p", Some("1")), comment("1", "p", None)];
        let threads = build_comment_threads(comments);
        assert_eq!(
            shape(threads.threads_for(&"p".into())),
            vec![("1".to_string(), vec!["2".to_string()])]
        );
    }

    #[test]
    fn test_post_without_comments() {
        let threads = build_comment_threads(Vec::<Comment>::new());
        assert!(threads.threads_for(&"p".into()).is_empty());
        assert_eq!(threads.post_count(), 0);

        // Only orphans: the post never appears.
        let threads = build_comment_threads(vec![comment("2", "p", Some("1"))]);
        assert!(threads.threads_for(&"p".into()).is_empty());
    }

    #[test]
    fn test_idempotent() {
        let comments = vec![
            comment("1", "p", None),
            comment("2", "p", Some("1")),
            comment("3", "q", None),
            comment("4", "q", Some("7")),
        ];
        assert_eq!(
            build_comment_threads(comments.clone()),
            build_comment_threads(comments)
        );
    }

    #[test]
    fn test_borrowed_input() {
        let comments = vec![comment("1", "p", None), comment("2", "p", Some("1"))];
        let threads = build_comment_threads(comments.iter());
        let p = threads.threads_for(&"p".into());
        assert_eq!(p[0].len(), 2);
        assert_eq!(p[0].replies[0].id.as_str(), "2");
    }
}
