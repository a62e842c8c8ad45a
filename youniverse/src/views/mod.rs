//! View models derived from fetched rows.
//!
//! Everything here is a pure function of its inputs: no I/O, no shared state.
//! Callers re-run the transforms on every refresh.

mod chats;
mod students;
mod text;
mod threads;

pub use chats::{aggregate_chats, total_unread};
pub use students::{connection_status, StudentConnectionStatus, StudentFacets, StudentFilter};
pub use text::{extract_hashtags, sanitize_search_term};
pub use threads::{build_comment_threads, CommentThread, CommentThreads};
