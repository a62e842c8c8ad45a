//! Shared handlers for CLI and MCP.

pub mod connection;
pub mod feed;
pub mod message;
pub mod notification;
pub mod student;
