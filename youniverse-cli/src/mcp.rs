//! MCP Server implementation for Youniverse.

use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::*,
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use youniverse::{ShareType, YouniverseClient};

use crate::config;
use crate::handlers::{connection, feed, message, notification, student};

/// MCP Server for the Youniverse student network.
#[derive(Clone)]
pub struct YouniverseMcpServer {
    tool_router: ToolRouter<Self>,
}

impl YouniverseMcpServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }

    fn build_client() -> Result<YouniverseClient, McpError> {
        config::build_client().map_err(Self::internal)
    }

    fn build_authed_client() -> Result<YouniverseClient, McpError> {
        config::build_authed_client().map_err(Self::internal)
    }

    fn internal(e: impl std::fmt::Display) -> McpError {
        McpError::internal_error(e.to_string(), None)
    }

    fn to_json<T: Serialize>(value: &T) -> Result<String, McpError> {
        serde_json::to_string_pretty(value).map_err(Self::internal)
    }

    fn ok(text: String) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

// Parameter structs
#[derive(Debug, Deserialize, JsonSchema)]
pub struct StudentSearchParams {
    /// Free text matched against name, university, course and bio
    #[serde(default)]
    pub query: Option<String>,
    /// Location: all, india or abroad
    #[serde(default)]
    pub location: Option<String>,
    /// Exact country
    #[serde(default)]
    pub country: Option<String>,
    /// Exact course
    #[serde(default)]
    pub course: Option<String>,
    /// Page number (all matches when omitted)
    #[serde(default)]
    pub page: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UserIdsParam {
    /// User IDs
    pub user_ids: Vec<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UserIdParam {
    /// User ID
    pub user_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct IdParam {
    /// Record ID
    pub id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SendMessageParams {
    /// Recipient user ID
    pub to: String,
    /// Message content
    pub content: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FeedParams {
    /// Maximum number of posts (default: 20)
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Only posts by this user ID
    #[serde(default)]
    pub author: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreatePostParams {
    /// Post text; #hashtags become tags
    #[serde(default)]
    pub content: String,
    /// Link to attach
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CommentParams {
    /// Post ID
    pub post_id: String,
    /// Top-level comment to reply to
    #[serde(default)]
    pub reply_to: Option<String>,
    /// Comment text
    pub content: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ShareParams {
    /// Post ID
    pub post_id: String,
    /// internal, external or link (default: link)
    #[serde(default = "default_share_type")]
    pub share_type: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct NotificationListParams {
    /// Page number (default: 1)
    #[serde(default = "default_page")]
    pub page: u32,
    /// Only unread notifications
    #[serde(default)]
    pub unread_only: bool,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

fn default_share_type() -> String {
    "link".to_string()
}

#[tool_router]
impl YouniverseMcpServer {
    #[tool(description = "Search students by location, country, course or free text")]
    async fn student_search(
        &self,
        params: Parameters<StudentSearchParams>,
    ) -> Result<CallToolResult, McpError> {
        let client = Self::build_client()?;
        let p = params.0;
        let options = student::SearchOptions {
            location: p.location,
            country: p.country,
            course: p.course,
            search: p.query,
            page: p.page,
        };
        let result = student::search_students(&client, options)
            .await
            .map_err(Self::internal)?;
        Self::ok(Self::to_json(&result)?)
    }

    #[tool(description = "Get student profiles by user ID")]
    async fn student_get(&self, params: Parameters<UserIdsParam>) -> Result<CallToolResult, McpError> {
        let client = Self::build_client()?;
        let students = student::get_students(&client, &params.0.user_ids, 4)
            .await
            .map_err(Self::internal)?;
        Self::ok(Self::to_json(&students)?)
    }

    #[tool(description = "List accepted connections (requires authentication)")]
    async fn connection_list(&self) -> Result<CallToolResult, McpError> {
        let client = Self::build_authed_client()?;
        let result = connection::list_connections(&client)
            .await
            .map_err(Self::internal)?;
        Self::ok(Self::to_json(&result)?)
    }

    #[tool(description = "List pending connection requests sent to you (requires authentication)")]
    async fn connection_pending(&self) -> Result<CallToolResult, McpError> {
        let client = Self::build_authed_client()?;
        let result = connection::pending_requests(&client)
            .await
            .map_err(Self::internal)?;
        Self::ok(Self::to_json(&result)?)
    }

    #[tool(description = "Send a connection request to a student (requires authentication)")]
    async fn connection_request(
        &self,
        params: Parameters<UserIdParam>,
    ) -> Result<CallToolResult, McpError> {
        let client = Self::build_authed_client()?;
        let result = connection::send_request(&client, &params.0.user_id)
            .await
            .map_err(Self::internal)?;
        Self::ok(Self::to_json(&result)?)
    }

    #[tool(description = "Accept a pending connection request by connection ID (requires authentication)")]
    async fn connection_accept(&self, params: Parameters<IdParam>) -> Result<CallToolResult, McpError> {
        let client = Self::build_authed_client()?;
        let result = connection::accept_request(&client, &params.0.id)
            .await
            .map_err(Self::internal)?;
        Self::ok(Self::to_json(&result)?)
    }

    #[tool(description = "List conversations with last message and unread count (requires authentication)")]
    async fn chat_list(&self) -> Result<CallToolResult, McpError> {
        let client = Self::build_authed_client()?;
        let result = message::list_chats(&client).await.map_err(Self::internal)?;
        Self::ok(Self::to_json(&result)?)
    }

    #[tool(description = "Read the conversation with a user and mark it read (requires authentication)")]
    async fn message_read(&self, params: Parameters<UserIdParam>) -> Result<CallToolResult, McpError> {
        let client = Self::build_authed_client()?;
        let result = message::read_conversation(&client, &params.0.user_id, true)
            .await
            .map_err(Self::internal)?;
        Self::ok(Self::to_json(&result)?)
    }

    #[tool(description = "Send a direct message (requires authentication)")]
    async fn message_send(
        &self,
        params: Parameters<SendMessageParams>,
    ) -> Result<CallToolResult, McpError> {
        let client = Self::build_authed_client()?;
        let result = message::send_message(&client, &params.0.to, &params.0.content)
            .await
            .map_err(Self::internal)?;
        Self::ok(Self::to_json(&result)?)
    }

    #[tool(description = "List recent posts with comment threads")]
    async fn feed_list(&self, params: Parameters<FeedParams>) -> Result<CallToolResult, McpError> {
        let client = Self::build_client()?;
        let posts = feed::list_feed(&client, params.0.limit, params.0.author.as_deref())
            .await
            .map_err(Self::internal)?;
        Self::ok(Self::to_json(&posts)?)
    }

    #[tool(description = "Show one post with its comment threads")]
    async fn post_show(&self, params: Parameters<IdParam>) -> Result<CallToolResult, McpError> {
        let client = Self::build_client()?;
        let post = feed::show_post(&client, &params.0.id)
            .await
            .map_err(Self::internal)?;
        Self::ok(Self::to_json(&post)?)
    }

    #[tool(description = "Publish a text post, optionally with a link (requires authentication)")]
    async fn post_create(
        &self,
        params: Parameters<CreatePostParams>,
    ) -> Result<CallToolResult, McpError> {
        let client = Self::build_authed_client()?;
        let options = feed::NewPostOptions {
            content: params.0.content,
            media: Vec::new(),
            link: params.0.link,
        };
        let created = feed::create_post(&client, options)
            .await
            .map_err(Self::internal)?;
        Self::ok(Self::to_json(&created)?)
    }

    #[tool(description = "Like or unlike a post (requires authentication)")]
    async fn post_like(&self, params: Parameters<IdParam>) -> Result<CallToolResult, McpError> {
        let client = Self::build_authed_client()?;
        let result = feed::like_post(&client, &params.0.id)
            .await
            .map_err(Self::internal)?;
        Self::ok(Self::to_json(&result)?)
    }

    #[tool(description = "Comment on a post or reply to a top-level comment (requires authentication)")]
    async fn post_comment(&self, params: Parameters<CommentParams>) -> Result<CallToolResult, McpError> {
        let client = Self::build_authed_client()?;
        let p = params.0;
        let created = feed::add_comment(&client, &p.post_id, p.reply_to.as_deref(), &p.content)
            .await
            .map_err(Self::internal)?;
        Self::ok(Self::to_json(&created)?)
    }

    #[tool(description = "Record a share of a post (requires authentication)")]
    async fn post_share(&self, params: Parameters<ShareParams>) -> Result<CallToolResult, McpError> {
        let kind = ShareType::parse(&params.0.share_type).ok_or_else(|| {
            McpError::invalid_params(format!("Unknown share type {}", params.0.share_type), None)
        })?;
        let client = Self::build_authed_client()?;
        let result = feed::share_post(&client, &params.0.post_id, kind, None)
            .await
            .map_err(Self::internal)?;
        Self::ok(Self::to_json(&result)?)
    }

    #[tool(description = "List notifications (requires authentication)")]
    async fn notification_list(
        &self,
        params: Parameters<NotificationListParams>,
    ) -> Result<CallToolResult, McpError> {
        let client = Self::build_authed_client()?;
        let result =
            notification::list_notifications(&client, params.0.page, params.0.unread_only)
                .await
                .map_err(Self::internal)?;
        Self::ok(Self::to_json(&result)?)
    }

    #[tool(description = "Mark all notifications as read (requires authentication)")]
    async fn notification_read_all(&self) -> Result<CallToolResult, McpError> {
        let client = Self::build_authed_client()?;
        let count = notification::mark_all_read(&client)
            .await
            .map_err(Self::internal)?;
        Self::ok(format!("Marked {count} notifications as read"))
    }
}

#[tool_handler]
impl ServerHandler for YouniverseMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: None }),
                ..Default::default()
            },
            server_info: Implementation {
                name: "youniverse-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            ..Default::default()
        }
    }
}

/// Run the MCP Server.
pub async fn run_server() -> anyhow::Result<()> {
    use rmcp::transport::io::stdio;

    tracing::info!("Starting Youniverse MCP server");

    let server = YouniverseMcpServer::new();
    let service = rmcp::serve_server(server, stdio()).await?;

    tracing::info!("Youniverse MCP server ready");
    service.waiting().await?;

    Ok(())
}
