//! HTTP client and configuration.

mod auth;
mod http;
mod query;

pub use auth::AuthInfo;
pub use http::{HttpConfig, Prefer, DEFAULT_USER_AGENT, REST_PATH};
pub use query::{Order, Query};

use crate::api::{ConnectionApi, MessageApi, NotificationApi, PostApi, ProfileApi};
use crate::cache::CacheStorage;
use crate::error::{Error, Result};
use crate::models::UserId;
use http::{build_client, HttpExecutor};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Builder for creating YouniverseClient.
pub struct YouniverseClientBuilder {
    auth: Option<AuthInfo>,
    http_config: HttpConfig,
    cache: Option<Arc<dyn CacheStorage>>,
}

impl std::fmt::Debug for YouniverseClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YouniverseClientBuilder")
            .field("auth", &self.auth.as_ref().map(|a| &a.user_id))
            .field("http_config", &self.http_config)
            .field("cache", &self.cache.as_ref().map(|_| "..."))
            .finish()
    }
}

impl Default for YouniverseClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl YouniverseClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            auth: None,
            http_config: HttpConfig::default(),
            cache: None,
        }
    }

    /// Set the project URL.
    pub fn project_url(mut self, url: impl Into<String>) -> Self {
        self.http_config.base_url = url.into();
        self
    }

    /// Set the public API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.http_config.api_key = key.into();
        self
    }

    /// Set authentication.
    pub fn auth(mut self, access_token: impl Into<String>, user_id: impl Into<UserId>) -> Self {
        self.auth = Some(AuthInfo::new(access_token, user_id));
        self
    }

    /// Set authentication from AuthInfo.
    pub fn with_auth(mut self, auth: AuthInfo) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Set custom user agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.http_config.custom_user_agent = Some(ua.into());
        self
    }

    /// Set connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.http_config.connect_timeout = timeout;
        self
    }

    /// Set read timeout.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.http_config.read_timeout = timeout;
        self
    }

    /// Set cache storage.
    pub fn cache(mut self, storage: Arc<dyn CacheStorage>) -> Self {
        self.cache = Some(storage);
        self
    }

    /// Build YouniverseClient.
    pub fn build(self) -> Result<YouniverseClient> {
        if let Some(ref auth) = self.auth {
            if !auth.is_valid() {
                return Err(Error::InvalidArgument(
                    "Access token and user ID must not be empty".into(),
                ));
            }
        }

        let http_client = build_client(&self.http_config)?;

        Ok(YouniverseClient {
            inner: Arc::new(ClientInner {
                http: http_client,
                config: self.http_config,
                auth: self.auth,
                cache: self.cache,
            }),
        })
    }
}

/// Internal client state.
pub(crate) struct ClientInner {
    pub http: reqwest::Client,
    pub config: HttpConfig,
    pub auth: Option<AuthInfo>,
    /// Cache storage for profile lookups
    pub cache: Option<Arc<dyn CacheStorage>>,
}

impl ClientInner {
    /// Get auth info or error.
    pub fn require_auth(&self) -> Result<&AuthInfo> {
        self.auth.as_ref().ok_or(Error::AuthRequired)
    }

    /// Signed-in user ID or error.
    pub fn viewer(&self) -> Result<&UserId> {
        self.require_auth().map(|a| &a.user_id)
    }

    /// Bearer token of the signed-in user, if any.
    fn bearer(&self) -> Option<&str> {
        self.auth.as_ref().map(|a| a.access_token.as_str())
    }

    /// Create HTTP executor.
    pub fn executor(&self) -> HttpExecutor<'_> {
        HttpExecutor::new(&self.http, &self.config)
    }

    /// Fetch rows. Works anonymously where row-level policies allow.
    pub async fn select_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
    ) -> Result<Vec<T>> {
        let value = self.executor().select(table, query, self.bearer()).await?;
        parse_rows(value)
    }

    /// Fetch at most one row.
    pub async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        query: Query,
    ) -> Result<Option<T>> {
        let rows = self.select_rows(table, &query.limit(1)).await?;
        Ok(rows.into_iter().next())
    }

    /// Insert one row and return it as stored.
    pub async fn insert_row<B: Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        body: &B,
    ) -> Result<T> {
        let auth = self.require_auth()?;
        let body = serde_json::to_value(body)?;
        let value = self
            .executor()
            .insert(table, &body, Some(&auth.access_token), Prefer::Representation)
            .await?;

        parse_rows(value)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::missing(format!("inserted {table} row")))
    }

    /// Insert one row without reading it back.
    pub async fn insert_minimal<B: Serialize>(&self, table: &str, body: &B) -> Result<()> {
        let auth = self.require_auth()?;
        let body = serde_json::to_value(body)?;
        self.executor()
            .insert(table, &body, Some(&auth.access_token), Prefer::Minimal)
            .await?;
        Ok(())
    }

    /// Update rows matching `query` and return them.
    pub async fn update_rows<B: Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
        body: &B,
    ) -> Result<Vec<T>> {
        let auth = self.require_auth()?;
        if !query.has_filters() {
            return Err(Error::InvalidArgument(format!(
                "Refusing to update every row of {table}"
            )));
        }
        let body = serde_json::to_value(body)?;
        let value = self
            .executor()
            .update(table, query, &body, Some(&auth.access_token), Prefer::Representation)
            .await?;
        parse_rows(value)
    }

    /// Delete rows matching `query`.
    pub async fn delete_rows(&self, table: &str, query: &Query) -> Result<()> {
        let auth = self.require_auth()?;
        if !query.has_filters() {
            return Err(Error::InvalidArgument(format!(
                "Refusing to delete every row of {table}"
            )));
        }
        self.executor()
            .delete(table, query, Some(&auth.access_token))
            .await?;
        Ok(())
    }
}

/// Decode a JSON array of rows. `null` is treated as no rows.
pub(crate) fn parse_rows<T: DeserializeOwned>(value: serde_json::Value) -> Result<Vec<T>> {
    match value {
        serde_json::Value::Null => Ok(Vec::new()),
        serde_json::Value::Array(_) => serde_json::from_value(value).map_err(Error::Json),
        other => Err(Error::parse(format!(
            "Expected an array of rows, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Client for the Youniverse student network.
#[derive(Clone)]
pub struct YouniverseClient {
    pub(crate) inner: Arc<ClientInner>,
}

impl YouniverseClient {
    /// Create a new client builder.
    pub fn builder() -> YouniverseClientBuilder {
        YouniverseClientBuilder::new()
    }

    /// Get the profile API.
    pub fn profiles(&self) -> ProfileApi {
        ProfileApi::new(self.inner.clone())
    }

    /// Get the connection API.
    pub fn connections(&self) -> ConnectionApi {
        ConnectionApi::new(self.inner.clone())
    }

    /// Get the message API.
    pub fn messages(&self) -> MessageApi {
        MessageApi::new(self.inner.clone())
    }

    /// Get the post/feed API.
    pub fn posts(&self) -> PostApi {
        PostApi::new(self.inner.clone())
    }

    /// Get the notification API.
    pub fn notifications(&self) -> NotificationApi {
        NotificationApi::new(self.inner.clone())
    }

    /// Check if the client is authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.inner.auth.is_some()
    }

    /// Get the current authentication info.
    pub fn auth_info(&self) -> Option<&AuthInfo> {
        self.inner.auth.as_ref()
    }

    /// Get the current user ID if authenticated.
    pub fn current_user_id(&self) -> Option<&UserId> {
        self.inner.auth.as_ref().map(|a| &a.user_id)
    }
}

impl std::fmt::Debug for YouniverseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YouniverseClient")
            .field("authenticated", &self.is_authenticated())
            .field("base_url", &self.inner.config.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Message;

    #[test]
    fn test_parse_rows() {
        let rows: Vec<Message> = parse_rows(serde_json::json!([{
            "id": "m1", "sender_id": "a", "receiver_id": "b", "content": "hey",
            "read": true, "created_at": "2024-05-01T08:30:00+00:00"
        }]))
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].read);

        let none: Vec<Message> = parse_rows(serde_json::Value::Null).unwrap();
        assert!(none.is_empty());

        let err = parse_rows::<Message>(serde_json::json!({"id": "m1"})).unwrap_err();
        assert!(matches!(err, Error::Parse(ref m) if m.contains("an object")));
    }

    #[test]
    fn test_builder_rejects_blank_auth() {
        let result = YouniverseClient::builder()
            .project_url("https://abc.supabase.co")
            .auth("", "u1")
            .build();
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_writes_require_auth() {
        let client = YouniverseClient::builder()
            .project_url("https://abc.supabase.co")
            .api_key("anon")
            .build()
            .unwrap();

        let err = client
            .inner
            .delete_rows("posts", &Query::new().eq("id", "p1"))
            .await
            .unwrap_err();
        assert!(err.is_auth_error());
    }

    #[tokio::test]
    async fn test_unfiltered_delete_refused() {
        let client = YouniverseClient::builder()
            .project_url("https://abc.supabase.co")
            .auth("token", "u1")
            .build()
            .unwrap();

        let err = client
            .inner
            .delete_rows("comments", &Query::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
