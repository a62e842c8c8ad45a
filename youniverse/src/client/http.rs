//! HTTP client configuration and request execution.

use crate::error::{ApiErrorBody, Error, Result};
use reqwest::{Client, Method, RequestBuilder, Response};
use std::time::Duration;
use url::Url;

use super::query::Query;

/// Path of the REST endpoint under the project URL.
pub const REST_PATH: &str = "rest/v1/";

/// Default user agent.
pub const DEFAULT_USER_AGENT: &str = concat!("youniverse/", env!("CARGO_PKG_VERSION"));

/// HTTP client configuration.
#[derive(Clone)]
pub struct HttpConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co/`.
    pub base_url: String,
    /// Public (anon) API key sent with every request.
    pub api_key: String,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Read timeout.
    pub read_timeout: Duration,
    /// Custom user agent.
    pub custom_user_agent: Option<String>,
}

impl std::fmt::Debug for HttpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "***" })
            .field("connect_timeout", &self.connect_timeout)
            .field("read_timeout", &self.read_timeout)
            .field("custom_user_agent", &self.custom_user_agent)
            .finish()
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(20),
            custom_user_agent: None,
        }
    }
}

impl HttpConfig {
    /// Get the user agent to send.
    pub fn user_agent(&self) -> &str {
        self.custom_user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    /// Resolve the REST URL of a table.
    pub fn table_url(&self, table: &str) -> Result<Url> {
        if self.base_url.is_empty() {
            return Err(Error::InvalidArgument("Project URL is not configured".into()));
        }

        let mut base = self.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }

        Url::parse(&base)
            .and_then(|b| b.join(REST_PATH))
            .and_then(|b| b.join(table))
            .map_err(Error::Url)
    }
}

/// Build a reqwest client with the given configuration.
pub fn build_client(config: &HttpConfig) -> Result<Client> {
    Client::builder()
        .connect_timeout(config.connect_timeout)
        .read_timeout(config.read_timeout)
        .gzip(true)
        .build()
        .map_err(Error::Network)
}

/// Preferred representation of write results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefer {
    /// Return the written rows.
    Representation,
    /// Return nothing.
    Minimal,
}

impl Prefer {
    fn header(&self) -> &'static str {
        match self {
            Prefer::Representation => "return=representation",
            Prefer::Minimal => "return=minimal",
        }
    }
}

/// HTTP request executor.
pub struct HttpExecutor<'a> {
    client: &'a Client,
    config: &'a HttpConfig,
}

impl<'a> HttpExecutor<'a> {
    /// Create a new executor.
    pub fn new(client: &'a Client, config: &'a HttpConfig) -> Self {
        Self { client, config }
    }

    /// Build a request with common headers.
    ///
    /// Without a user token the API key doubles as the bearer token, which
    /// gives anonymous read access where row-level policies allow it.
    fn build_request(&self, method: Method, url: Url, bearer: Option<&str>) -> RequestBuilder {
        let token = bearer.unwrap_or(&self.config.api_key);

        self.client
            .request(method, url)
            .header("User-Agent", self.config.user_agent())
            .header("apikey", &self.config.api_key)
            .header("Authorization", format!("Bearer {token}"))
            .header("Accept", "application/json")
    }

    /// `GET` rows of a table.
    pub async fn select(
        &self,
        table: &str,
        query: &Query,
        bearer: Option<&str>,
    ) -> Result<serde_json::Value> {
        let url = self.config.table_url(table)?;
        log::debug!("GET {} {:?}", url, query.to_pairs());

        let request = self
            .build_request(Method::GET, url, bearer)
            .query(&query.to_pairs());

        let response = request.send().await.map_err(Error::Network)?;
        self.handle_response(response).await
    }

    /// `POST` new rows.
    pub async fn insert(
        &self,
        table: &str,
        body: &serde_json::Value,
        bearer: Option<&str>,
        prefer: Prefer,
    ) -> Result<serde_json::Value> {
        let url = self.config.table_url(table)?;
        log::debug!("POST {}", url);

        let request = self
            .build_request(Method::POST, url, bearer)
            .header("Prefer", prefer.header())
            .json(body);

        let response = request.send().await.map_err(Error::Network)?;
        self.handle_response(response).await
    }

    /// `PATCH` rows matching the query.
    pub async fn update(
        &self,
        table: &str,
        query: &Query,
        body: &serde_json::Value,
        bearer: Option<&str>,
        prefer: Prefer,
    ) -> Result<serde_json::Value> {
        let url = self.config.table_url(table)?;
        log::debug!("PATCH {} {:?}", url, query.to_pairs());

        let request = self
            .build_request(Method::PATCH, url, bearer)
            .header("Prefer", prefer.header())
            .query(&query.to_pairs())
            .json(body);

        let response = request.send().await.map_err(Error::Network)?;
        self.handle_response(response).await
    }

    /// `DELETE` rows matching the query.
    pub async fn delete(
        &self,
        table: &str,
        query: &Query,
        bearer: Option<&str>,
    ) -> Result<serde_json::Value> {
        let url = self.config.table_url(table)?;
        log::debug!("DELETE {} {:?}", url, query.to_pairs());

        let request = self
            .build_request(Method::DELETE, url, bearer)
            .header("Prefer", Prefer::Minimal.header())
            .query(&query.to_pairs());

        let response = request.send().await.map_err(Error::Network)?;
        self.handle_response(response).await
    }

    /// Handle response: JSON body on success, API error otherwise.
    async fn handle_response(&self, response: Response) -> Result<serde_json::Value> {
        let status = response.status();
        let text = response.text().await.map_err(Error::Network)?;

        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("Unknown error");
            let body: ApiErrorBody = serde_json::from_str(&text).unwrap_or_default();
            return Err(body.into_error(status.as_u16(), reason));
        }

        parse_json_response(&text)
    }
}

/// Parse a success body. Empty bodies (`return=minimal`, `204`) become `null`.
fn parse_json_response(text: &str) -> Result<serde_json::Value> {
    if text.trim().is_empty() {
        return Ok(serde_json::Value::Null);
    }
    serde_json::from_str(text).map_err(Error::Json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_url() {
        let config = HttpConfig {
            base_url: "https://abc.supabase.co".into(),
            ..Default::default()
        };

        let url = config.table_url("messages").unwrap();
        assert_eq!(url.as_str(), "https://abc.supabase.co/rest/v1/messages");
    }

    #[test]
    fn test_table_url_requires_base() {
        let config = HttpConfig::default();
        assert!(matches!(
            config.table_url("posts"),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_user_agent() {
        let mut config = HttpConfig::default();
        assert!(config.user_agent().starts_with("youniverse/"));
        config.custom_user_agent = Some("custom".into());
        assert_eq!(config.user_agent(), "custom");
    }

    #[test]
    fn test_parse_json_response() {
        assert_eq!(parse_json_response("").unwrap(), serde_json::Value::Null);
        assert!(parse_json_response("[{\"id\":\"1\"}]").unwrap().is_array());
        assert!(parse_json_response("<html>").is_err());
    }

    #[test]
    fn test_debug_hides_api_key() {
        let config = HttpConfig {
            api_key: "secret-key".into(),
            ..Default::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret-key"));
    }
}
