//! Error types.

use serde::Deserialize;
use thiserror::Error;

/// The main error type for youniverse operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network-related error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Backend returned an error response.
    #[error("API error [{code}]: {message}")]
    Api { code: String, message: String },

    /// Failed to parse response data.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Operation requires authentication but none was provided.
    #[error("Authentication required")]
    AuthRequired,

    /// A required field was missing in the response.
    #[error("Missing field: {0}")]
    MissingField(String),

    /// Invalid argument passed to an API method.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Cache storage error.
    #[error("Cache error: {0}")]
    Cache(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

/// Error body returned by the REST endpoint.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl ApiErrorBody {
    /// Convert into an [`Error::Api`], falling back to the HTTP status.
    pub(crate) fn into_error(self, status: u16, reason: &str) -> Error {
        let code = self.code.unwrap_or_else(|| status.to_string());
        let mut message = self.message.unwrap_or_else(|| reason.to_owned());
        if let Some(details) = self.details.filter(|d| !d.is_empty()) {
            message.push_str(" (");
            message.push_str(&details);
            message.push(')');
        }
        if let Some(hint) = self.hint.filter(|h| !h.is_empty()) {
            message.push_str(" hint: ");
            message.push_str(&hint);
        }
        Error::Api { code, message }
    }
}

impl Error {
    /// Create an API error.
    pub fn api(code: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Api {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    /// Create a missing field error.
    pub fn missing(field: impl Into<String>) -> Self {
        Error::MissingField(field.into())
    }

    /// Check if this error is potentially retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Network(_) => true,
            Error::Api { code, .. } => matches!(code.as_str(), "429" | "502" | "503" | "504"),
            _ => false,
        }
    }

    /// Check if this is an authentication error.
    ///
    /// `PGRST301` is an expired or malformed JWT, `42501` a row-level
    /// security rejection.
    pub fn is_auth_error(&self) -> bool {
        match self {
            Error::AuthRequired => true,
            Error::Api { code, .. } => matches!(code.as_str(), "401" | "403" | "PGRST301" | "42501"),
            _ => false,
        }
    }
}

/// Result type alias for youniverse operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::api("23505", "duplicate key value");
        assert_eq!(format!("{}", e), "API error [23505]: duplicate key value");
    }

    #[test]
    fn test_retryable() {
        assert!(Error::api("503", "unavailable").is_retryable());
        assert!(!Error::api("23505", "duplicate").is_retryable());
        assert!(!Error::AuthRequired.is_retryable());
    }

    #[test]
    fn test_auth_error() {
        assert!(Error::AuthRequired.is_auth_error());
        assert!(Error::api("PGRST301", "JWT expired").is_auth_error());
        assert!(Error::api("42501", "new row violates row-level security").is_auth_error());
        assert!(!Error::api("PGRST116", "no rows").is_auth_error());
    }

    #[test]
    fn test_error_body_conversion() {
        let body: ApiErrorBody = serde_json::from_str(
            r#"{"code":"23503","message":"insert violates foreign key","details":"Key is not present","hint":null}"#,
        )
        .unwrap();
        let err = body.into_error(409, "Conflict");
        match err {
            Error::Api { code, message } => {
                assert_eq!(code, "23503");
                assert_eq!(message, "insert violates foreign key (Key is not present)");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = ApiErrorBody::default().into_error(404, "Not Found");
        assert_eq!(err.to_string(), "API error [404]: Not Found");
    }
}
