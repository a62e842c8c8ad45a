//! Authentication state.

use crate::models::UserId;

/// Authentication information for a signed-in user.
///
/// The access token is issued by the backend's auth service; this crate only
/// carries it.
#[derive(Clone)]
pub struct AuthInfo {
    /// Access token (JWT).
    pub access_token: String,
    /// User ID.
    pub user_id: UserId,
}

impl std::fmt::Debug for AuthInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthInfo")
            .field("access_token", &"***")
            .field("user_id", &self.user_id)
            .finish()
    }
}

impl AuthInfo {
    /// Create new auth info.
    pub fn new(access_token: impl Into<String>, user_id: impl Into<UserId>) -> Self {
        Self {
            access_token: access_token.into(),
            user_id: user_id.into(),
        }
    }

    /// Check if auth looks valid.
    pub fn is_valid(&self) -> bool {
        !self.access_token.trim().is_empty() && !self.user_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_info_validity() {
        let valid = AuthInfo::new("eyJhbGciOi", "7d3f");
        assert!(valid.is_valid());

        let empty_token = AuthInfo::new("", "7d3f");
        assert!(!empty_token.is_valid());

        let empty_uid = AuthInfo::new("eyJhbGciOi", "");
        assert!(!empty_uid.is_valid());
    }

    #[test]
    fn test_debug_hides_token() {
        let auth = AuthInfo::new("eyJhbGciOi.secret", "7d3f");
        assert!(!format!("{:?}", auth).contains("secret"));
    }
}
