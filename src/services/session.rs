use async_trait::async_trait;
use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;

use crate::error::{AppError, AppResult};

/// An authorized storage session: the bearer credential every document
/// store call is made with. Created by an [`Authorizer`], dropped on
/// logout — never referenced through globals.
#[derive(Debug, Clone)]
pub struct Session {
    access_token: String,
    granted_at: DateTime<Utc>,
}

impl Session {
    pub fn new(access_token: String) -> Self {
        Self {
            access_token,
            granted_at: Utc::now(),
        }
    }

    pub fn bearer(&self) -> &str {
        &self.access_token
    }

    pub fn granted_at(&self) -> DateTime<Utc> {
        self.granted_at
    }
}

/// Produces storage sessions. The interactive browser consent flow lives
/// outside this service; implementations exchange whatever credential
/// they hold for a bearer session.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize(&self) -> AppResult<Session>;
}

/// Hands out sessions backed by a pre-issued token from configuration
pub struct ConfiguredTokenAuthorizer {
    token: Option<String>,
}

impl ConfiguredTokenAuthorizer {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }
}

#[async_trait]
impl Authorizer for ConfiguredTokenAuthorizer {
    async fn authorize(&self) -> AppResult<Session> {
        match &self.token {
            Some(token) if !token.is_empty() => Ok(Session::new(token.clone())),
            _ => Err(AppError::NotAuthorized(
                "no storage access token configured".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_configured_token_authorizer_success() {
        let authorizer = ConfiguredTokenAuthorizer::new(Some("ya29.token".to_string()));
        let session = authorizer.authorize().await.unwrap();
        assert_eq!(session.bearer(), "ya29.token");
    }

    #[tokio::test]
    async fn test_configured_token_authorizer_missing_token() {
        let authorizer = ConfiguredTokenAuthorizer::new(None);
        let result = authorizer.authorize().await;
        assert!(matches!(result, Err(AppError::NotAuthorized(_))));
    }

    #[tokio::test]
    async fn test_configured_token_authorizer_empty_token() {
        let authorizer = ConfiguredTokenAuthorizer::new(Some(String::new()));
        assert!(authorizer.authorize().await.is_err());
    }
}
