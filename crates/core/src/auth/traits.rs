use async_trait::async_trait;
use thiserror::Error;

use super::types::{AuthRequest, Identity, Session};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required")]
    NotAuthenticated,

    /// Message is shown to the user as is.
    #[error("{0}")]
    InvalidCredentials(String),

    #[error("Not allowed to {0}")]
    Forbidden(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Source of identities and sessions.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange credentials for a session.
    async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// Identity behind a session token, if the session is live.
    async fn current_user(&self, token: &str) -> Option<Identity>;

    /// End a session. Unknown tokens are ignored.
    async fn logout(&self, token: &str);

    /// Authenticate a request by its bearer token.
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError> {
        let token = request.bearer_token().ok_or(AuthError::NotAuthenticated)?;
        self.current_user(token).await.ok_or_else(|| {
            AuthError::InvalidCredentials("Session expired or invalid".to_string())
        })
    }

    /// Name of this authentication method
    fn method_name(&self) -> &'static str;
}
