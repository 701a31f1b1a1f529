use async_trait::async_trait;

use super::{AuthError, AuthRequest, Identity, IdentityProvider, Role, Session};

/// Provider that treats every request as the same anonymous identity.
/// Must be explicitly configured - the system won't default to this
pub struct NoneIdentityProvider {
    identity: Identity,
}

impl NoneIdentityProvider {
    pub fn new(role: Role) -> Self {
        Self {
            identity: Identity::anonymous(role),
        }
    }
}

impl Default for NoneIdentityProvider {
    fn default() -> Self {
        Self::new(Role::Viewer)
    }
}

#[async_trait]
impl IdentityProvider for NoneIdentityProvider {
    async fn login(&self, _email: &str, _password: &str) -> Result<Session, AuthError> {
        Ok(Session::new("anonymous", self.identity.clone()))
    }

    async fn current_user(&self, _token: &str) -> Option<Identity> {
        Some(self.identity.clone())
    }

    async fn logout(&self, _token: &str) {}

    async fn authenticate(&self, _request: &AuthRequest) -> Result<Identity, AuthError> {
        Ok(self.identity.clone())
    }

    fn method_name(&self) -> &'static str {
        "none"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::net::IpAddr;

    #[tokio::test]
    async fn test_none_provider_returns_anonymous() {
        let auth = NoneIdentityProvider::default();
        let request = AuthRequest {
            headers: HashMap::new(),
            source_ip: "127.0.0.1".parse::<IpAddr>().unwrap(),
        };

        let identity = auth.authenticate(&request).await.unwrap();

        assert_eq!(identity.id, "anonymous");
        assert_eq!(identity.role, Role::Viewer);
    }

    #[tokio::test]
    async fn test_none_provider_uses_configured_role() {
        let auth = NoneIdentityProvider::new(Role::Admin);
        let session = auth.login("", "").await.unwrap();
        assert_eq!(session.role(), Role::Admin);
        assert!(auth.current_user("whatever").await.is_some());
    }

    #[test]
    fn test_none_provider_method_name() {
        assert_eq!(NoneIdentityProvider::default().method_name(), "none");
    }
}
