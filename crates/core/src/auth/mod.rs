mod none;
mod password;
mod traits;
mod types;

pub use none::*;
pub use password::*;
pub use traits::*;
pub use types::*;

use crate::config::AuthConfig;

/// Factory function to create the identity provider from config
pub fn create_identity_provider(
    config: &AuthConfig,
) -> Result<Box<dyn IdentityProvider>, AuthError> {
    use crate::config::AuthMethod;

    match config.method {
        AuthMethod::None => Ok(Box::new(NoneIdentityProvider::new(config.anonymous_role))),
        AuthMethod::Password => {
            if config.users.is_empty() {
                return Err(AuthError::ConfigurationError(
                    "at least one [[auth.users]] entry is required for password auth".to_string(),
                ));
            }
            Ok(Box::new(
                PasswordIdentityProvider::new(&config.users).with_session_ttl(config.session_ttl()),
            ))
        }
    }
}
