use std::collections::HashSet;

use super::{types::Config, AuthMethod, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Store timeout and session TTL are not 0
/// - Password auth has at least one user, with unique emails and
///   well-formed SHA-256 hashes
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.store.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "store.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.auth.session_ttl_secs == 0 {
        return Err(ConfigError::ValidationError(
            "auth.session_ttl_secs cannot be 0".to_string(),
        ));
    }

    if config.auth.method == AuthMethod::Password && config.auth.users.is_empty() {
        return Err(ConfigError::ValidationError(
            "auth.users must not be empty when auth.method = \"password\"".to_string(),
        ));
    }

    let mut seen_emails = HashSet::new();
    for user in &config.auth.users {
        if user.id.trim().is_empty() || user.email.trim().is_empty() || user.name.trim().is_empty()
        {
            return Err(ConfigError::ValidationError(format!(
                "auth.users entry '{}' needs a non-empty id, name and email",
                user.email
            )));
        }

        if !seen_emails.insert(user.email.trim().to_lowercase()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate user email: {}",
                user.email
            )));
        }

        let hash = &user.password_sha256;
        if hash.len() != 64 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ConfigError::ValidationError(format!(
                "password_sha256 for {} must be 64 hex characters",
                user.email
            )));
        }
    }

    Ok(())
}
