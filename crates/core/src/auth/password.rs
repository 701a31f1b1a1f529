//! Email/password login against the users listed in the configuration.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::{AuthError, Identity, IdentityProvider, Session};
use crate::config::{UserConfig, DEFAULT_SESSION_TTL_SECS};

/// Message returned for any failed login, whatever the cause.
const INVALID_LOGIN: &str = "Invalid login credentials";

struct UserRecord {
    identity: Identity,
    password_sha256: String,
}

struct SessionEntry {
    identity: Identity,
    expires_at: Instant,
}

impl SessionEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// Identity provider backed by configured users.
///
/// Sessions are random tokens kept in memory; they do not survive a restart.
/// A session expires after the configured TTL. Expired entries are dropped
/// when looked up and whenever someone logs in.
pub struct PasswordIdentityProvider {
    users: HashMap<String, UserRecord>,
    sessions: RwLock<HashMap<String, SessionEntry>>,
    session_ttl: Duration,
}

impl PasswordIdentityProvider {
    pub fn new(users: &[UserConfig]) -> Self {
        let users = users
            .iter()
            .map(|user| {
                (
                    normalize_email(&user.email),
                    UserRecord {
                        identity: Identity {
                            id: user.id.clone(),
                            name: user.name.clone(),
                            email: user.email.clone(),
                            role: user.role,
                        },
                        password_sha256: user.password_sha256.to_lowercase(),
                    },
                )
            })
            .collect();

        Self {
            users,
            sessions: RwLock::new(HashMap::new()),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
        }
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        let now = Instant::now();
        self.sessions
            .read()
            .await
            .values()
            .filter(|entry| entry.is_live(now))
            .count()
    }
}

/// Hex-encoded SHA-256 of a password, as stored in `password_sha256`.
pub fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl IdentityProvider for PasswordIdentityProvider {
    async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = normalize_email(email);
        let Some(record) = self.users.get(&email) else {
            warn!(email = %email, "Login attempt for unknown user");
            return Err(AuthError::InvalidCredentials(INVALID_LOGIN.to_string()));
        };

        let provided = hash_password(password);
        if !constant_time_eq(provided.as_bytes(), record.password_sha256.as_bytes()) {
            warn!(email = %email, "Login attempt with wrong password");
            return Err(AuthError::InvalidCredentials(INVALID_LOGIN.to_string()));
        }

        let token = uuid::Uuid::new_v4().to_string();
        let now = Instant::now();
        {
            let mut sessions = self.sessions.write().await;
            sessions.retain(|_, entry| entry.is_live(now));
            sessions.insert(
                token.clone(),
                SessionEntry {
                    identity: record.identity.clone(),
                    expires_at: now + self.session_ttl,
                },
            );
        }

        info!(
            user_id = %record.identity.id,
            role = record.identity.role.as_str(),
            "User logged in"
        );
        Ok(Session::new(token, record.identity.clone()))
    }

    async fn current_user(&self, token: &str) -> Option<Identity> {
        let now = Instant::now();
        match self.sessions.read().await.get(token) {
            Some(entry) if entry.is_live(now) => return Some(entry.identity.clone()),
            Some(_) => {}
            None => return None,
        }

        let mut sessions = self.sessions.write().await;
        if sessions.get(token).is_some_and(|entry| !entry.is_live(now)) {
            if let Some(entry) = sessions.remove(token) {
                debug!(user_id = %entry.identity.id, "Session expired");
            }
        }
        None
    }

    async fn logout(&self, token: &str) {
        if let Some(entry) = self.sessions.write().await.remove(token) {
            info!(user_id = %entry.identity.id, "User logged out");
        }
    }

    fn method_name(&self) -> &'static str {
        "password"
    }
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
