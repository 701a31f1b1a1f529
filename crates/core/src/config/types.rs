use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use crate::auth::Role;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub method: AuthMethod,
    /// Accounts for password login.
    #[serde(default)]
    pub users: Vec<UserConfig>,
    /// Role given to everyone when `method = "none"`.
    #[serde(default)]
    pub anonymous_role: Role,
    /// Seconds a login session stays valid.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
}

/// Twelve hours.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 12 * 60 * 60;

fn default_session_ttl_secs() -> u64 {
    DEFAULT_SESSION_TTL_SECS
}

impl AuthConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    None,
    Password,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::None => "none",
            AuthMethod::Password => "password",
        }
    }
}

/// A user account
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserConfig {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Hex-encoded SHA-256 of the password.
    pub password_sha256: String,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("chamados.db")
}

/// Ticket store behaviour
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Upper bound for a single store operation, in seconds.
    #[serde(default = "default_store_timeout")]
    pub timeout_secs: u64,
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_store_timeout(),
        }
    }
}

fn default_store_timeout() -> u64 {
    10
}

/// Log output configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: String,
    pub users: Vec<SanitizedUserConfig>,
    pub anonymous_role: Role,
    pub session_ttl_secs: u64,
}

/// User without the password hash
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedUserConfig {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                method: config.auth.method.as_str().to_string(),
                users: config
                    .auth
                    .users
                    .iter()
                    .map(|u| SanitizedUserConfig {
                        id: u.id.clone(),
                        name: u.name.clone(),
                        email: u.email.clone(),
                        role: u.role,
                    })
                    .collect(),
                anonymous_role: config.auth.anonymous_role,
                session_ttl_secs: config.auth.session_ttl_secs,
            },
            server: config.server.clone(),
            database: config.database.clone(),
            store: config.store.clone(),
            logging: config.logging.clone(),
        }
    }
}
