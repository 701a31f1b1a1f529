use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::IpAddr;

/// User role. Decides which ticket actions are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Can create, edit, delete and advance tickets.
    Admin,
    /// Can only browse and search.
    #[default]
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Viewer => "viewer",
        }
    }

    pub fn can_view(&self) -> bool {
        true
    }

    pub fn can_create(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn can_edit(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn can_delete(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn can_advance_status(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            view: self.can_view(),
            create: self.can_create(),
            edit: self.can_edit(),
            delete: self.can_delete(),
            advance_status: self.can_advance_status(),
        }
    }
}

/// Flattened capability set, for clients deciding which controls to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub view: bool,
    pub create: bool,
    pub edit: bool,
    pub delete: bool,
    pub advance_status: bool,
}

/// Request information for authentication
#[derive(Debug, Clone)]
pub struct AuthRequest {
    pub headers: HashMap<String, String>,
    pub source_ip: IpAddr,
}

impl AuthRequest {
    /// Token from `Authorization: Bearer <token>`, if present.
    pub fn bearer_token(&self) -> Option<&str> {
        let header = self.headers.get("authorization")?;
        header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

/// Authenticated identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl Identity {
    pub fn anonymous(role: Role) -> Self {
        Self {
            id: "anonymous".to_string(),
            name: "Anonymous".to_string(),
            email: String::new(),
            role,
        }
    }
}

/// A logged-in session. Passed explicitly to anything that needs to know
/// who is acting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub identity: Identity,
}

impl Session {
    pub fn new(token: impl Into<String>, identity: Identity) -> Self {
        Self {
            token: token.into(),
            identity,
        }
    }

    pub fn role(&self) -> Role {
        self.identity.role
    }
}
