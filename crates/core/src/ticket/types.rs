//! Core ticket data types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Status
// ============================================================================

/// Workflow status of a service ticket.
///
/// Tickets only ever move forward: `open -> in_progress -> completed`.
/// See [`crate::ticket::lifecycle`] for the transition rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Reported, nobody working on it yet.
    #[default]
    Open,
    /// A technician is working on it.
    InProgress,
    /// Service finished. Terminal.
    Completed,
}

impl TicketStatus {
    /// All statuses in workflow order.
    pub const ALL: [TicketStatus; 3] = [
        TicketStatus::Open,
        TicketStatus::InProgress,
        TicketStatus::Completed,
    ];

    /// Wire/storage name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Completed => "completed",
        }
    }

    /// Returns true if no further transition exists.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TicketStatus::Completed)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown ticket status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for TicketStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(TicketStatus::Open),
            "in_progress" => Ok(TicketStatus::InProgress),
            "completed" => Ok(TicketStatus::Completed),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

// ============================================================================
// Ticket
// ============================================================================

/// A service ticket ("chamado").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ticket {
    /// Server-assigned identifier. Never changes.
    pub id: String,
    /// Customer the service is for.
    pub client_name: String,
    /// Where the service takes place.
    pub address: String,
    /// Problem reported by the customer.
    pub description: String,
    /// Current workflow status.
    pub status: TicketStatus,
    /// Set once at creation.
    pub created_at: DateTime<Utc>,
    /// Refreshed on every mutation.
    pub updated_at: DateTime<Utc>,
}

/// Validated fields for a new ticket.
///
/// Tickets are always created `open`, so there is no status here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTicket {
    pub client_name: String,
    pub address: String,
    pub description: String,
}

impl NewTicket {
    pub fn new(
        client_name: impl Into<String>,
        address: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            client_name: client_name.into(),
            address: address.into(),
            description: description.into(),
        }
    }
}

/// Partial update of a ticket.
///
/// `id` and `created_at` are deliberately absent: they cannot be changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
}

impl TicketPatch {
    /// Patch that only changes the status.
    pub fn status(status: TicketStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Returns true if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.client_name.is_none()
            && self.address.is_none()
            && self.description.is_none()
            && self.status.is_none()
    }

    /// Apply the patch on top of an existing ticket (timestamps untouched).
    pub fn apply_to(&self, ticket: &mut Ticket) {
        if let Some(ref client_name) = self.client_name {
            ticket.client_name = client_name.clone();
        }
        if let Some(ref address) = self.address {
            ticket.address = address.clone();
        }
        if let Some(ref description) = self.description {
            ticket.description = description.clone();
        }
        if let Some(status) = self.status {
            ticket.status = status;
        }
    }
}

impl From<NewTicket> for TicketPatch {
    fn from(fields: NewTicket) -> Self {
        Self {
            client_name: Some(fields.client_name),
            address: Some(fields.address),
            description: Some(fields.description),
            status: None,
        }
    }
}
