//! Ticket storage trait and types.

use std::time::Duration;

use thiserror::Error;

use crate::ticket::{NewTicket, Ticket, TicketPatch, TicketStatus};

/// Error type for ticket operations.
#[derive(Debug, Error)]
pub enum TicketError {
    /// Ticket not found.
    #[error("Ticket not found: {0}")]
    NotFound(String),

    /// Requested status is not the legal next status.
    #[error("Cannot move ticket {ticket_id} from {from} to {to}")]
    InvalidTransition {
        ticket_id: String,
        from: TicketStatus,
        to: TicketStatus,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// The store did not answer in time.
    #[error("Store operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Filter for querying tickets.
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    /// Filter by status.
    pub status: Option<TicketStatus>,
}

impl TicketFilter {
    /// Create a new filter matching every ticket.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by status.
    pub fn with_status(mut self, status: TicketStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Trait for ticket storage backends.
///
/// The backend assigns ids and timestamps. Listing is ordered by
/// `created_at`, most recent first.
pub trait TicketStore: Send + Sync {
    /// Create a new ticket in the `open` status.
    fn create(&self, ticket: NewTicket) -> Result<Ticket, TicketError>;

    /// Get a ticket by ID.
    fn get(&self, id: &str) -> Result<Option<Ticket>, TicketError>;

    /// List tickets matching the filter.
    fn list(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, TicketError>;

    /// Count tickets matching the filter.
    fn count(&self, filter: &TicketFilter) -> Result<i64, TicketError>;

    /// Apply a partial update and refresh `updated_at`.
    ///
    /// A status change must be the legal next status of the current one.
    fn update(&self, id: &str, patch: TicketPatch) -> Result<Ticket, TicketError>;

    /// Change only the status.
    fn update_status(&self, id: &str, status: TicketStatus) -> Result<Ticket, TicketError> {
        self.update(id, TicketPatch::status(status))
    }

    /// Permanently delete a ticket.
    /// Returns the deleted ticket if found.
    fn delete(&self, id: &str) -> Result<Ticket, TicketError>;
}
