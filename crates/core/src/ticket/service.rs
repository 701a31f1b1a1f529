//! Async facade over a [`TicketStore`].
//!
//! Store calls run on the blocking pool under a timeout. The plain methods
//! (`list`, `get`, `create`, ...) never fail: errors are logged and turned
//! into an empty list, `None` or `false`. The `try_*` variants keep the error
//! for callers that need to tell "not found" from "conflict".

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error};

use super::lifecycle::next_status;
use super::{NewTicket, Ticket, TicketError, TicketFilter, TicketPatch, TicketStatus, TicketStore};
use crate::metrics::{STATUS_TRANSITIONS, STORE_OPERATIONS, STORE_OPERATION_DURATION};

/// Default time a store operation may take.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// Sentinel-returning ticket service.
#[derive(Clone)]
pub struct TicketService {
    store: Arc<dyn TicketStore>,
    timeout: Duration,
}

impl TicketService {
    pub fn new(store: Arc<dyn TicketStore>) -> Self {
        Self {
            store,
            timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Set the per-operation timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn store(&self) -> &Arc<dyn TicketStore> {
        &self.store
    }

    async fn run<T, F>(&self, operation: &'static str, f: F) -> Result<T, TicketError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn TicketStore) -> Result<T, TicketError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let start = Instant::now();
        let task = tokio::task::spawn_blocking(move || f(store.as_ref()));

        let result = match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(TicketError::Database(format!(
                "store task failed: {}",
                join_error
            ))),
            Err(_) => Err(TicketError::Timeout(self.timeout)),
        };

        let outcome = match &result {
            Ok(_) => "ok",
            Err(TicketError::Timeout(_)) => "timeout",
            Err(_) => "error",
        };
        STORE_OPERATIONS
            .with_label_values(&[operation, outcome])
            .inc();
        STORE_OPERATION_DURATION
            .with_label_values(&[operation])
            .observe(start.elapsed().as_secs_f64());
        debug!(operation, outcome, "Ticket store operation finished");

        result
    }

    // ------------------------------------------------------------------------
    // Fallible API
    // ------------------------------------------------------------------------

    /// All tickets, most recent first.
    pub async fn try_list(&self) -> Result<Vec<Ticket>, TicketError> {
        self.run("list", |store| store.list(&TicketFilter::new()))
            .await
    }

    pub async fn try_get(&self, id: &str) -> Result<Option<Ticket>, TicketError> {
        let id = id.to_string();
        self.run("get", move |store| store.get(&id)).await
    }

    pub async fn try_create(&self, ticket: NewTicket) -> Result<Ticket, TicketError> {
        self.run("create", move |store| store.create(ticket)).await
    }

    pub async fn try_update(&self, id: &str, patch: TicketPatch) -> Result<Ticket, TicketError> {
        let id = id.to_string();
        let status_change = patch.status;
        let (from, updated) = self
            .run("update", move |store| {
                let from = match status_change {
                    Some(_) => store.get(&id)?.map(|t| t.status),
                    None => None,
                };
                Ok((from, store.update(&id, patch)?))
            })
            .await?;
        record_transition(from, updated.status);
        Ok(updated)
    }

    /// Set the status. Only the legal next status is accepted by the store.
    pub async fn try_update_status(
        &self,
        id: &str,
        status: TicketStatus,
    ) -> Result<Ticket, TicketError> {
        self.try_update(id, TicketPatch::status(status)).await
    }

    /// Move a ticket to its next status.
    ///
    /// Returns `Ok(None)` when the ticket is already completed.
    pub async fn try_advance(&self, id: &str) -> Result<Option<Ticket>, TicketError> {
        let id = id.to_string();
        let advanced = self
            .run("advance", move |store| {
                let current = store
                    .get(&id)?
                    .ok_or_else(|| TicketError::NotFound(id.clone()))?;
                match next_status(current.status) {
                    Some(next) => Ok(Some((current.status, store.update_status(&id, next)?))),
                    None => Ok(None),
                }
            })
            .await?;

        Ok(advanced.map(|(from, ticket)| {
            record_transition(Some(from), ticket.status);
            ticket
        }))
    }

    pub async fn try_delete(&self, id: &str) -> Result<Ticket, TicketError> {
        let id = id.to_string();
        self.run("delete", move |store| store.delete(&id)).await
    }

    // ------------------------------------------------------------------------
    // Sentinel API
    // ------------------------------------------------------------------------

    /// All tickets, or an empty list if the store failed.
    pub async fn list(&self) -> Vec<Ticket> {
        self.try_list().await.unwrap_or_else(|e| {
            error!(error = %e, "Failed to list tickets");
            Vec::new()
        })
    }

    /// The ticket, or `None` if missing or the store failed.
    pub async fn get(&self, id: &str) -> Option<Ticket> {
        self.try_get(id).await.unwrap_or_else(|e| {
            error!(ticket_id = %id, error = %e, "Failed to fetch ticket");
            None
        })
    }

    pub async fn create(&self, ticket: NewTicket) -> Option<Ticket> {
        self.try_create(ticket)
            .await
            .map_err(|e| error!(error = %e, "Failed to create ticket"))
            .ok()
    }

    pub async fn update(&self, id: &str, patch: TicketPatch) -> Option<Ticket> {
        self.try_update(id, patch)
            .await
            .map_err(|e| error!(ticket_id = %id, error = %e, "Failed to update ticket"))
            .ok()
    }

    pub async fn update_status(&self, id: &str, status: TicketStatus) -> Option<Ticket> {
        self.try_update_status(id, status)
            .await
            .map_err(|e| {
                error!(
                    ticket_id = %id,
                    status = %status,
                    error = %e,
                    "Failed to update ticket status"
                )
            })
            .ok()
    }

    pub async fn advance(&self, id: &str) -> Option<Ticket> {
        self.try_advance(id).await.unwrap_or_else(|e| {
            error!(ticket_id = %id, error = %e, "Failed to advance ticket");
            None
        })
    }

    /// Returns true if the ticket was deleted.
    pub async fn delete(&self, id: &str) -> bool {
        match self.try_delete(id).await {
            Ok(_) => true,
            Err(e) => {
                error!(ticket_id = %id, error = %e, "Failed to delete ticket");
                false
            }
        }
    }
}

fn record_transition(from: Option<TicketStatus>, to: TicketStatus) {
    if let Some(from) = from.filter(|from| *from != to) {
        STATUS_TRANSITIONS
            .with_label_values(&[from.as_str(), to.as_str()])
            .inc();
    }
}
