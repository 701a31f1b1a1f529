//! Ticket store that can be told to fail or stall.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::ticket::{
    NewTicket, SqliteTicketStore, Ticket, TicketError, TicketFilter, TicketPatch, TicketStore,
};

/// Wraps an in-memory [`SqliteTicketStore`].
///
/// - `set_failing(true)` makes every call return `TicketError::Database`
///   without touching the data.
/// - `set_delay(d)` sleeps before every call, to exercise timeouts.
pub struct FailingTicketStore {
    inner: SqliteTicketStore,
    failing: AtomicBool,
    delay: Mutex<Duration>,
}

impl FailingTicketStore {
    /// # Panics
    ///
    /// If the in-memory database cannot be opened.
    pub fn new() -> Self {
        Self {
            inner: SqliteTicketStore::in_memory().expect("in-memory SQLite store"),
            failing: AtomicBool::new(false),
            delay: Mutex::new(Duration::ZERO),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        if let Ok(mut current) = self.delay.lock() {
            *current = delay;
        }
    }

    fn check(&self, operation: &str) -> Result<(), TicketError> {
        let delay = self.delay.lock().map(|d| *d).unwrap_or_default();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(TicketError::Database(format!(
                "simulated failure in {}",
                operation
            )));
        }
        Ok(())
    }
}

impl Default for FailingTicketStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TicketStore for FailingTicketStore {
    fn create(&self, ticket: NewTicket) -> Result<Ticket, TicketError> {
        self.check("create")?;
        self.inner.create(ticket)
    }

    fn get(&self, id: &str) -> Result<Option<Ticket>, TicketError> {
        self.check("get")?;
        self.inner.get(id)
    }

    fn list(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, TicketError> {
        self.check("list")?;
        self.inner.list(filter)
    }

    fn count(&self, filter: &TicketFilter) -> Result<i64, TicketError> {
        self.check("count")?;
        self.inner.count(filter)
    }

    fn update(&self, id: &str, patch: TicketPatch) -> Result<Ticket, TicketError> {
        self.check("update")?;
        self.inner.update(id, patch)
    }

    fn delete(&self, id: &str) -> Result<Ticket, TicketError> {
        self.check("delete")?;
        self.inner.delete(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_failure() {
        let store = FailingTicketStore::new();
        let ticket = store.create(NewTicket::new("A", "B", "C")).unwrap();

        store.set_failing(true);
        assert!(matches!(store.get(&ticket.id), Err(TicketError::Database(_))));
        assert!(store.delete(&ticket.id).is_err());

        store.set_failing(false);
        assert_eq!(store.get(&ticket.id).unwrap(), Some(ticket));
    }
}
