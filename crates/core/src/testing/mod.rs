//! Test doubles and fixtures.
//!
//! Public so the server crate's integration tests can build state without
//! a real database file or log sink.
//!
//! # Example
//!
//! ```rust,ignore
//! use chamados_core::testing::{fixtures, FailingTicketStore, RecordingNotifier};
//!
//! let store = Arc::new(FailingTicketStore::new());
//! let service = TicketService::new(store.clone());
//!
//! store.set_failing(true);
//! assert!(service.list().await.is_empty());
//! ```

mod failing_store;
mod recording_notifier;

pub use failing_store::FailingTicketStore;
pub use recording_notifier::RecordingNotifier;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::auth::{Identity, Role, Session};
    use crate::ticket::NewTicket;

    /// An identity with the given role.
    pub fn identity(role: Role) -> Identity {
        Identity {
            id: format!("{}-1", role.as_str()),
            name: format!("Test {}", role.as_str()),
            email: format!("{}@example.com", role.as_str()),
            role,
        }
    }

    /// A session for a fake admin.
    pub fn admin_session() -> Session {
        Session::new("admin-token", identity(Role::Admin))
    }

    /// A session for a fake viewer.
    pub fn viewer_session() -> Session {
        Session::new("viewer-token", identity(Role::Viewer))
    }

    /// A valid new ticket for `client`.
    pub fn new_ticket(client: &str) -> NewTicket {
        NewTicket::new(
            client,
            format!("Rua {}, 100", client),
            format!("Equipamento de {} com defeito", client),
        )
    }
}
