//! Service tickets ("chamados"): data types, lifecycle rules, storage and
//! the list/form controllers built on top of them.

pub mod form;
pub mod lifecycle;
pub mod list;
mod service;
mod sqlite_store;
mod store;
mod types;

pub use form::{
    validate, validate_patch, FormField, SubmitError, TicketForm, TicketInput, ValidationError,
};
pub use lifecycle::{display_meta, is_legal_transition, next_status, StatusMeta};
pub use list::{
    count_by_status, filter_tickets, matches_search, ActionOutcome, StatusTab, TabCounts,
    TicketListController,
};
pub use service::{TicketService, DEFAULT_STORE_TIMEOUT};
pub use sqlite_store::SqliteTicketStore;
pub use store::{TicketError, TicketFilter, TicketStore};
pub use types::{NewTicket, ParseStatusError, Ticket, TicketPatch, TicketStatus};
