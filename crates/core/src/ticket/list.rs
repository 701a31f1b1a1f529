//! Ticket list: tab/search filtering, per-status counts and the controller
//! that owns the in-memory ticket set.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::form::{SubmitError, TicketForm, ValidationError};
use super::lifecycle::display_meta;
use super::types::ParseStatusError;
use super::{Ticket, TicketService, TicketStatus};
use crate::auth::Session;
use crate::notify::{Notification, Notifier};

/// A tab of the ticket list: every ticket, or one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StatusTab {
    #[default]
    All,
    Status(TicketStatus),
}

impl StatusTab {
    /// Tabs in display order.
    pub const TABS: [StatusTab; 4] = [
        StatusTab::All,
        StatusTab::Status(TicketStatus::Open),
        StatusTab::Status(TicketStatus::InProgress),
        StatusTab::Status(TicketStatus::Completed),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusTab::All => "all",
            StatusTab::Status(status) => status.as_str(),
        }
    }

    pub fn matches(&self, status: TicketStatus) -> bool {
        match self {
            StatusTab::All => true,
            StatusTab::Status(tab) => *tab == status,
        }
    }
}

impl From<TicketStatus> for StatusTab {
    fn from(status: TicketStatus) -> Self {
        StatusTab::Status(status)
    }
}

impl fmt::Display for StatusTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusTab {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(StatusTab::All),
            other => other.parse().map(StatusTab::Status),
        }
    }
}

/// Returns true if any text field contains `term`, ignoring case.
///
/// Accents are significant: "joao" does not match "João".
pub fn matches_search(ticket: &Ticket, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    [&ticket.client_name, &ticket.address, &ticket.description]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Tickets on `tab` that match `search_term`, in their original order.
pub fn filter_tickets<'a>(
    tickets: &'a [Ticket],
    tab: StatusTab,
    search_term: &str,
) -> Vec<&'a Ticket> {
    tickets
        .iter()
        .filter(|t| tab.matches(t.status))
        .filter(|t| matches_search(t, search_term))
        .collect()
}

/// Number of tickets on `tab`. `All` is the total.
pub fn count_by_status(tickets: &[Ticket], tab: StatusTab) -> usize {
    match tab {
        StatusTab::All => tickets.len(),
        StatusTab::Status(_) => tickets.iter().filter(|t| tab.matches(t.status)).count(),
    }
}

/// Ticket count for every tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabCounts {
    pub all: usize,
    pub open: usize,
    pub in_progress: usize,
    pub completed: usize,
}

impl TabCounts {
    pub fn from_tickets(tickets: &[Ticket]) -> Self {
        Self {
            all: count_by_status(tickets, StatusTab::All),
            open: count_by_status(tickets, TicketStatus::Open.into()),
            in_progress: count_by_status(tickets, TicketStatus::InProgress.into()),
            completed: count_by_status(tickets, TicketStatus::Completed.into()),
        }
    }

    pub fn get(&self, tab: StatusTab) -> usize {
        match tab {
            StatusTab::All => self.all,
            StatusTab::Status(TicketStatus::Open) => self.open,
            StatusTab::Status(TicketStatus::InProgress) => self.in_progress,
            StatusTab::Status(TicketStatus::Completed) => self.completed,
        }
    }
}

/// Result of a controller action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Persisted; the list was reloaded.
    Done,
    /// The session's role may not do this.
    Denied,
    /// The user did not confirm.
    Cancelled,
    /// Form input was rejected before reaching the store.
    Invalid(ValidationError),
    /// The store reported a failure. The list is unchanged.
    Failed,
    /// The ticket is already completed.
    NoTransition,
}

impl ActionOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, ActionOutcome::Done)
    }
}

/// Owns the ticket list shown to the user.
///
/// Every mutation goes through the [`TicketService`] and, on success, the
/// whole list is fetched again with [`load`](Self::load). Nothing is patched
/// locally, so a failed mutation leaves `tickets` exactly as it was.
pub struct TicketListController {
    service: TicketService,
    notifier: Arc<dyn Notifier>,
    tickets: Vec<Ticket>,
    active_tab: StatusTab,
    search_term: String,
}

impl TicketListController {
    pub fn new(service: TicketService, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            service,
            notifier,
            tickets: Vec::new(),
            active_tab: StatusTab::All,
            search_term: String::new(),
        }
    }

    /// Replace the in-memory set with a fresh fetch.
    pub async fn load(&mut self) {
        self.tickets = self.service.list().await;
        debug!(count = self.tickets.len(), "Ticket list loaded");
    }

    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    pub fn active_tab(&self) -> StatusTab {
        self.active_tab
    }

    pub fn set_tab(&mut self, tab: StatusTab) {
        self.active_tab = tab;
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    /// Tickets on the active tab matching the search term.
    pub fn visible(&self) -> Vec<&Ticket> {
        filter_tickets(&self.tickets, self.active_tab, &self.search_term)
    }

    pub fn counts(&self) -> TabCounts {
        TabCounts::from_tickets(&self.tickets)
    }

    /// Create or update the form's target.
    pub async fn submit_form(&mut self, session: &Session, form: &TicketForm) -> ActionOutcome {
        let editing = form.is_editing();
        let allowed = if editing {
            session.role().can_edit()
        } else {
            session.role().can_create()
        };
        if !allowed {
            return self.deny(session, if editing { "edit" } else { "create" });
        }

        match form.submit(&self.service).await {
            Ok(ticket) => {
                info!(
                    ticket_id = %ticket.id,
                    user = %session.identity.email,
                    editing,
                    "Ticket saved"
                );
                self.load().await;
                self.notifier.notify(Notification::success(if editing {
                    "Chamado atualizado com sucesso"
                } else {
                    "Chamado criado com sucesso"
                }));
                ActionOutcome::Done
            }
            Err(SubmitError::Invalid(err)) => {
                self.notifier.notify(Notification::error(err.user_message()));
                ActionOutcome::Invalid(err)
            }
            Err(SubmitError::Persistence) => {
                self.notifier.notify(Notification::error(if editing {
                    "Não foi possível atualizar o chamado"
                } else {
                    "Não foi possível criar o chamado"
                }));
                ActionOutcome::Failed
            }
        }
    }

    /// Delete a ticket. Nothing happens unless `confirmed` is true.
    pub async fn delete(&mut self, session: &Session, id: &str, confirmed: bool) -> ActionOutcome {
        if !session.role().can_delete() {
            return self.deny(session, "delete");
        }
        if !confirmed {
            return ActionOutcome::Cancelled;
        }

        if self.service.delete(id).await {
            info!(ticket_id = %id, user = %session.identity.email, "Ticket deleted");
            self.load().await;
            self.notifier
                .notify(Notification::success("Chamado excluído com sucesso!"));
            ActionOutcome::Done
        } else {
            self.notifier
                .notify(Notification::error("Não foi possível excluir o chamado"));
            ActionOutcome::Failed
        }
    }

    /// Move a ticket to its next status.
    pub async fn advance(&mut self, session: &Session, id: &str) -> ActionOutcome {
        if !session.role().can_advance_status() {
            return self.deny(session, "advance");
        }

        match self.service.try_advance(id).await {
            Ok(Some(ticket)) => {
                info!(ticket_id = %id, status = %ticket.status, "Ticket advanced");
                self.load().await;
                self.notifier.notify(Notification::success(format!(
                    "Status alterado para \"{}\"",
                    display_meta(ticket.status).label
                )));
                ActionOutcome::Done
            }
            Ok(None) => ActionOutcome::NoTransition,
            Err(e) => {
                error!(ticket_id = %id, error = %e, "Failed to advance ticket");
                self.notifier
                    .notify(Notification::error("Não foi possível alterar o status"));
                ActionOutcome::Failed
            }
        }
    }

    fn deny(&self, session: &Session, action: &str) -> ActionOutcome {
        debug!(
            user = %session.identity.email,
            role = session.role().as_str(),
            action,
            "Action denied"
        );
        ActionOutcome::Denied
    }
}
