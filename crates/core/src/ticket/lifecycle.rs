//! Ticket lifecycle policy.
//!
//! Pure functions: which status comes next, and how each status is shown.

use serde::Serialize;

use super::TicketStatus;

/// Display metadata for a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusMeta {
    /// Full label shown on badges and tabs.
    pub label: &'static str,
    /// Compact label for narrow layouts.
    pub short_label: &'static str,
    /// Semantic color token.
    pub color: &'static str,
    /// Icon name.
    pub icon: &'static str,
    /// Verb on the button that moves a ticket *into* this status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advance_label: Option<&'static str>,
}

/// The single status a ticket may advance to, if any.
pub fn next_status(current: TicketStatus) -> Option<TicketStatus> {
    match current {
        TicketStatus::Open => Some(TicketStatus::InProgress),
        TicketStatus::InProgress => Some(TicketStatus::Completed),
        TicketStatus::Completed => None,
    }
}

/// Returns true if `to` is the legal next status of `from`.
pub fn is_legal_transition(from: TicketStatus, to: TicketStatus) -> bool {
    next_status(from) == Some(to)
}

/// Display metadata lookup. Total over all statuses.
pub fn display_meta(status: TicketStatus) -> StatusMeta {
    match status {
        TicketStatus::Open => StatusMeta {
            label: "Aberto",
            short_label: "Aberto",
            color: "info",
            icon: "clock",
            advance_label: None,
        },
        TicketStatus::InProgress => StatusMeta {
            label: "Em Andamento",
            short_label: "Andamento",
            color: "warning",
            icon: "arrow-right",
            advance_label: Some("Iniciar"),
        },
        TicketStatus::Completed => StatusMeta {
            label: "Concluído",
            short_label: "Concluído",
            color: "success",
            icon: "check-circle",
            advance_label: Some("Concluir"),
        },
    }
}
