//! Ticket API handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use chamados_core::{
    ticket::{
        display_meta, filter_tickets, next_status, validate, validate_patch, StatusMeta,
        StatusTab, TabCounts, TicketInput,
    },
    Notification, Role, Ticket, TicketPatch, TicketStatus,
};

use super::error::ApiError;
use super::middleware::CurrentUser;
use crate::metrics::TICKET_MUTATIONS_TOTAL;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing tickets
#[derive(Debug, Default, Deserialize)]
pub struct ListTicketsParams {
    /// `all`, `open`, `in_progress` or `completed`
    pub tab: Option<String>,
    /// Case-insensitive substring over name, address and description
    pub search: Option<String>,
}

/// Request body for editing a ticket.
///
/// Unknown fields (`id`, `created_at`, `status`, ...) are rejected.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateTicketBody {
    pub client_name: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
}

/// Request body for setting the status
#[derive(Debug, Deserialize)]
pub struct SetStatusBody {
    pub status: TicketStatus,
}

/// A ticket with its display metadata
#[derive(Debug, Serialize)]
pub struct TicketResponse {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub status_meta: StatusMeta,
    /// Status the ticket can be advanced to, if any
    pub next_status: Option<TicketStatus>,
    /// Label for the advance button
    pub next_action: Option<&'static str>,
}

impl From<Ticket> for TicketResponse {
    fn from(ticket: Ticket) -> Self {
        let next = next_status(ticket.status);
        Self {
            status_meta: display_meta(ticket.status),
            next_status: next,
            next_action: next.and_then(|s| display_meta(s).advance_label),
            ticket,
        }
    }
}

/// Response for listing tickets
#[derive(Debug, Serialize)]
pub struct ListTicketsResponse {
    /// Tickets on the requested tab matching the search, newest first
    pub tickets: Vec<TicketResponse>,
    /// Counts over the whole set, ignoring tab and search
    pub counts: TabCounts,
    /// Number of tickets returned
    pub total: usize,
}

fn record(action: &'static str, result: &'static str) {
    TICKET_MUTATIONS_TOTAL
        .with_label_values(&[action, result])
        .inc();
}

/// Record the outcome of a mutation and notify on success.
fn finish<T>(
    state: &AppState,
    action: &'static str,
    result: Result<T, ApiError>,
    success_message: impl FnOnce(&T) -> String,
) -> Result<T, ApiError> {
    match &result {
        Ok(value) => {
            record(action, "ok");
            state
                .notifier()
                .notify(Notification::success(success_message(value)));
        }
        Err(ApiError::Validation(_)) => record(action, "invalid"),
        Err(_) => record(action, "error"),
    }
    result
}

// ============================================================================
// Handlers
// ============================================================================

/// List tickets, filtered by tab and search term
pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListTicketsParams>,
) -> Result<Json<ListTicketsResponse>, ApiError> {
    let tab = match params.tab.as_deref() {
        None | Some("") => StatusTab::All,
        Some(raw) => raw
            .parse::<StatusTab>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
    };
    let search = params.search.unwrap_or_default();

    let all = state.tickets().try_list().await?;
    let counts = TabCounts::from_tickets(&all);
    let tickets: Vec<TicketResponse> = filter_tickets(&all, tab, &search)
        .into_iter()
        .cloned()
        .map(TicketResponse::from)
        .collect();

    Ok(Json(ListTicketsResponse {
        total: tickets.len(),
        tickets,
        counts,
    }))
}

/// Get a ticket by ID
pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TicketResponse>, ApiError> {
    match state.tickets().try_get(&id).await? {
        Some(ticket) => Ok(Json(ticket.into())),
        None => Err(ApiError::NotFound(format!("Ticket not found: {}", id))),
    }
}

/// Create a new ticket. It always starts `open`.
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(body): Json<TicketInput>,
) -> Result<(StatusCode, Json<TicketResponse>), ApiError> {
    user.require("create", Role::can_create)?;

    let result = async {
        let fields = validate(&body)?;
        Ok::<_, ApiError>(state.tickets().try_create(fields).await?)
    }
    .await;
    let ticket = finish(&state, "create", result, |_| {
        "Chamado criado com sucesso".to_string()
    })?;

    info!(ticket_id = %ticket.id, user_id = %user.0.id, "Ticket created");
    Ok((StatusCode::CREATED, Json(ticket.into())))
}

/// Edit the text fields of a ticket
pub async fn update_ticket(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateTicketBody>,
) -> Result<Json<TicketResponse>, ApiError> {
    user.require("edit", Role::can_edit)?;

    let patch = TicketPatch {
        client_name: body.client_name,
        address: body.address,
        description: body.description,
        status: None,
    };
    if patch.is_empty() {
        return Err(ApiError::BadRequest("No fields to update".to_string()));
    }

    let result = async {
        let patch = validate_patch(patch)?;
        Ok::<_, ApiError>(state.tickets().try_update(&id, patch).await?)
    }
    .await;
    let ticket = finish(&state, "edit", result, |_| {
        "Chamado atualizado com sucesso".to_string()
    })?;

    info!(ticket_id = %ticket.id, user_id = %user.0.id, "Ticket updated");
    Ok(Json(ticket.into()))
}

/// Permanently delete a ticket
pub async fn delete_ticket(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<TicketResponse>, ApiError> {
    user.require("delete", Role::can_delete)?;

    let result = state.tickets().try_delete(&id).await.map_err(ApiError::from);
    let ticket = finish(&state, "delete", result, |_| {
        "Chamado excluído com sucesso!".to_string()
    })?;

    info!(ticket_id = %ticket.id, user_id = %user.0.id, "Ticket deleted");
    Ok(Json(ticket.into()))
}

/// Move a ticket to its next status
pub async fn advance_ticket(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<TicketResponse>, ApiError> {
    user.require("advance", Role::can_advance_status)?;

    let result = match state.tickets().try_advance(&id).await {
        Ok(Some(ticket)) => Ok(ticket),
        Ok(None) => Err(ApiError::Conflict(format!(
            "Ticket {} is already completed",
            id
        ))),
        Err(e) => Err(e.into()),
    };
    let ticket = finish(&state, "advance", result, status_changed)?;

    info!(ticket_id = %ticket.id, status = %ticket.status, "Ticket advanced");
    Ok(Json(ticket.into()))
}

/// Set the status. Only the next status in the workflow is accepted.
pub async fn set_status(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(body): Json<SetStatusBody>,
) -> Result<Json<TicketResponse>, ApiError> {
    user.require("advance", Role::can_advance_status)?;

    let result = state
        .tickets()
        .try_update_status(&id, body.status)
        .await
        .map_err(ApiError::from);
    let ticket = finish(&state, "set_status", result, status_changed)?;

    info!(ticket_id = %ticket.id, status = %ticket.status, "Ticket status set");
    Ok(Json(ticket.into()))
}

fn status_changed(ticket: &Ticket) -> String {
    format!(
        "Status alterado para \"{}\"",
        display_meta(ticket.status).label
    )
}
