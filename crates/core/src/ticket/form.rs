//! Ticket form: validation and create/edit submission.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{NewTicket, Ticket, TicketPatch, TicketService};

/// Editable text fields of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    ClientName,
    Address,
    Description,
}

impl FormField {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::ClientName => "client_name",
            FormField::Address => "address",
            FormField::Description => "description",
        }
    }
}

/// Required fields were left empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Required fields are empty: {}", join_fields(.missing))]
pub struct ValidationError {
    pub missing: Vec<FormField>,
}

fn join_fields(fields: &[FormField]) -> String {
    fields
        .iter()
        .map(FormField::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationError {
    /// Message shown to the user.
    pub fn user_message(&self) -> &'static str {
        "Preencha todos os campos obrigatórios"
    }
}

/// Raw form input, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketInput {
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub description: String,
}

impl TicketInput {
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

    fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::ClientName => &mut self.client_name,
            FormField::Address => &mut self.address,
            FormField::Description => &mut self.description,
        }
    }
}

impl From<&Ticket> for TicketInput {
    fn from(ticket: &Ticket) -> Self {
        Self::new(&ticket.client_name, &ticket.address, &ticket.description)
    }
}

/// Validate and trim form input. Whitespace-only counts as empty.
pub fn validate(input: &TicketInput) -> Result<NewTicket, ValidationError> {
    let client_name = input.client_name.trim();
    let address = input.address.trim();
    let description = input.description.trim();

    let missing: Vec<FormField> = [
        (FormField::ClientName, client_name),
        (FormField::Address, address),
        (FormField::Description, description),
    ]
    .into_iter()
    .filter(|(_, value)| value.is_empty())
    .map(|(field, _)| field)
    .collect();

    if !missing.is_empty() {
        return Err(ValidationError { missing });
    }

    Ok(NewTicket::new(client_name, address, description))
}

/// Validate the text fields present in a partial update.
pub fn validate_patch(patch: TicketPatch) -> Result<TicketPatch, ValidationError> {
    let mut missing = Vec::new();
    let mut check = |field: FormField, value: Option<String>| {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                missing.push(field);
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    };

    let validated = TicketPatch {
        client_name: check(FormField::ClientName, patch.client_name),
        address: check(FormField::Address, patch.address),
        description: check(FormField::Description, patch.description),
        status: patch.status,
    };

    if missing.is_empty() {
        Ok(validated)
    } else {
        Err(ValidationError { missing })
    }
}

/// Why a form submission did not go through.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Failed to save ticket")]
    Persistence,
}

/// Create/edit form state.
///
/// Opened either empty (create) or pre-filled from a ticket (edit). Changing
/// the target always resets the input, so values never leak between tickets.
#[derive(Debug, Clone, Default)]
pub struct TicketForm {
    target: Option<Ticket>,
    input: TicketInput,
}

impl TicketForm {
    /// Empty form for a new ticket.
    pub fn for_create() -> Self {
        Self::default()
    }

    /// Form pre-filled from `ticket`.
    pub fn for_edit(ticket: Ticket) -> Self {
        let mut form = Self::default();
        form.set_target(Some(ticket));
        form
    }

    /// Switch target and reset the input accordingly.
    pub fn set_target(&mut self, target: Option<Ticket>) {
        self.input = target.as_ref().map(TicketInput::from).unwrap_or_default();
        self.target = target;
    }

    pub fn target(&self) -> Option<&Ticket> {
        self.target.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.target.is_some()
    }

    pub fn input(&self) -> &TicketInput {
        &self.input
    }

    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        *self.input.field_mut(field) = value.into();
    }

    pub fn validate(&self) -> Result<NewTicket, ValidationError> {
        validate(&self.input)
    }

    /// Validate, then create or update through the service.
    ///
    /// Status is never touched here: edits only send the text fields.
    pub async fn submit(&self, service: &TicketService) -> Result<Ticket, SubmitError> {
        let fields = self.validate()?;

        let saved = match &self.target {
            Some(ticket) => service.update(&ticket.id, TicketPatch::from(fields)).await,
            None => service.create(fields).await,
        };

        saved.ok_or(SubmitError::Persistence)
    }
}
