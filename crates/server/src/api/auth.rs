//! Login, logout and current-user endpoints.

use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use tracing::info;

use chamados_core::{auth::Capabilities, AuthError, Identity, Notification};

use super::error::ApiError;
use super::middleware::{auth_request, CurrentUser};
use crate::metrics::AUTH_FAILURES_TOTAL;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: Identity,
    pub capabilities: Capabilities,
}

impl From<Identity> for UserResponse {
    fn from(user: Identity) -> Self {
        let capabilities = user.role.capabilities();
        Self { user, capabilities }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(flatten)]
    pub user: UserResponse,
}

/// Exchange email and password for a session token.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginBody>,
) -> Result<Json<LoginResponse>, ApiError> {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(ApiError::BadRequest("Preencha todos os campos".to_string()));
    }

    match state.identity().login(&body.email, &body.password).await {
        Ok(session) => {
            state
                .notifier()
                .notify(Notification::success("Login realizado com sucesso"));
            Ok(Json(LoginResponse {
                token: session.token,
                user: session.identity.into(),
            }))
        }
        Err(err) => {
            if matches!(err, AuthError::InvalidCredentials(_)) {
                AUTH_FAILURES_TOTAL
                    .with_label_values(&["invalid_credentials"])
                    .inc();
            }
            Err(err.into())
        }
    }
}

/// End the caller's session.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    headers: HeaderMap,
) -> StatusCode {
    let request = auth_request(&headers, IpAddr::V4(Ipv4Addr::LOCALHOST));
    if let Some(token) = request.bearer_token() {
        state.identity().logout(token).await;
    }
    info!(user_id = %identity.id, "Logout requested");
    StatusCode::NO_CONTENT
}

/// The caller's identity and what it may do.
pub async fn me(CurrentUser(identity): CurrentUser) -> Json<UserResponse> {
    Json(identity.into())
}
