//! Authentication and metrics middleware for API routes.

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::future::Future;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use chamados_core::{AuthError, AuthRequest, Identity, Role};

use super::error::ApiError;
use crate::metrics::{
    normalize_path, AUTH_FAILURES_TOTAL, HTTP_REQUESTS_IN_FLIGHT, HTTP_REQUESTS_TOTAL,
    HTTP_REQUEST_DURATION, TICKET_MUTATIONS_TOTAL,
};
use crate::state::AppState;

/// Metrics middleware that tracks HTTP request duration and counts.
///
/// This middleware records:
/// - Request duration (histogram)
/// - Request count (counter)
/// - Requests in flight (gauge)
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = normalize_path(request.uri().path());

    HTTP_REQUESTS_IN_FLIGHT.inc();

    let response = next.run(request).await;

    HTTP_REQUESTS_IN_FLIGHT.dec();

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    HTTP_REQUEST_DURATION
        .with_label_values(&[&method, &path, &status])
        .observe(duration);
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();

    response
}

/// Build an [`AuthRequest`] from request headers.
pub fn auth_request(headers: &HeaderMap, source_ip: IpAddr) -> AuthRequest {
    let headers: HashMap<String, String> = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_lowercase(), v.to_string()))
        })
        .collect();

    AuthRequest { headers, source_ip }
}

/// Authentication middleware that validates requests using the configured
/// identity provider.
///
/// On success the caller's [`Identity`] is stored in the request extensions
/// for [`CurrentUser`]. Missing or unknown session tokens get a 401.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    // Source IP defaults to localhost when the server runs without connect info
    let source_ip = request
        .extensions()
        .get::<SocketAddr>()
        .map(|addr| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));

    let auth_request = auth_request(request.headers(), source_ip);

    match state.identity().authenticate(&auth_request).await {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            Ok(next.run(request).await)
        }
        Err(err) => {
            let reason = match err {
                AuthError::NotAuthenticated => "not_authenticated",
                AuthError::InvalidCredentials(_) => "invalid_credentials",
                _ => "internal_error",
            };
            AUTH_FAILURES_TOTAL.with_label_values(&[reason]).inc();
            debug!(reason, %source_ip, "Request rejected by auth middleware");
            Err(err.into())
        }
    }
}

/// Extractor for the authenticated identity.
///
/// Rejects with 401 if the auth middleware did not run for this route.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let identity = parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| ApiError::from(AuthError::NotAuthenticated));
        std::future::ready(identity)
    }
}

impl CurrentUser {
    /// Fail with 403 unless `allowed(role)` holds.
    pub fn require(
        &self,
        action: &'static str,
        allowed: fn(&Role) -> bool,
    ) -> Result<(), ApiError> {
        if allowed(&self.0.role) {
            return Ok(());
        }
        TICKET_MUTATIONS_TOTAL
            .with_label_values(&[action, "denied"])
            .inc();
        debug!(user_id = %self.0.id, role = self.0.role.as_str(), action, "Action denied");
        Err(AuthError::Forbidden(format!("{} tickets", action)).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{header, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use chamados_core::{
        auth::hash_password,
        config::{
            AuthConfig, AuthMethod, DatabaseConfig, LoggingConfig, ServerConfig, StoreConfig,
            UserConfig, DEFAULT_SESSION_TTL_SECS,
        },
        create_identity_provider, Config, IdentityProvider, SqliteTicketStore, TicketService,
        TracingNotifier,
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn whoami(CurrentUser(identity): CurrentUser) -> String {
        format!("{}:{}", identity.id, identity.role.as_str())
    }

    fn create_test_state(auth: AuthConfig) -> Arc<AppState> {
        let identity: Arc<dyn IdentityProvider> =
            Arc::from(create_identity_provider(&auth).unwrap());
        let config = Config {
            auth,
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            store: StoreConfig::default(),
            logging: LoggingConfig::default(),
        };
        let tickets = TicketService::new(Arc::new(SqliteTicketStore::in_memory().unwrap()));
        Arc::new(AppState::new(
            config,
            identity,
            tickets,
            Arc::new(TracingNotifier),
        ))
    }

    fn password_auth() -> AuthConfig {
        AuthConfig {
            method: AuthMethod::Password,
            users: vec![UserConfig {
                id: "u1".to_string(),
                name: "Admin".to_string(),
                email: "admin@example.com".to_string(),
                role: Role::Admin,
                password_sha256: hash_password("secret"),
            }],
            anonymous_role: Role::Viewer,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
        }
    }

    fn app(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/test", get(whoami))
            .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
            .with_state(state)
    }

    async fn body_string(response: Response) -> String {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_none_auth_uses_anonymous_role() {
        let state = create_test_state(AuthConfig {
            method: AuthMethod::None,
            users: vec![],
            anonymous_role: Role::Admin,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
        });

        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        let response = app(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "anonymous:admin");
    }

    #[tokio::test]
    async fn test_password_auth_valid_session() {
        let state = create_test_state(password_auth());
        let session = state
            .identity()
            .login("admin@example.com", "secret")
            .await
            .unwrap();

        let request = Request::builder()
            .uri("/test")
            .header(header::AUTHORIZATION, format!("Bearer {}", session.token))
            .body(Body::empty())
            .unwrap();
        let response = app(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "u1:admin");
    }

    #[tokio::test]
    async fn test_password_auth_missing_token() {
        let state = create_test_state(password_auth());

        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        let response = app(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_password_auth_unknown_token() {
        let state = create_test_state(password_auth());

        let request = Request::builder()
            .uri("/test")
            .header(header::AUTHORIZATION, "Bearer not-a-session")
            .body(Body::empty())
            .unwrap();
        let response = app(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body_string(response).await.contains("Session expired or invalid"));
    }

    #[tokio::test]
    async fn test_extractor_without_middleware_rejects() {
        let app: Router = Router::new().route("/test", get(whoami));

        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_require_capability() {
        let viewer = CurrentUser(Identity::anonymous(Role::Viewer));
        let admin = CurrentUser(Identity::anonymous(Role::Admin));

        assert!(viewer.require("view", Role::can_view).is_ok());
        assert!(matches!(
            viewer.require("delete", Role::can_delete),
            Err(ApiError::Forbidden(_))
        ));
        assert!(admin.require("delete", Role::can_delete).is_ok());
    }
}
