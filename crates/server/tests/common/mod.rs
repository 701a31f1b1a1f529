//! Common test utilities for API testing.
//!
//! This module provides a test fixture that builds the real router around an
//! in-memory ticket store, password authentication with one admin and one
//! viewer, and a recording notifier.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use chamados_core::{
    auth::hash_password,
    config::{
        AuthConfig, AuthMethod, Config, DatabaseConfig, LoggingConfig, ServerConfig, StoreConfig,
        UserConfig, DEFAULT_SESSION_TTL_SECS,
    },
    create_identity_provider,
    testing::{FailingTicketStore, RecordingNotifier},
    IdentityProvider, Role, TicketService,
};
use chamados_server::{create_router, AppState};

pub const ADMIN_EMAIL: &str = "admin@assistencia.com";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const VIEWER_EMAIL: &str = "recepcao@assistencia.com";
pub const VIEWER_PASSWORD: &str = "viewer123";

/// In-process server for API tests.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_ticket_creation() {
///     let fixture = TestFixture::new();
///     let token = fixture.admin_token().await;
///
///     let response = fixture.post("/api/v1/tickets", Some(&token), json!({
///         "client_name": "Ana", "address": "Rua 1", "description": "Forno"
///     })).await;
///
///     assert_eq!(response.status, 201);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Ticket store - can be switched into failure mode
    pub store: Arc<FailingTicketStore>,
    /// Every notification the server emitted
    pub notifier: Arc<RecordingNotifier>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

fn user(id: &str, name: &str, email: &str, role: Role, password: &str) -> UserConfig {
    UserConfig {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        role,
        password_sha256: hash_password(password),
    }
}

impl TestFixture {
    /// Fixture with password authentication.
    pub fn new() -> Self {
        Self::with_auth(AuthConfig {
            method: AuthMethod::Password,
            users: vec![
                user("1", "Administrador", ADMIN_EMAIL, Role::Admin, ADMIN_PASSWORD),
                user("2", "Recepção", VIEWER_EMAIL, Role::Viewer, VIEWER_PASSWORD),
            ],
            anonymous_role: Role::Viewer,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
        })
    }

    /// Fixture with the given auth configuration.
    pub fn with_auth(auth: AuthConfig) -> Self {
        let identity: Arc<dyn IdentityProvider> = Arc::from(
            create_identity_provider(&auth).expect("Failed to create identity provider"),
        );

        let config = Config {
            auth,
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            database: DatabaseConfig::default(),
            store: StoreConfig::default(),
            logging: LoggingConfig::default(),
        };

        let store = Arc::new(FailingTicketStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let tickets = TicketService::new(store.clone());

        let state = Arc::new(AppState::new(config, identity, tickets, notifier.clone()));
        let router = create_router(state);

        Self {
            router,
            store,
            notifier,
        }
    }

    /// Log in and return the raw response.
    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.post(
            "/api/v1/auth/login",
            None,
            json!({ "email": email, "password": password }),
        )
        .await
    }

    /// Session token for the admin user.
    pub async fn admin_token(&self) -> String {
        self.token(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    /// Session token for the viewer user.
    pub async fn viewer_token(&self) -> String {
        self.token(VIEWER_EMAIL, VIEWER_PASSWORD).await
    }

    async fn token(&self, email: &str, password: &str) -> String {
        let response = self.login(email, password).await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);
        response.body["token"]
            .as_str()
            .expect("token in login response")
            .to_string()
    }

    /// Create a ticket as admin and return its JSON.
    pub async fn create_ticket(&self, token: &str, client: &str) -> Value {
        let response = self
            .post(
                "/api/v1/tickets",
                Some(token),
                json!({
                    "client_name": client,
                    "address": format!("Rua {}, 100", client),
                    "description": format!("Equipamento de {} com defeito", client),
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str, token: Option<&str>) -> TestResponse {
        self.request("GET", path, token, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request("POST", path, token, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str, token: Option<&str>) -> TestResponse {
        self.request("POST", path, token, None).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request("PUT", path, token, Some(body)).await
    }

    /// Send a PATCH request with JSON body.
    pub async fn patch(&self, path: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request("PATCH", path, token, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str, token: Option<&str>) -> TestResponse {
        self.request("DELETE", path, token, None).await
    }

    /// Send a request and collect the body as text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        (status, String::from_utf8_lossy(&body_bytes).to_string())
    }

    /// Send a request to the test server.
    async fn request(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        if let Some(token) = token {
            request_builder = request_builder.header("Authorization", format!("Bearer {}", token));
        }

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
