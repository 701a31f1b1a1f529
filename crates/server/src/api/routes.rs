use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use super::middleware::{auth_middleware, metrics_middleware};
use super::{auth, handlers, tickets};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Dashboard static files path (configurable via env)
    let dashboard_dir =
        std::env::var("DASHBOARD_DIR").unwrap_or_else(|_| "dashboard/dist".to_string());

    // Routes that need a session
    let protected_routes = Router::new()
        .route("/config", get(handlers::get_config))
        .route("/statuses", get(handlers::list_statuses))
        // Session
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        // Tickets
        .route(
            "/tickets",
            get(tickets::list_tickets).post(tickets::create_ticket),
        )
        .route(
            "/tickets/{id}",
            get(tickets::get_ticket)
                .patch(tickets::update_ticket)
                .delete(tickets::delete_ticket),
        )
        .route("/tickets/{id}/advance", post(tickets::advance_ticket))
        .route("/tickets/{id}/status", put(tickets::set_status))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // API routes
    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/login", post(auth::login))
        .merge(protected_routes)
        .with_state(state.clone());

    // Serve dashboard with SPA fallback
    let index_path = format!("{}/index.html", dashboard_dir);
    let serve_dir = ServeDir::new(&dashboard_dir).fallback(ServeFile::new(&index_path));

    Router::new()
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .nest("/api/v1", api_routes)
        .fallback_service(serve_dir)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}
