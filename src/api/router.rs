use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::auth::require_session;
use super::handlers;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Public routes: no session required
    let public = Router::new()
        .route("/health", get(handlers::ops::health_check))
        .route("/metrics", get(handlers::ops::metrics))
        .route("/api/session", get(handlers::session::current))
        .route("/api/session/login", post(handlers::session::login))
        .route("/api/session/google", post(handlers::session::login_with_google))
        .route("/api/session/signup", post(handlers::session::signup))
        .route("/api/session/logout", post(handlers::session::logout))
        .route("/api/routes/resolve", get(handlers::session::resolve));

    // Page routes: require a signed-in session
    let protected = Router::new()
        // Masters list
        .route("/api/masters", get(handlers::masters::list))
        .route("/api/masters/refresh", post(handlers::masters::refresh))
        .route("/api/masters/sort", post(handlers::masters::sort))
        .route("/api/masters/analyze", post(handlers::masters::analyze))
        .route("/api/masters/search", post(handlers::masters::search))
        // Master detail
        .route("/api/masters/:address", get(handlers::masters::detail))
        .route("/api/masters/:address/refresh", post(handlers::masters::detail_refresh))
        .route("/api/masters/:address/update", post(handlers::masters::update))
        // Clipboard
        .route("/api/clipboard", post(handlers::clipboard::copy))
        // WebSocket
        .route("/ws", get(handlers::ws::handler))
        .layer(middleware::from_fn_with_state(state.clone(), require_session));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
