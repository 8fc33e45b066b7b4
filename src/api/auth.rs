use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::errors::AppError;
use crate::AppState;

/// Session-gating middleware.
///
/// Page routes are reachable only while a user is signed in; otherwise the
/// request is rejected with 401 and a redirect hint to the landing view.
pub async fn require_session(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if state.session.is_authenticated() {
        next.run(req).await
    } else {
        tracing::debug!(path = %req.uri().path(), "Rejected request without session");
        AppError::Unauthorized.into_response()
    }
}
