use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::controller::PageError;
use crate::session::{AuthError, Route};

/// Failures a handler can hand back to the dashboard.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Signed-out callers are sent back to the landing view.
    fn redirect(&self) -> Option<Route> {
        matches!(self, AppError::Unauthorized).then_some(Route::Landing)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect: Option<Route>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error = match &self {
            AppError::NotFound(msg) | AppError::BadRequest(msg) => msg.clone(),
            AppError::Unauthorized => self.to_string(),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "Internal server error".to_string()
            }
        };

        let body = ErrorBody {
            success: false,
            error,
            redirect: self.redirect(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<PageError> for AppError {
    fn from(e: PageError) -> Self {
        match e {
            PageError::Unauthenticated => AppError::Unauthorized,
            PageError::MissingAddress => AppError::BadRequest(e.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        AppError::BadRequest(e.to_string())
    }
}
