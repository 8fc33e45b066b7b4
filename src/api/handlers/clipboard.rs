use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::ApiResponse;
use crate::errors::AppError;
use crate::presenter::copy_to_clipboard;
use crate::AppState;

#[derive(Deserialize)]
pub struct CopyRequest {
    pub text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyResult {
    pub copied: bool,
    pub indicator_ms: u64,
}

/// Copy an address or hash. A clipboard failure is not an error for the
/// caller; it just reports `copied: false`.
pub async fn copy(
    State(state): State<AppState>,
    Json(body): Json<CopyRequest>,
) -> Result<Json<ApiResponse<CopyResult>>, AppError> {
    if body.text.is_empty() {
        return Err(AppError::BadRequest("text is required".into()));
    }

    let copied = copy_to_clipboard(state.clipboard.as_ref(), &state.copies, &body.text).await;
    Ok(Json(ApiResponse::ok(CopyResult {
        copied,
        indicator_ms: state.config.copy_indicator_ms,
    })))
}
