use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::ApiResponse;
use crate::controller::{DetailSnapshot, MastersSnapshot};
use crate::errors::AppError;
use crate::presenter::{SortDirection, SortKey, SortState};
use crate::session::Route;
use crate::AppState;

#[derive(Deserialize)]
pub struct SortQuery {
    pub sort: Option<String>,
    pub dir: Option<String>,
}

fn parse_key(raw: &str) -> Result<SortKey, AppError> {
    SortKey::from_api_str(raw).ok_or_else(|| AppError::BadRequest(format!("unsortable column: {raw}")))
}

/// Masters page. `?sort=&dir=` pins the sort state before rendering.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<SortQuery>,
) -> Result<Json<ApiResponse<MastersSnapshot>>, AppError> {
    if let Some(raw) = query.sort.as_deref() {
        let direction = match query.dir.as_deref() {
            Some(d) => SortDirection::from_api_str(d)
                .ok_or_else(|| AppError::BadRequest(format!("invalid direction: {d}")))?,
            None => SortDirection::Desc,
        };
        let sort = if raw.is_empty() {
            SortState::unsorted()
        } else {
            SortState {
                key: Some(parse_key(raw)?),
                direction,
            }
        };
        state.masters.set_sort(sort).await?;
    }

    Ok(Json(ApiResponse::ok(state.masters.view().await?)))
}

pub async fn refresh(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<MastersSnapshot>>, AppError> {
    Ok(Json(ApiResponse::ok(state.masters.refresh().await?)))
}

#[derive(Deserialize)]
pub struct SortRequest {
    pub key: String,
}

/// Column header click: same column flips, new column sorts descending.
pub async fn sort(
    State(state): State<AppState>,
    Json(body): Json<SortRequest>,
) -> Result<Json<ApiResponse<MastersSnapshot>>, AppError> {
    let key = parse_key(&body.key)?;
    Ok(Json(ApiResponse::ok(state.masters.toggle_sort(key).await?)))
}

#[derive(Deserialize, Default)]
pub struct AnalyzeRequest {
    pub address: Option<String>,
}

pub async fn analyze(
    State(state): State<AppState>,
    body: Option<Json<AnalyzeRequest>>,
) -> Result<Json<ApiResponse<MastersSnapshot>>, AppError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let snapshot = state.masters.start_analysis(body.address.as_deref()).await?;
    Ok(Json(ApiResponse::ok(snapshot)))
}

#[derive(Deserialize)]
pub struct SearchRequest {
    pub address: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Redirect {
    pub redirect: Route,
    pub path: String,
}

pub async fn search(
    State(state): State<AppState>,
    Json(body): Json<SearchRequest>,
) -> Result<Json<ApiResponse<Redirect>>, AppError> {
    let route = state.masters.search(&body.address).await?;
    Ok(Json(ApiResponse::ok(Redirect {
        path: route.path(),
        redirect: route,
    })))
}

pub async fn detail(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<ApiResponse<DetailSnapshot>>, AppError> {
    Ok(Json(ApiResponse::ok(state.detail.view(&address).await?)))
}

pub async fn detail_refresh(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<ApiResponse<DetailSnapshot>>, AppError> {
    Ok(Json(ApiResponse::ok(state.detail.load(&address).await?)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<ApiResponse<DetailSnapshot>>, AppError> {
    Ok(Json(ApiResponse::ok(state.detail.update(&address).await?)))
}
