use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::ApiResponse;
use crate::errors::AppError;
use crate::session::{Credentials, Route, User};
use crate::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub authenticated: bool,
    pub user: Option<User>,
    /// Where the landing page sends this visitor.
    pub redirect: Route,
}

fn session_view(state: &AppState) -> SessionView {
    SessionView {
        authenticated: state.session.is_authenticated(),
        user: state.session.current_user(),
        redirect: state.session.resolve(Route::Landing),
    }
}

pub async fn current(State(state): State<AppState>) -> Json<ApiResponse<SessionView>> {
    Json(ApiResponse::ok(session_view(&state)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    state.session.login(credentials).await?;
    Ok(Json(ApiResponse::ok(session_view(&state))))
}

pub async fn login_with_google(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    state.session.login_with_google().await?;
    Ok(Json(ApiResponse::ok(session_view(&state))))
}

#[derive(Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    let credentials = Credentials {
        email: body.email,
        password: body.password,
    };
    state.session.signup(credentials, &body.name).await?;
    Ok(Json(ApiResponse::ok(session_view(&state))))
}

pub async fn logout(State(state): State<AppState>) -> Json<ApiResponse<SessionView>> {
    state.session.logout();
    Json(ApiResponse::ok(session_view(&state)))
}

#[derive(Deserialize)]
pub struct ResolveQuery {
    pub path: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolved {
    pub route: Route,
    pub path: String,
}

/// Apply the session gate to a client-side path.
pub async fn resolve(
    State(state): State<AppState>,
    Query(query): Query<ResolveQuery>,
) -> Result<Json<ApiResponse<Resolved>>, AppError> {
    let requested = Route::from_path(&query.path)
        .ok_or_else(|| AppError::NotFound(format!("no route for {}", query.path)))?;
    let route = state.session.resolve(requested);
    Ok(Json(ApiResponse::ok(Resolved {
        path: route.path(),
        route,
    })))
}
