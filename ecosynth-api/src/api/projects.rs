//! Environmental project endpoints

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};

use crate::models::{Project, ProjectDraft};
use crate::{ApiResult, AppState};

/// POST /api/projects
pub async fn create_project(
    State(state): State<AppState>,
    Json(draft): Json<ProjectDraft>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let project = state.projects.create(draft).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/projects: active projects, newest first
pub async fn list_projects(State(state): State<AppState>) -> ApiResult<Json<Vec<Project>>> {
    Ok(Json(state.projects.list_active().await?))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/projects", get(list_projects).post(create_project))
}
