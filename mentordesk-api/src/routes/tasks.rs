/// Task endpoints
///
/// Thin adapters over the lifecycle engine: each handler hands the raw
/// bearer token and request input to the engine, which decides authorization
/// before anything else. Handlers never inspect or mutate task state
/// themselves.
///
/// # Endpoints
///
/// - `POST /v1/tasks` - Create a task (starts open)
/// - `GET /v1/tasks` - List tasks (`?include_closed=true` to include closed)
/// - `PATCH /v1/tasks/:id` - Edit fields and/or change status
/// - `DELETE /v1/tasks/:id` - Soft-close, or `?hard=true` to remove the record
/// - `PUT /v1/tasks/:id/reopen` - Reopen a completed task

use crate::{
    app::{AppState, BearerToken},
    error::ApiResult,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mentordesk_shared::lifecycle::TaskDraft;
use mentordesk_shared::models::task::{Task, TaskPatch};
use serde::Deserialize;
use uuid::Uuid;

/// Query parameters for task listing
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Include soft-closed tasks in the listing
    #[serde(default)]
    pub include_closed: bool,
}

/// Query parameters for task deletion
#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    /// Permanently remove the record instead of soft-closing it
    #[serde(default)]
    pub hard: bool,
}

/// Create a task
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid token
/// - `422 Unprocessable Entity`: Empty title
pub async fn create_task(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Json(draft): Json<TaskDraft>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let task = state.engine.create(&token, draft).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// List tasks
///
/// Closed tasks are excluded unless `include_closed=true`; completed tasks
/// always appear.
pub async fn list_tasks(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = state.engine.list(&token, params.include_closed).await?;
    Ok(Json(tasks))
}

/// Edit task fields and/or change its status
///
/// A status-carrying patch must be a legal transition from the task's
/// current status; an illegal one is `400 Bad Request`.
pub async fn update_task(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(id): Path<Uuid>,
    Json(patch): Json<TaskPatch>,
) -> ApiResult<Json<Task>> {
    let task = state.engine.update(&token, id, patch).await?;
    Ok(Json(task))
}

/// Close or delete a task
///
/// Default is a soft close: the record survives with closed status and the
/// response carries it. With `?hard=true` the record is removed and the
/// response is `204 No Content`.
pub async fn delete_task(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(id): Path<Uuid>,
    Query(params): Query<DeleteParams>,
) -> ApiResult<Response> {
    if params.hard {
        state.engine.hard_delete(&token, id).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        let task = state.engine.soft_close(&token, id).await?;
        Ok(Json(task).into_response())
    }
}

/// Reopen a completed task
///
/// Only valid from completed status; reopening an open task is `400`, a
/// missing task is `404`.
pub async fn reopen_task(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    let task = state.engine.reopen(&token, id).await?;
    Ok(Json(task))
}
