// HTTP handlers for tasks
// Every operation is implicitly scoped to the authenticated owner; a task
// belonging to someone else behaves exactly like a task that does not exist.

use crate::auth::middleware::AuthenticatedUser;
use crate::error::ApiError;
use crate::query::{TaskQueryBuilder, TaskQueryParams, TaskQueryValidator};
use crate::tasks::models::{CreateTask, Task, UpdateTask};
use crate::validation::normalize;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use validator::Validate;

const TASK_COLUMNS: &str = "id, description, completed, owner_id, created_at, updated_at";

/// Create a task owned by the requester
/// POST /tasks
#[utoipa::path(
    post,
    path = "/tasks",
    request_body = CreateTask,
    responses(
        (status = 201, description = "Task created", body = Task),
        (status = 400, description = "Validation failure"),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer" = [])),
    tag = "tasks"
)]
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let request: CreateTask = serde_json::from_value(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid task payload: {}", e)))?;
    request.validate()?;

    let task = sqlx::query_as::<_, Task>(&format!(
        "INSERT INTO tasks (description, completed, owner_id)
         VALUES ($1, $2, $3)
         RETURNING {TASK_COLUMNS}"
    ))
    .bind(normalize(&request.description))
    .bind(request.completed.unwrap_or(false))
    .bind(auth.user.id)
    .fetch_one(&state.db)
    .await?;

    tracing::debug!("User {} created task {}", auth.user.id, task.id);
    Ok((StatusCode::CREATED, Json(task)))
}

/// List the requester's tasks
/// GET /tasks?completed=true&sortBy=createdAt:desc&limit=10&skip=0
#[utoipa::path(
    get,
    path = "/tasks",
    params(
        ("completed" = Option<bool>, Query, description = "Filter by completion state"),
        ("sortBy" = Option<String>, Query, description = "Sort key, field:asc or field:desc"),
        ("limit" = Option<u32>, Query, description = "Maximum number of tasks returned"),
        ("skip" = Option<u32>, Query, description = "Number of tasks skipped")
    ),
    responses(
        (status = 200, description = "Tasks owned by the requester", body = Vec<Task>),
        (status = 400, description = "Invalid query parameters"),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer" = [])),
    tag = "tasks"
)]
pub async fn list_tasks(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Query(params): Query<TaskQueryParams>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let validated =
        TaskQueryValidator::validate(params).map_err(|e| ApiError::BadRequest(e.message))?;

    let mut builder = TaskQueryBuilder::new();
    if validated.completed.is_some() {
        builder.add_completed_filter();
    }
    if let Some((field, order)) = validated.sort {
        builder.set_sort(field, order);
    }
    builder.set_pagination(validated.limit, validated.skip);
    let sql = builder.build();

    let mut query = sqlx::query_as::<_, Task>(&sql).bind(auth.user.id);
    if let Some(completed) = validated.completed {
        query = query.bind(completed);
    }

    let tasks = query.fetch_all(&state.db).await?;

    tracing::debug!("User {} listed {} tasks", auth.user.id, tasks.len());
    Ok(Json(tasks))
}

/// Fetch one of the requester's tasks by id
/// GET /tasks/:id
#[utoipa::path(
    get,
    path = "/tasks/{id}",
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task found", body = Task),
        (status = 404, description = "No such task owned by the requester"),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer" = [])),
    tag = "tasks"
)]
pub async fn get_task(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<Task>, ApiError> {
    let task = sqlx::query_as::<_, Task>(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND owner_id = $2"
    ))
    .bind(id)
    .bind(auth.user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::NotFound {
        resource: "Task".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(task))
}

/// Update one of the requester's tasks
/// PATCH /tasks/:id
///
/// Accepts only {description, completed}; anything else rejects the whole
/// update before any row is touched.
#[utoipa::path(
    patch,
    path = "/tasks/{id}",
    params(("id" = i32, Path, description = "Task ID")),
    request_body = UpdateTask,
    responses(
        (status = 200, description = "Updated task", body = Task),
        (status = 400, description = "Invalid field set or validation failure"),
        (status = 404, description = "No such task owned by the requester"),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer" = [])),
    tag = "tasks"
)]
pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i32>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let Json(body) = body.map_err(|_| ApiError::BadRequest("Invalid updates!".to_string()))?;
    let request: UpdateTask = serde_json::from_value(body)
        .map_err(|_| ApiError::BadRequest("Invalid updates!".to_string()))?;
    request.validate()?;

    let existing = sqlx::query_as::<_, Task>(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND owner_id = $2"
    ))
    .bind(id)
    .bind(auth.user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::NotFound {
        resource: "Task".to_string(),
        id: id.to_string(),
    })?;

    let updated = sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks SET description = $1, completed = $2
         WHERE id = $3 AND owner_id = $4
         RETURNING {TASK_COLUMNS}"
    ))
    .bind(
        request
            .description
            .map(|d| normalize(&d))
            .unwrap_or(existing.description),
    )
    .bind(request.completed.unwrap_or(existing.completed))
    .bind(id)
    .bind(auth.user.id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(updated))
}

/// Delete one of the requester's tasks
/// DELETE /tasks/:id
#[utoipa::path(
    delete,
    path = "/tasks/{id}",
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Deleted task", body = Task),
        (status = 404, description = "No such task owned by the requester"),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer" = [])),
    tag = "tasks"
)]
pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<Task>, ApiError> {
    let task = sqlx::query_as::<_, Task>(&format!(
        "DELETE FROM tasks WHERE id = $1 AND owner_id = $2 RETURNING {TASK_COLUMNS}"
    ))
    .bind(id)
    .bind(auth.user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::NotFound {
        resource: "Task".to_string(),
        id: id.to_string(),
    })?;

    tracing::debug!("User {} deleted task {}", auth.user.id, id);
    Ok(Json(task))
}
