use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{CreateTodoRequest, RenameTodoRequest, SetCompletedRequest, TodoListResponse},
    model::{Owner, Todo},
    service,
};
use crate::{auth::jwt::AuthUser, error::AppError, state::AppState};

pub fn todo_routes() -> Router<AppState> {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/:id", axum::routing::delete(delete_todo))
        .route("/todos/:id/completed", patch(set_completed))
        .route("/todos/:id/name", patch(rename_todo))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn list_todos(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<TodoListResponse>, AppError> {
    let todos = service::list(state.todos.as_ref(), &Owner::from(user)).await?;
    Ok(Json(TodoListResponse {
        results: todos.len(),
        todos,
    }))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create_todo(
    State(state): State<AppState>,
    user: AuthUser,
    body: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), AppError> {
    let Json(body) = body?;
    let todo = service::create(state.todos.as_ref(), &Owner::from(user), &body.name).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn set_completed(
    State(state): State<AppState>,
    user: AuthUser,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<SetCompletedRequest>, JsonRejection>,
) -> Result<Json<Todo>, AppError> {
    let Path(id) = id?;
    let Json(body) = body?;
    let todo =
        service::set_completed(state.todos.as_ref(), &Owner::from(user), id, body.completed)
            .await?;
    Ok(Json(todo))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn rename_todo(
    State(state): State<AppState>,
    user: AuthUser,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<RenameTodoRequest>, JsonRejection>,
) -> Result<Json<Todo>, AppError> {
    let Path(id) = id?;
    let Json(body) = body?;
    let todo = service::rename(state.todos.as_ref(), &Owner::from(user), id, &body.name).await?;
    Ok(Json(todo))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn delete_todo(
    State(state): State<AppState>,
    user: AuthUser,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    service::remove(state.todos.as_ref(), &Owner::from(user), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
