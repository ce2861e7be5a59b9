pub mod cache;
mod dto;
pub mod handlers;
pub mod model;
pub mod postgres;
pub mod rest;
pub mod service;
pub mod store;

use crate::state::AppState;
use axum::Router;

pub use dto::{CreateTodoRequest, RenameTodoRequest, SetCompletedRequest, TodoListResponse};

pub fn router() -> Router<AppState> {
    handlers::todo_routes()
}
