use serde::{Deserialize, Serialize};

use super::model::Todo;

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateTodoRequest {
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RenameTodoRequest {
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SetCompletedRequest {
    pub completed: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TodoListResponse {
    pub results: usize,
    pub todos: Vec<Todo>,
}
