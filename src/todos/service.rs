//! The todo operations offered to the HTTP layer: validate, make exactly one
//! store call, hand back the stored record.

use tracing::{debug, info};

use super::{
    model::{Owner, Todo},
    store::TodoStore,
};
use crate::{error::AppError, validation::TodoName};

pub async fn list(store: &dyn TodoStore, owner: &Owner) -> Result<Vec<Todo>, AppError> {
    let todos = store.list(owner).await?;
    debug!(user_id = %owner.id, count = todos.len(), "todos listed");
    Ok(todos)
}

pub async fn create(store: &dyn TodoStore, owner: &Owner, name: &str) -> Result<Todo, AppError> {
    let name = TodoName::parse(name)?;
    let todo = store.insert(owner, name.as_str()).await?;
    info!(user_id = %owner.id, todo_id = todo.id, "todo created");
    Ok(todo)
}

/// A todo the caller does not own is reported as missing.
pub async fn set_completed(
    store: &dyn TodoStore,
    owner: &Owner,
    id: i64,
    completed: bool,
) -> Result<Todo, AppError> {
    store
        .update_completed(owner, id, completed)
        .await?
        .ok_or(AppError::TodoNotFound(id))
}

pub async fn rename(
    store: &dyn TodoStore,
    owner: &Owner,
    id: i64,
    new_name: &str,
) -> Result<Todo, AppError> {
    let name = TodoName::parse(new_name)?;
    store
        .update_name(owner, id, name.as_str())
        .await?
        .ok_or(AppError::TodoNotFound(id))
}

/// Deleting an id that matches nothing is not an error.
pub async fn remove(store: &dyn TodoStore, owner: &Owner, id: i64) -> Result<(), AppError> {
    let removed = store.delete(owner, id).await?;
    if removed == 0 {
        debug!(user_id = %owner.id, todo_id = id, "delete matched no row");
    } else {
        info!(user_id = %owner.id, todo_id = id, "todo deleted");
    }
    Ok(())
}
