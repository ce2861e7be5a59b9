use async_trait::async_trait;
use thiserror::Error;

use super::model::{Owner, Todo};

#[derive(Debug, Error)]
pub enum StoreError {
    /// The data API answered with an error payload.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("data store unavailable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Row access to the `todos` table. Every method matches on both the todo id
/// and `owner.id`; a row owned by someone else behaves as if it did not
/// exist.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// All of the owner's todos, in whatever order the store returns them.
    async fn list(&self, owner: &Owner) -> Result<Vec<Todo>, StoreError>;
    /// Insert with `completed = false`.
    async fn insert(&self, owner: &Owner, name: &str) -> Result<Todo, StoreError>;
    async fn update_completed(
        &self,
        owner: &Owner,
        id: i64,
        completed: bool,
    ) -> Result<Option<Todo>, StoreError>;
    async fn update_name(&self, owner: &Owner, id: i64, name: &str)
        -> Result<Option<Todo>, StoreError>;
    /// Number of rows removed.
    async fn delete(&self, owner: &Owner, id: i64) -> Result<u64, StoreError>;
}
