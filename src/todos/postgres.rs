use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use super::{
    model::{Owner, Todo},
    store::{StoreError, TodoStore},
};

// Every statement projects the columns `Todo` reads and filters on `uid`.
const LIST_SQL: &str = "SELECT id, name, completed, uid FROM todos WHERE uid = $1 ORDER BY id";
const INSERT_SQL: &str = r#"
    INSERT INTO todos (name, completed, uid)
    VALUES ($1, FALSE, $2)
    RETURNING id, name, completed, uid
"#;
const SET_COMPLETED_SQL: &str = r#"
    UPDATE todos
       SET completed = $1
     WHERE id = $2 AND uid = $3
    RETURNING id, name, completed, uid
"#;
const SET_NAME_SQL: &str = r#"
    UPDATE todos
       SET name = $1
     WHERE id = $2 AND uid = $3
    RETURNING id, name, completed, uid
"#;
const DELETE_SQL: &str = "DELETE FROM todos WHERE id = $1 AND uid = $2";

/// [`TodoStore`] talking to the backing Postgres database directly.
#[derive(Clone)]
pub struct PgTodoStore {
    db: PgPool,
}

impl PgTodoStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TodoStore for PgTodoStore {
    #[instrument(skip_all, fields(user_id = %owner.id))]
    async fn list(&self, owner: &Owner) -> Result<Vec<Todo>, StoreError> {
        let rows = sqlx::query_as::<_, Todo>(LIST_SQL)
            .bind(owner.id)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }

    #[instrument(skip_all, fields(user_id = %owner.id))]
    async fn insert(&self, owner: &Owner, name: &str) -> Result<Todo, StoreError> {
        let todo = sqlx::query_as::<_, Todo>(INSERT_SQL)
            .bind(name)
            .bind(owner.id)
            .fetch_one(&self.db)
            .await?;
        Ok(todo)
    }

    #[instrument(skip_all, fields(user_id = %owner.id, todo_id = id))]
    async fn update_completed(
        &self,
        owner: &Owner,
        id: i64,
        completed: bool,
    ) -> Result<Option<Todo>, StoreError> {
        let todo = sqlx::query_as::<_, Todo>(SET_COMPLETED_SQL)
            .bind(completed)
            .bind(id)
            .bind(owner.id)
            .fetch_optional(&self.db)
            .await?;
        Ok(todo)
    }

    #[instrument(skip_all, fields(user_id = %owner.id, todo_id = id))]
    async fn update_name(
        &self,
        owner: &Owner,
        id: i64,
        name: &str,
    ) -> Result<Option<Todo>, StoreError> {
        let todo = sqlx::query_as::<_, Todo>(SET_NAME_SQL)
            .bind(name)
            .bind(id)
            .bind(owner.id)
            .fetch_optional(&self.db)
            .await?;
        Ok(todo)
    }

    #[instrument(skip_all, fields(user_id = %owner.id, todo_id = id))]
    async fn delete(&self, owner: &Owner, id: i64) -> Result<u64, StoreError> {
        let done = sqlx::query(DELETE_SQL)
            .bind(id)
            .bind(owner.id)
            .execute(&self.db)
            .await?;
        Ok(done.rows_affected())
    }
}
