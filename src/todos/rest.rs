use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{
    model::{Owner, Todo},
    store::{StoreError, TodoStore},
};
use crate::supabase::{error_parts, SupabaseClient};

const TODOS: &str = "/rest/v1/todos";

/// [`TodoStore`] over the hosted REST data API. Requests carry the caller's
/// access token, so the table's row-level policies apply on top of the
/// explicit `uid` filter.
#[derive(Clone)]
pub struct RestTodoStore {
    client: SupabaseClient,
}

#[derive(Serialize)]
struct NewTodo<'a> {
    name: &'a str,
    completed: bool,
    uid: Uuid,
}

#[derive(Serialize)]
struct CompletedPatch {
    completed: bool,
}

#[derive(Serialize)]
struct NamePatch<'a> {
    name: &'a str,
}

impl RestTodoStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    fn request(&self, method: Method, owner: &Owner) -> RequestBuilder {
        self.client
            .request(method, TODOS, Some(&owner.access_token))
            .query(&[("uid", format!("eq.{}", owner.id))])
    }

    fn scoped(&self, method: Method, owner: &Owner, id: i64) -> RequestBuilder {
        self.request(method, owner)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
    }
}

async fn rows(response: Response) -> Result<Vec<Todo>, StoreError> {
    if !response.status().is_success() {
        let (status, message) = error_parts(response).await;
        debug!(status, %message, "data api rejected request");
        return Err(StoreError::Rejected { status, message });
    }
    Ok(response.json::<Vec<Todo>>().await?)
}

#[async_trait]
impl TodoStore for RestTodoStore {
    #[instrument(skip_all, fields(user_id = %owner.id))]
    async fn list(&self, owner: &Owner) -> Result<Vec<Todo>, StoreError> {
        let response = self
            .request(Method::GET, owner)
            .query(&[("select", "*")])
            .send()
            .await?;
        rows(response).await
    }

    #[instrument(skip_all, fields(user_id = %owner.id))]
    async fn insert(&self, owner: &Owner, name: &str) -> Result<Todo, StoreError> {
        let response = self
            .client
            .request(Method::POST, TODOS, Some(&owner.access_token))
            .header("Prefer", "return=representation")
            .json(&[NewTodo {
                name,
                completed: false,
                uid: owner.id,
            }])
            .send()
            .await?;
        rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Rejected {
                status: 500,
                message: "insert returned no row".into(),
            })
    }

    #[instrument(skip_all, fields(user_id = %owner.id, todo_id = id))]
    async fn update_completed(
        &self,
        owner: &Owner,
        id: i64,
        completed: bool,
    ) -> Result<Option<Todo>, StoreError> {
        let response = self
            .scoped(Method::PATCH, owner, id)
            .json(&CompletedPatch { completed })
            .send()
            .await?;
        Ok(rows(response).await?.into_iter().next())
    }

    #[instrument(skip_all, fields(user_id = %owner.id, todo_id = id))]
    async fn update_name(
        &self,
        owner: &Owner,
        id: i64,
        name: &str,
    ) -> Result<Option<Todo>, StoreError> {
        let response = self
            .scoped(Method::PATCH, owner, id)
            .json(&NamePatch { name })
            .send()
            .await?;
        Ok(rows(response).await?.into_iter().next())
    }

    #[instrument(skip_all, fields(user_id = %owner.id, todo_id = id))]
    async fn delete(&self, owner: &Owner, id: i64) -> Result<u64, StoreError> {
        let response = self.scoped(Method::DELETE, owner, id).send().await?;
        Ok(rows(response).await?.len() as u64)
    }
}
