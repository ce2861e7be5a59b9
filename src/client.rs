//! Typed HTTP client for the todo API, for UI code and scripts. Holds the
//! session token after sign-in and a [`TodoCache`] refreshed from every
//! successful response.

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::{
    auth::dto::{AuthResponse, PublicUser, RefreshRequest, RegisterResponse},
    supabase::error_message,
    todos::{
        cache::TodoCache, model::Todo, CreateTodoRequest, RenameTodoRequest,
        SetCompletedRequest, TodoListResponse,
    },
    validation::{SignInForm, SignUpForm, TodoName, ValidationError},
};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("not signed in")]
    NotSignedIn,

    #[error("todo {0} is not in the local list")]
    UnknownTodo(i64),
}

pub struct TodoClient {
    base_url: String,
    http: reqwest::Client,
    access_token: Option<String>,
    refresh_token: Option<String>,
    cache: TodoCache,
}

impl TodoClient {
    /// `base_url` includes the API prefix, e.g. `http://localhost:8080/api/v1`.
    pub fn new(base_url: &str) -> Self {
        Self::with_http(reqwest::Client::new(), base_url)
    }

    pub fn with_http(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            access_token: None,
            refresh_token: None,
            cache: TodoCache::new(),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn todos(&self) -> &[Todo] {
        self.cache.todos()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self.http.request(method, format!("{}{}", self.base_url, path));
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        if self.access_token.is_none() {
            return Err(ClientError::NotSignedIn);
        }
        Ok(self.request(method, path))
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ClientError> {
        let response = Self::check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Api {
            status: status.as_u16(),
            message: error_message(status.as_u16(), &body),
        })
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        Self::send(self.request(Method::POST, path).json(body)).await
    }

    fn remember(&mut self, auth: AuthResponse) -> PublicUser {
        self.access_token = Some(auth.access_token);
        self.refresh_token = Some(auth.refresh_token);
        auth.user
    }

    pub async fn sign_up(&self, form: &SignUpForm) -> Result<RegisterResponse, ClientError> {
        form.validate()?;
        self.post("/auth/register", form).await
    }

    /// Signing in drops whatever the cache held for a previous user.
    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<PublicUser, ClientError> {
        let form = SignInForm {
            email: email.into(),
            password: password.into(),
        };
        form.validate()?;
        let auth: AuthResponse = self.post("/auth/login", &form).await?;
        self.cache.clear();
        Ok(self.remember(auth))
    }

    pub async fn refresh_session(&mut self) -> Result<PublicUser, ClientError> {
        let body = RefreshRequest {
            refresh_token: Some(self.refresh_token.clone().ok_or(ClientError::NotSignedIn)?),
        };
        let auth: AuthResponse = self.post("/auth/refresh", &body).await?;
        Ok(self.remember(auth))
    }

    pub async fn sign_out(&mut self) -> Result<(), ClientError> {
        let request = self.authed(Method::POST, "/auth/logout")?;
        Self::check(request.send().await?).await?;
        self.access_token = None;
        self.refresh_token = None;
        self.cache.clear();
        Ok(())
    }

    pub async fn current_user(&self) -> Result<PublicUser, ClientError> {
        Self::send(self.authed(Method::GET, "/me")?).await
    }

    /// Re-fetch the whole list from the server.
    pub async fn reload(&mut self) -> Result<&[Todo], ClientError> {
        let list: TodoListResponse = Self::send(self.authed(Method::GET, "/todos")?).await?;
        self.cache.replace_all(list.todos);
        Ok(self.cache.todos())
    }

    pub async fn add(&mut self, name: &str) -> Result<Todo, ClientError> {
        let name = TodoName::parse(name)?;
        let request = self.authed(Method::POST, "/todos")?.json(&CreateTodoRequest {
            name: name.as_str().into(),
        });
        let todo: Todo = Self::send(request).await?;
        self.cache.upsert(todo.clone());
        Ok(todo)
    }

    pub async fn rename(&mut self, id: i64, name: &str) -> Result<Todo, ClientError> {
        let name = TodoName::parse(name)?;
        let request = self
            .authed(Method::PATCH, &format!("/todos/{id}/name"))?
            .json(&RenameTodoRequest {
                name: name.as_str().into(),
            });
        let todo: Todo = Self::send(request).await?;
        self.cache.upsert(todo.clone());
        Ok(todo)
    }

    pub async fn set_completed(&mut self, id: i64, completed: bool) -> Result<Todo, ClientError> {
        let request = self
            .authed(Method::PATCH, &format!("/todos/{id}/completed"))?
            .json(&SetCompletedRequest { completed });
        let todo: Todo = Self::send(request).await?;
        self.cache.upsert(todo.clone());
        Ok(todo)
    }

    /// Flip the completion flag of a cached todo.
    pub async fn toggle(&mut self, id: i64) -> Result<Todo, ClientError> {
        let completed = self
            .cache
            .get(id)
            .map(|t| t.completed)
            .ok_or(ClientError::UnknownTodo(id))?;
        self.set_completed(id, !completed).await
    }

    pub async fn remove(&mut self, id: i64) -> Result<(), ClientError> {
        let request = self.authed(Method::DELETE, &format!("/todos/{id}"))?;
        let response = request.send().await?;
        if response.status() != StatusCode::NO_CONTENT {
            Self::check(response).await?;
        }
        self.cache.evict(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        app::build_app,
        testing::{serve_mock, test_http, Fakes},
    };

    async fn client() -> (TodoClient, Fakes) {
        let fakes = Fakes::new();
        let base = serve_mock(build_app(fakes.state.clone())).await;
        (
            TodoClient::with_http(test_http(), &format!("{base}/api/v1")),
            fakes,
        )
    }

    fn sign_up_form(email: &str, password: &str) -> SignUpForm {
        SignUpForm {
            email: email.into(),
            password: password.into(),
            confirm_password: password.into(),
        }
    }

    #[tokio::test]
    async fn sign_up_confirms_by_email_and_opens_no_session() {
        let (client, fakes) = client().await;
        let res = client
            .sign_up(&sign_up_form("a@b.com", "secret1"))
            .await
            .unwrap();
        assert!(res.confirmation_required);
        assert!(!client.is_signed_in());
        assert_eq!(fakes.auth.calls(), 1);
    }

    #[tokio::test]
    async fn invalid_forms_never_reach_the_network() {
        let (mut client, fakes) = client().await;
        let err = client
            .sign_up(&sign_up_form("a@b", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        let err = client.sign_in("a@b.com", "short").await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(fakes.auth.calls(), 0);

        assert!(matches!(client.add("X").await, Err(ClientError::NotSignedIn)));
    }

    #[tokio::test]
    async fn signed_in_user_sees_only_created_todo() {
        let (mut client, fakes) = client().await;
        let user_id = fakes.auth.add_confirmed("a@b.com", "secret1");

        client.sign_in("a@b.com", "secret1").await.unwrap();
        assert_eq!(client.current_user().await.unwrap().id, user_id);

        client.add("Buy milk").await.unwrap();
        let todos = client.reload().await.unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].name, "Buy milk");
        assert!(!todos[0].completed);
    }

    #[tokio::test]
    async fn rename_toggle_and_remove_keep_cache_in_step_with_server() {
        let (mut client, fakes) = client().await;
        fakes.auth.add_confirmed("a@b.com", "secret1");
        client.sign_in("a@b.com", "secret1").await.unwrap();

        let x = client.add("X").await.unwrap();
        client.rename(x.id, "Y").await.unwrap();
        assert_eq!(client.todos()[0].name, "Y");

        client.set_completed(x.id, true).await.unwrap();
        client.set_completed(x.id, true).await.unwrap();
        assert!(client.todos()[0].completed);
        let toggled = client.toggle(x.id).await.unwrap();
        assert!(!toggled.completed);

        let cached = client.todos().to_vec();
        assert_eq!(client.reload().await.unwrap(), cached.as_slice());

        client.remove(x.id).await.unwrap();
        assert!(client.todos().is_empty());
        assert!(client.reload().await.unwrap().is_empty());
        assert!(matches!(
            client.toggle(x.id).await,
            Err(ClientError::UnknownTodo(_))
        ));
    }

    #[tokio::test]
    async fn api_errors_carry_server_message() {
        let (mut client, fakes) = client().await;
        fakes.auth.add_confirmed("a@b.com", "secret1");
        match client.sign_in("a@b.com", "wrong-password").await {
            Err(ClientError::Api { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid login credentials");
            }
            other => panic!("expected api error, got {other:?}"),
        }

        client.sign_in("a@b.com", "secret1").await.unwrap();
        match client.set_completed(4242, true).await {
            Err(ClientError::Api { status, .. }) => assert_eq!(status, 404),
            other => panic!("expected 404, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn sign_out_clears_session_and_cache() {
        let (mut client, fakes) = client().await;
        fakes.auth.add_confirmed("a@b.com", "secret1");
        client.sign_in("a@b.com", "secret1").await.unwrap();
        client.add("X").await.unwrap();

        client.refresh_session().await.unwrap();
        assert_eq!(client.reload().await.unwrap().len(), 1);

        client.sign_out().await.unwrap();
        assert!(!client.is_signed_in());
        assert!(client.todos().is_empty());
        assert!(matches!(client.reload().await, Err(ClientError::NotSignedIn)));
    }
}
