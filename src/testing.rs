//! In-memory stand-ins for the hosted backend and request helpers.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value;
use time::OffsetDateTime;
use tower::ServiceExt;
use uuid::Uuid;

use crate::{
    auth::{
        jwt::Claims,
        service::{AuthError, AuthService, AuthUserInfo, Session, SignUpOutcome},
    },
    config::{AppConfig, JwtConfig, StoreBackend, SupabaseConfig},
    state::AppState,
    todos::{
        model::{Owner, Todo},
        store::{StoreError, TodoStore},
    },
};

pub const TEST_JWT_SECRET: &str = "test-jwt-secret";

/// An access token as the auth service would issue it.
pub fn sign_token(user_id: Uuid, email: Option<&str>) -> String {
    let now = OffsetDateTime::now_utc().unix_timestamp() as usize;
    let claims = Claims {
        sub: user_id,
        exp: now + 3600,
        iat: now,
        aud: "authenticated".into(),
        iss: None,
        email: email.map(Into::into),
        role: Some("authenticated".into()),
        session_id: Some(Uuid::new_v4()),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("sign test token")
}

pub fn owner() -> Owner {
    Owner {
        id: Uuid::new_v4(),
        access_token: "test-token".into(),
    }
}

struct FakeUser {
    id: Uuid,
    password: String,
    confirmed: bool,
}

#[derive(Default)]
struct FakeAuthInner {
    users: HashMap<String, FakeUser>,
    access: HashMap<String, AuthUserInfo>,
    refresh: HashMap<String, AuthUserInfo>,
}

/// Auth service double that issues real HS256 tokens signed with
/// [`TEST_JWT_SECRET`].
#[derive(Default)]
pub struct FakeAuth {
    inner: Mutex<FakeAuthInner>,
    calls: AtomicUsize,
}

fn rejected(status: u16, message: &str) -> AuthError {
    AuthError::Rejected {
        status,
        message: message.into(),
    }
}

impl FakeAuth {
    pub fn add_confirmed(&self, email: &str, password: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.inner.lock().unwrap().users.insert(
            email.into(),
            FakeUser {
                id,
                password: password.into(),
                confirmed: true,
            },
        );
        id
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn issue(inner: &mut FakeAuthInner, user: AuthUserInfo) -> Session {
        let access_token = sign_token(user.id, user.email.as_deref());
        let refresh_token = Uuid::new_v4().simple().to_string();
        inner.access.insert(access_token.clone(), user.clone());
        inner.refresh.insert(refresh_token.clone(), user.clone());
        Session {
            access_token,
            refresh_token,
            expires_in: 3600,
            user,
        }
    }
}

#[async_trait]
impl AuthService for FakeAuth {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut inner = self.inner.lock().unwrap();
        if inner.users.contains_key(email) {
            return Err(rejected(422, "User already registered"));
        }
        let id = Uuid::new_v4();
        inner.users.insert(
            email.into(),
            FakeUser {
                id,
                password: password.into(),
                confirmed: false,
            },
        );
        Ok(SignUpOutcome {
            user: AuthUserInfo {
                id,
                email: Some(email.into()),
            },
            confirmation_required: true,
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut inner = self.inner.lock().unwrap();
        let user = match inner.users.get(email) {
            Some(u) if u.password == password => u,
            _ => return Err(rejected(400, "Invalid login credentials")),
        };
        if !user.confirmed {
            return Err(rejected(400, "Email not confirmed"));
        }
        let info = AuthUserInfo {
            id: user.id,
            email: Some(email.into()),
        };
        Ok(Self::issue(&mut inner, info))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut inner = self.inner.lock().unwrap();
        if let Some(user) = inner.access.remove(access_token) {
            inner.refresh.retain(|_, u| u.id != user.id);
        }
        Ok(())
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut inner = self.inner.lock().unwrap();
        let user = inner
            .refresh
            .remove(refresh_token)
            .ok_or_else(|| rejected(400, "Invalid Refresh Token: Refresh Token Not Found"))?;
        Ok(Self::issue(&mut inner, user))
    }

    async fn current_user(&self, access_token: &str) -> Result<Option<AuthUserInfo>, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.inner.lock().unwrap().access.get(access_token).cloned())
    }
}

/// Todo table held in memory, scoped exactly like the real stores.
#[derive(Default)]
pub struct MemoryTodoStore {
    rows: Mutex<(i64, Vec<Todo>)>,
}

#[async_trait]
impl TodoStore for MemoryTodoStore {
    async fn list(&self, owner: &Owner) -> Result<Vec<Todo>, StoreError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.1.iter().filter(|t| t.owner_id == owner.id).cloned().collect())
    }

    async fn insert(&self, owner: &Owner, name: &str) -> Result<Todo, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        rows.0 += 1;
        let todo = Todo {
            id: rows.0,
            name: name.into(),
            completed: false,
            owner_id: owner.id,
        };
        rows.1.push(todo.clone());
        Ok(todo)
    }

    async fn update_completed(
        &self,
        owner: &Owner,
        id: i64,
        completed: bool,
    ) -> Result<Option<Todo>, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows
            .1
            .iter_mut()
            .find(|t| t.id == id && t.owner_id == owner.id)
            .map(|t| {
                t.completed = completed;
                t.clone()
            }))
    }

    async fn update_name(
        &self,
        owner: &Owner,
        id: i64,
        name: &str,
    ) -> Result<Option<Todo>, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows
            .1
            .iter_mut()
            .find(|t| t.id == id && t.owner_id == owner.id)
            .map(|t| {
                t.name = name.into();
                t.clone()
            }))
    }

    async fn delete(&self, owner: &Owner, id: i64) -> Result<u64, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.1.len();
        rows.1.retain(|t| !(t.id == id && t.owner_id == owner.id));
        Ok((before - rows.1.len()) as u64)
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        supabase: SupabaseConfig {
            url: "http://supabase.invalid".into(),
            anon_key: "anon-key".into(),
            email_redirect_to: None,
        },
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.into(),
            audience: "authenticated".into(),
            issuer: None,
        },
        store: StoreBackend::Rest,
        cookie_secure: false,
    }
}

/// An [`AppState`] wired to the in-memory doubles.
pub struct Fakes {
    pub state: AppState,
    pub auth: Arc<FakeAuth>,
}

impl Fakes {
    pub fn new() -> Self {
        let auth = Arc::new(FakeAuth::default());
        let state = AppState::from_parts(
            Arc::new(test_config()),
            auth.clone(),
            Arc::new(MemoryTodoStore::default()),
        );
        Self { state, auth }
    }
}

/// Build a request; a `null` body is sent empty.
pub fn json_request(method: Method, uri: &str, bearer: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    if body.is_null() {
        builder.body(Body::empty()).unwrap()
    } else {
        builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }
}

/// Run one request through the router; non-JSON bodies come back as `Null`.
pub async fn call(app: &Router, req: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, body)
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve_mock(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

pub fn test_http() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
