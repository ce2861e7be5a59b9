use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Failure reported by, or while talking to, the identity service.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The service answered and said no; `message` is its own wording.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("auth service unavailable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// The identity as reported by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUserInfo {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub user: AuthUserInfo,
}

#[derive(Debug, Clone)]
pub struct SignUpOutcome {
    pub user: AuthUserInfo,
    /// `false` when the project auto-confirms new accounts.
    pub confirmation_required: bool,
}

/// Everything the app needs from the external identity provider.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register an account; the service sends the confirmation email.
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;
    /// Revoke the session behind `access_token`.
    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;
    async fn refresh(&self, refresh_token: &str) -> Result<Session, AuthError>;
    /// `None` when the service no longer accepts the token.
    async fn current_user(&self, access_token: &str) -> Result<Option<AuthUserInfo>, AuthError>;
}
