use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::service::{AuthUserInfo, Session};

/// Request body for token refresh; the cookie is used when absent.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Returned after login and refresh.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub user: PublicUser,
}

impl From<Session> for AuthResponse {
    fn from(s: Session) -> Self {
        Self {
            access_token: s.access_token,
            refresh_token: s.refresh_token,
            expires_in: s.expires_in,
            user: s.user.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user: PublicUser,
    pub confirmation_required: bool,
    pub message: String,
}

/// Public part of the user returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: Option<String>,
}

impl From<AuthUserInfo> for PublicUser {
    fn from(u: AuthUserInfo) -> Self {
        Self {
            id: u.id,
            email: u.email,
        }
    }
}
