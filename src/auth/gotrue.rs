use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::service::{AuthError, AuthService, AuthUserInfo, Session, SignUpOutcome};
use crate::supabase::{error_parts, SupabaseClient};

/// [`AuthService`] backed by the hosted GoTrue auth API.
#[derive(Clone)]
pub struct GoTrueAuth {
    client: SupabaseClient,
    email_redirect_to: Option<String>,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshBody<'a> {
    refresh_token: &'a str,
}

/// Sign-up answers with a session when the project auto-confirms, and with
/// the bare user otherwise.
#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpBody {
    Session(Session),
    User(AuthUserInfo),
}

impl GoTrueAuth {
    pub fn new(client: SupabaseClient, email_redirect_to: Option<String>) -> Self {
        Self {
            client,
            email_redirect_to,
        }
    }

    async fn token_grant<B: Serialize>(&self, grant_type: &str, body: &B) -> Result<Session, AuthError> {
        let response = self
            .client
            .request(
                Method::POST,
                &format!("/auth/v1/token?grant_type={grant_type}"),
                None,
            )
            .json(body)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(response.json::<Session>().await?)
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, AuthError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let (status, message) = error_parts(response).await;
    debug!(status, %message, "auth service rejected request");
    Err(AuthError::Rejected { status, message })
}

#[async_trait]
impl AuthService for GoTrueAuth {
    #[instrument(skip(self, password))]
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        let mut request = self
            .client
            .request(Method::POST, "/auth/v1/signup", None)
            .json(&Credentials { email, password });
        if let Some(redirect) = &self.email_redirect_to {
            request = request.query(&[("redirect_to", redirect)]);
        }
        let response = ensure_success(request.send().await?).await?;
        let outcome = match response.json::<SignUpBody>().await? {
            SignUpBody::Session(session) => SignUpOutcome {
                user: session.user,
                confirmation_required: false,
            },
            SignUpBody::User(user) => SignUpOutcome {
                user,
                confirmation_required: true,
            },
        };
        Ok(outcome)
    }

    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.token_grant("password", &Credentials { email, password })
            .await
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let response = self
            .client
            .request(Method::POST, "/auth/v1/logout", Some(access_token))
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    #[instrument(skip_all)]
    async fn refresh(&self, refresh_token: &str) -> Result<Session, AuthError> {
        self.token_grant("refresh_token", &RefreshBody { refresh_token })
            .await
    }

    #[instrument(skip_all)]
    async fn current_user(&self, access_token: &str) -> Result<Option<AuthUserInfo>, AuthError> {
        let response = self
            .client
            .request(Method::GET, "/auth/v1/user", Some(access_token))
            .send()
            .await?;
        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Ok(None);
        }
        let response = ensure_success(response).await?;
        Ok(Some(response.json::<AuthUserInfo>().await?))
    }
}
