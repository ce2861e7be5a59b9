use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::{
    auth::service::AuthError,
    todos::store::StoreError,
    validation::{FieldIssue, ValidationError},
};

/// Everything a handler can fail with.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The request body or path could not be read into the expected shape.
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("Todo with ID: {0} not found")]
    TodoNotFound(i64),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    issues: Option<&'a [FieldIssue]>,
}

/// Pass the remote side's client errors through; anything else is the
/// upstream's fault.
fn upstream_status(status: u16) -> StatusCode {
    match StatusCode::from_u16(status) {
        Ok(s) if s.is_client_error() => s,
        _ => StatusCode::BAD_GATEWAY,
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(AuthError::Rejected { status, .. }) => upstream_status(*status),
            AppError::Auth(AuthError::Transport(_)) => StatusCode::BAD_GATEWAY,
            AppError::Store(StoreError::Rejected { status, .. }) => upstream_status(*status),
            AppError::Store(StoreError::Transport(_)) => StatusCode::BAD_GATEWAY,
            AppError::Store(StoreError::Database(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::TodoNotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, %status, "request failed");
        } else {
            warn!(error = %self, %status, "request rejected");
        }
        let issues = match &self {
            AppError::Validation(v) => Some(v.issues.as_slice()),
            _ => None,
        };
        let body = ErrorBody {
            error: self.to_string(),
            issues,
        };
        (status, Json(body)).into_response()
    }
}
