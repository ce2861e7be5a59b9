use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::jwt::AuthUser;

/// A row of the `todos` table. The owner column is called `uid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Todo {
    pub id: i64,
    pub name: String,
    pub completed: bool,
    #[serde(rename = "uid")]
    #[sqlx(rename = "uid")]
    pub owner_id: Uuid,
}

/// The caller every store operation is scoped to.
#[derive(Debug, Clone)]
pub struct Owner {
    pub id: Uuid,
    /// Forwarded to stores that enforce row-level security themselves.
    pub access_token: String,
}

impl From<AuthUser> for Owner {
    fn from(user: AuthUser) -> Self {
        Self {
            id: user.id,
            access_token: user.access_token,
        }
    }
}
