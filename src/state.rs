use std::sync::Arc;

use anyhow::Context;
use axum::extract::FromRef;
use sqlx::postgres::PgPoolOptions;

use crate::auth::{gotrue::GoTrueAuth, jwt::JwtKeys, service::AuthService};
use crate::config::{AppConfig, StoreBackend};
use crate::supabase::SupabaseClient;
use crate::todos::{postgres::PgTodoStore, rest::RestTodoStore, store::TodoStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub jwt: JwtKeys,
    pub auth: Arc<dyn AuthService>,
    pub todos: Arc<dyn TodoStore>,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let client = SupabaseClient::new(&config.supabase);

        let auth = Arc::new(GoTrueAuth::new(
            client.clone(),
            config.supabase.email_redirect_to.clone(),
        )) as Arc<dyn AuthService>;

        let todos = match &config.store {
            StoreBackend::Rest => Arc::new(RestTodoStore::new(client)) as Arc<dyn TodoStore>,
            StoreBackend::Postgres { database_url } => {
                let db = PgPoolOptions::new()
                    .max_connections(10)
                    .connect(database_url)
                    .await
                    .context("connect to database")?;
                sqlx::migrate!("./migrations")
                    .run(&db)
                    .await
                    .context("run migrations")?;
                tracing::info!("migrations applied");
                Arc::new(PgTodoStore::new(db)) as Arc<dyn TodoStore>
            }
        };

        Ok(Self::from_parts(config, auth, todos))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        auth: Arc<dyn AuthService>,
        todos: Arc<dyn TodoStore>,
    ) -> Self {
        let jwt = JwtKeys::from_config(&config.jwt);
        Self {
            config,
            jwt,
            auth,
            todos,
        }
    }
}
