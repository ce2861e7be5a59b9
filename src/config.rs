use std::str::FromStr;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub audience: String,
    pub issuer: Option<String>,
}

/// Connection details for the hosted backend (auth + data APIs).
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
    pub email_redirect_to: Option<String>,
}

/// Where todo rows live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// The hosted REST data API.
    Rest,
    /// The same database, reached directly over a Postgres connection.
    Postgres { database_url: String },
}

impl StoreBackend {
    pub fn parse(kind: &str, database_url: Option<String>) -> anyhow::Result<Self> {
        match kind.trim().to_lowercase().as_str() {
            "rest" => Ok(StoreBackend::Rest),
            "postgres" => Ok(StoreBackend::Postgres {
                database_url: database_url
                    .context("DATABASE_URL is required when TODO_STORE=postgres")?,
            }),
            other => anyhow::bail!("unknown TODO_STORE `{other}`, expected `rest` or `postgres`"),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StoreBackend::Rest => "rest",
            StoreBackend::Postgres { .. } => "postgres",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase: SupabaseConfig,
    pub jwt: JwtConfig,
    pub store: StoreBackend,
    pub cookie_secure: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let supabase = SupabaseConfig {
            url: std::env::var("SUPABASE_URL").context("SUPABASE_URL")?,
            anon_key: std::env::var("SUPABASE_ANON_KEY").context("SUPABASE_ANON_KEY")?,
            email_redirect_to: std::env::var("EMAIL_REDIRECT_TO").ok(),
        };
        let jwt = JwtConfig {
            secret: std::env::var("SUPABASE_JWT_SECRET").context("SUPABASE_JWT_SECRET")?,
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "authenticated".into()),
            issuer: std::env::var("JWT_ISSUER").ok(),
        };
        let store = StoreBackend::parse(
            &std::env::var("TODO_STORE").unwrap_or_else(|_| "rest".into()),
            std::env::var("DATABASE_URL").ok(),
        )?;
        let cookie_secure = parse_var("COOKIE_SECURE", true)?;
        Ok(Self {
            supabase,
            jwt,
            store,
            cookie_secure,
        })
    }
}

fn parse_var<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid {key} value `{raw}`")),
        Err(_) => Ok(default),
    }
}
