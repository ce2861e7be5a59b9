//! Shared HTTP plumbing for the hosted backend's REST endpoints.

use reqwest::{header, Method, RequestBuilder, Response};
use serde::Deserialize;

use crate::config::SupabaseConfig;

#[derive(Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &SupabaseConfig) -> Self {
        Self::with_http(reqwest::Client::new(), &config.url, &config.anon_key)
    }

    pub fn with_http(http: reqwest::Client, base_url: &str, anon_key: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        }
    }

    /// Request against `path` carrying the project key. `bearer` is the
    /// caller's access token; without it the project key is used.
    pub fn request(&self, method: Method, path: &str, bearer: Option<&str>) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", bearer.unwrap_or(&self.anon_key)),
            )
    }
}

/// Error payloads differ between the auth and data APIs; take the first
/// human-readable field present.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    msg: Option<String>,
    error_description: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

/// Consume a non-success response into `(status, message)`.
pub async fn error_parts(response: Response) -> (u16, String) {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    (status.as_u16(), error_message(status.as_u16(), &text))
}

pub(crate) fn error_message(status: u16, body: &str) -> String {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    parsed
        .msg
        .or(parsed.error_description)
        .or(parsed.message)
        .or(parsed.error)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("request failed with status {status}")
            } else {
                body.trim().to_string()
            }
        })
}
