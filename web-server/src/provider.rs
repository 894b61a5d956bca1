// web-server/src/provider.rs
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde_json::{json, Value};

use common::Config;

/// Thin client for the wallet provider's REST API. Holds no
/// credentials: handlers pass the bearer token per call, after their
/// own configuration checks.
#[derive(Clone)]
pub struct ProviderClient {
    http: reqwest::Client,
    wallet_api_base: String,
    rest_api_base: String,
}

/// A provider response captured for byte-faithful passthrough.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: reqwest::StatusCode,
    pub body: UpstreamBody,
}

/// Provider bodies are usually JSON, but error pages and proxies in
/// between can hand back plain text.
#[derive(Debug)]
pub enum UpstreamBody {
    Json(Value),
    Raw(String),
}

impl ProviderClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            wallet_api_base: config
                .provider
                .wallet_api_base
                .trim_end_matches('/')
                .to_string(),
            rest_api_base: config
                .provider
                .rest_api_base
                .trim_end_matches('/')
                .to_string(),
        }
    }

    /// POST /environments/{env}/waas/create
    pub async fn create_wallet(
        &self,
        bearer_token: &str,
        environment_id: &str,
        payload: &Value,
    ) -> Result<UpstreamResponse, reqwest::Error> {
        let url = format!(
            "{}/environments/{}/waas/create",
            self.wallet_api_base, environment_id
        );
        tracing::debug!("Forwarding wallet creation to {}", url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(bearer_token)
            .json(payload)
            .send()
            .await?;

        UpstreamResponse::read(response).await
    }

    /// GET /environments/{env}/users/{userId}
    pub async fn get_user(
        &self,
        bearer_token: &str,
        environment_id: &str,
        user_id: &str,
    ) -> Result<UpstreamResponse, reqwest::Error> {
        let url = format!(
            "{}/environments/{}/users/{}",
            self.rest_api_base, environment_id, user_id
        );
        tracing::debug!("Forwarding user lookup to {}", url);

        let response = self.http.get(&url).bearer_auth(bearer_token).send().await?;

        UpstreamResponse::read(response).await
    }

    /// PUT /sessions/{sessionId}/revoke
    pub async fn revoke_session(
        &self,
        bearer_token: &str,
        session_id: &str,
    ) -> Result<UpstreamResponse, reqwest::Error> {
        let url = format!("{}/sessions/{}/revoke", self.rest_api_base, session_id);
        tracing::debug!("Forwarding session revocation to {}", url);

        let response = self.http.put(&url).bearer_auth(bearer_token).send().await?;

        UpstreamResponse::read(response).await
    }
}

impl UpstreamResponse {
    async fn read(response: reqwest::Response) -> Result<Self, reqwest::Error> {
        let status = response.status();
        let text = response.text().await?;

        let body = if text.is_empty() {
            UpstreamBody::Json(json!({}))
        } else {
            match serde_json::from_str::<Value>(&text) {
                Ok(value) => UpstreamBody::Json(value),
                Err(_) => UpstreamBody::Raw(text),
            }
        };

        Ok(Self { status, body })
    }

    /// Replay the provider's status and body to our caller. Non-JSON
    /// bodies are wrapped so the client always receives JSON.
    pub fn into_http_response(self) -> HttpResponse {
        let status =
            StatusCode::from_u16(self.status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);

        match self.body {
            UpstreamBody::Json(value) => HttpResponse::build(status).json(value),
            UpstreamBody::Raw(text) => {
                HttpResponse::build(status).json(json!({ "message": text }))
            }
        }
    }
}
