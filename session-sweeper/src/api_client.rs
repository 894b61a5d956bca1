// session-sweeper/src/api_client.rs
use async_trait::async_trait;
use serde_json::{json, Value};

use common::models::session::{UserEnvelope, UserRecord};

use crate::sweep::{ApiError, SessionApi};

/// `SessionApi` over HTTP against the gateway's proxy endpoints. The
/// gateway holds the provider secret; this client never sees it.
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
}

impl GatewayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SessionApi for GatewayClient {
    async fn fetch_user(&self, user_id: &str) -> Result<UserRecord, ApiError> {
        let url = format!("{}/api/get-user", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("userId", user_id)])
            .send()
            .await
            .map_err(|e| ApiError(e.to_string()))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| ApiError(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiError(format!(
                "HTTP {}: {}",
                status.as_u16(),
                error_detail(&text)
            )));
        }

        let envelope: UserEnvelope = serde_json::from_str(&text)
            .map_err(|e| ApiError(format!("unexpected get-user response: {}", e)))?;

        Ok(envelope.user)
    }

    async fn revoke_session(&self, session_id: &str) -> Result<(), ApiError> {
        let url = format!("{}/api/revoke-session", self.base_url);
        let response = self
            .http
            .put(&url)
            .json(&json!({ "sessionId": session_id }))
            .send()
            .await
            .map_err(|e| ApiError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError(format!(
                "HTTP {}: {}",
                status.as_u16(),
                error_detail(&text)
            )));
        }

        Ok(())
    }
}

/// Pull the gateway's error message out of its JSON envelope; fall
/// back to the raw body for anything else.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .or_else(|| v.get("message"))
                .and_then(Value::as_str)
                .map(str::to_owned)
        })
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_detail_prefers_error_field() {
        assert_eq!(
            error_detail(r#"{"error": "Session ID is required"}"#),
            "Session ID is required"
        );
        assert_eq!(error_detail(r#"{"message": "Bad Gateway"}"#), "Bad Gateway");
        assert_eq!(error_detail("plain text"), "plain text");
    }
}
