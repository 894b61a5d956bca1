// web-server/src/api/sessions.rs
use actix_web::{put, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use common::Config;

use crate::provider::ProviderClient;

#[derive(Debug, Deserialize)]
pub struct RevokeSessionRequest {
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

// Revoke one provider session by id. The revoke endpoint is not
// environment-scoped, so only the bearer token is required here.
#[put("/revoke-session")]
pub async fn revoke_session(
    body: web::Json<RevokeSessionRequest>,
    config: web::Data<Config>,
    provider: web::Data<ProviderClient>,
) -> impl Responder {
    let bearer_token = match config.provider.bearer_token.as_deref() {
        Some(token) => token,
        None => {
            return HttpResponse::InternalServerError().json(json!({
                "error": "Server configuration error: PROVIDER_BEARER_TOKEN not configured"
            }));
        }
    };

    let session_id = match body.session_id.as_deref() {
        Some(value) if !value.is_empty() => value,
        _ => {
            return HttpResponse::BadRequest().json(json!({
                "error": "Session ID is required"
            }));
        }
    };

    tracing::info!("Revoking session {}", session_id);

    match provider.revoke_session(bearer_token, session_id).await {
        Ok(upstream) => {
            tracing::info!("Provider API responded with {}", upstream.status);
            upstream.into_http_response()
        }
        Err(e) => {
            tracing::error!("Provider API call failed: {}", e);
            HttpResponse::InternalServerError().json(json!({
                "error": "Internal server error",
                "details": e.to_string()
            }))
        }
    }
}
