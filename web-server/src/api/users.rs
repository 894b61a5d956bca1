// web-server/src/api/users.rs
use actix_web::{get, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use common::Config;

use crate::provider::ProviderClient;

#[derive(Debug, Deserialize)]
pub struct GetUserQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

// Fetch a user record (including its session list) from the provider
#[get("/get-user")]
pub async fn get_user(
    query: web::Query<GetUserQuery>,
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

    let environment_id = match config.provider.environment_id.as_deref() {
        Some(id) => id,
        None => {
            return HttpResponse::InternalServerError().json(json!({
                "error": "Server configuration error: PROVIDER_ENVIRONMENT_ID not configured"
            }));
        }
    };

    let user_id = match query.user_id.as_deref() {
        Some(value) if !value.is_empty() => value,
        _ => {
            return HttpResponse::BadRequest().json(json!({
                "error": "User ID is required"
            }));
        }
    };

    tracing::info!("Looking up user {}", user_id);

    match provider.get_user(bearer_token, environment_id, user_id).await {
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
