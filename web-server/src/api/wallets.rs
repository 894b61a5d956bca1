// web-server/src/api/wallets.rs
use actix_web::{post, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use common::Config;

use crate::provider::ProviderClient;

#[derive(Debug, Deserialize)]
pub struct CreateWalletRequest {
    pub identifier: Option<String>,
    #[serde(rename = "type")]
    pub wallet_type: Option<String>,
    pub chains: Option<Vec<String>>,
}

// Create an embedded wallet through the provider's WaaS API
#[post("/create-wallet")]
pub async fn create_wallet(
    body: web::Json<CreateWalletRequest>,
    config: web::Data<Config>,
    provider: web::Data<ProviderClient>,
) -> impl Responder {
    // Server configuration comes first: nothing leaves this process
    // until both secrets are present.
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

    let identifier = match body.identifier.as_deref() {
        Some(value) if !value.is_empty() => value,
        _ => {
            return HttpResponse::BadRequest().json(json!({
                "error": "Identifier is required"
            }));
        }
    };

    let wallet_type = match body.wallet_type.as_deref() {
        Some(value) if !value.is_empty() => value,
        _ => {
            return HttpResponse::BadRequest().json(json!({
                "error": "Type is required (e.g. \"email\")"
            }));
        }
    };

    let chains = body
        .chains
        .clone()
        .unwrap_or_else(|| vec!["EVM".to_string()]);

    tracing::info!("Creating {} wallet on chains {:?}", wallet_type, chains);

    let payload = json!({
        "identifier": identifier,
        "type": wallet_type,
        "chains": chains,
    });

    match provider
        .create_wallet(bearer_token, environment_id, &payload)
        .await
    {
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
