// Web Server - main.rs
use actix_web::{get, web, App, HttpResponse, HttpServer, Responder};
use common::{setup_tracing, Config};

use web_server::api;
use web_server::auth::verifier::TokenVerifier;
use web_server::middleware::rate_limiter::RateLimiter;
use web_server::provider::ProviderClient;

// Proxy routes that hit the provider's write APIs get a fixed-window
// limit per client IP.
const RATE_LIMITED_PATHS: &[&str] = &["/api/create-wallet", "/api/revoke-session"];
const RATE_LIMIT_MAX_REQUESTS: usize = 10;

#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok().body("Wallet Session Gateway")
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Setup tracing
    setup_tracing();

    // Load configuration
    let config = Config::from_env();

    // Save address before moving config into web::Data
    let server_addr = config.web_server_addr.clone();

    tracing::info!("Starting Web Server on {}", server_addr);
    if config.provider.bearer_token.is_none() {
        tracing::warn!("PROVIDER_BEARER_TOKEN is not set; proxy routes will answer 500");
    }
    if config.provider.environment_id.is_none() {
        tracing::warn!("PROVIDER_ENVIRONMENT_ID is not set; proxy routes will answer 500");
    }

    let verifier = TokenVerifier::new(&config);
    let provider = ProviderClient::new(&config);

    let config_data = web::Data::new(config);
    let verifier_data = web::Data::new(verifier);
    let provider_data = web::Data::new(provider);

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(config_data.clone())
            .app_data(verifier_data.clone())
            .app_data(provider_data.clone())
            .wrap(RateLimiter::new(
                RATE_LIMITED_PATHS.iter().map(|p| p.to_string()).collect(),
                RATE_LIMIT_MAX_REQUESTS,
            ))
            .service(index)
            .configure(api::configure)
    })
    .bind(&server_addr)?
    .run()
    .await
}
