// web-server/src/api/auth.rs
use actix_web::http::header;
use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use common::models::claims::TokenClaims;
use common::Config;

use crate::auth::cookie::{clear_session_cookie, session_cookie, SESSION_COOKIE_NAME};
use crate::auth::verifier::TokenVerifier;

#[get("/")]
pub async fn api_index() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "name": "Wallet Session Gateway API",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[derive(Debug, Default, Deserialize)]
struct VerifyTokenRequest {
    action: Option<String>,
    token: Option<String>,
}

// Verify a provider token and install it as the session cookie.
//
// The body is optional: a bare POST with an Authorization header is
// treated as `action: "verify"`.
#[post("/verify-token")]
pub async fn verify_token(
    req: HttpRequest,
    body: web::Bytes,
    config: web::Data<Config>,
    verifier: web::Data<TokenVerifier>,
) -> impl Responder {
    let parsed = if is_json_request(&req) {
        serde_json::from_slice::<VerifyTokenRequest>(&body).unwrap_or_default()
    } else {
        VerifyTokenRequest::default()
    };

    let action = parsed.action.as_deref().unwrap_or("verify").to_string();
    let token = parsed.token.or_else(|| bearer_token(&req));

    // Destroy never looks at the token: logout must succeed even with
    // an expired or absent session.
    if action == "destroy" {
        tracing::info!("Destroying session cookie");
        return HttpResponse::Ok()
            .cookie(clear_session_cookie())
            .json(json!({
                "success": true,
                "message": "Session destroyed successfully",
                "action": "destroy",
                "timestamp": Utc::now().to_rfc3339(),
            }));
    }

    let token = match token {
        Some(token) => token,
        None => {
            return HttpResponse::BadRequest().json(json!({
                "error": "No authentication token provided"
            }));
        }
    };

    let claims = match verifier.verify(&token).await {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!("Token verification failed: {}", e);
            return HttpResponse::Unauthorized().json(json!({
                "error": "Token verification failed",
                "details": e.to_string(),
                "timestamp": Utc::now().to_rfc3339(),
            }));
        }
    };

    tracing::info!("Verified token for user {}", claims.sub);

    let message = if action == "create" {
        "Token verified and session created"
    } else {
        "Token verified successfully"
    };

    let response = json!({
        "success": true,
        "message": message,
        "action": action,
        "user": user_summary(&claims),
        "verification": {
            "method": "JWKS + RS256 signature verification",
            "jwksEndpoint": verifier.jwks_endpoint(),
            "environmentId": config.provider.environment_id,
            "signatureVerified": true,
            "jwksVerified": true,
            "issuer": claims.iss,
            "audience": claims.aud,
        },
        "timestamp": Utc::now().to_rfc3339(),
    });

    HttpResponse::Ok()
        .cookie(session_cookie(&token, Some(claims.exp), &config))
        .json(response)
}

// Session introspection from the cookie set by the POST handler
#[get("/verify-token")]
pub async fn session_status(
    req: HttpRequest,
    verifier: web::Data<TokenVerifier>,
) -> impl Responder {
    let cookie = match req.cookie(SESSION_COOKIE_NAME) {
        Some(cookie) => cookie,
        None => {
            return HttpResponse::Unauthorized().json(json!({
                "authenticated": false,
                "message": "No session cookie found",
                "timestamp": Utc::now().to_rfc3339(),
            }));
        }
    };

    let claims = match verifier.verify(cookie.value()).await {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!("Session cookie failed verification: {}", e);
            return HttpResponse::Unauthorized().json(json!({
                "authenticated": false,
                "message": "Invalid session token",
                "details": e.to_string(),
                "timestamp": Utc::now().to_rfc3339(),
            }));
        }
    };

    let now = Utc::now().timestamp();
    let time_remaining = (claims.exp - now).max(0);
    let expires_at = DateTime::<Utc>::from_timestamp(claims.exp, 0)
        .map(|t| Value::String(t.to_rfc3339()))
        .unwrap_or(Value::Null);

    HttpResponse::Ok().json(json!({
        "authenticated": true,
        "user": {
            "id": claims.sub,
            "email": claims.email,
            "walletAddress": claims.wallet_address(),
            "environmentId": claims.environment_id,
        },
        "session": {
            "expiresAt": expires_at,
            "timeRemaining": time_remaining,
            "issuer": claims.iss,
        },
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

fn user_summary(claims: &TokenClaims) -> Value {
    let credential = claims.primary_credential();
    json!({
        "id": claims.sub,
        "walletAddress": credential.and_then(|c| c.address.as_deref()),
        "email": claims.email,
        "walletProvider": credential.and_then(|c| c.wallet_provider.as_deref()),
        "chain": credential.and_then(|c| c.chain.as_deref()),
        "environmentId": claims.environment_id,
    })
}

fn is_json_request(req: &HttpRequest) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("application/json"))
        .unwrap_or(false)
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_owned)
}
