// web-server/src/auth/verifier.rs
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use common::models::claims::TokenClaims;
use common::Config;

use crate::auth::jwks::{JwksCache, JwksError};

/// Why a token was rejected. The variants are the response taxonomy:
/// handlers surface `to_string()` as the 401 detail.
#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("signature verification failed: {0}")]
    SignatureInvalid(String),
    #[error("issuer not allowed: {0}")]
    IssuerNotAllowed(String),
    #[error("audience not allowed: {0}")]
    AudienceNotAllowed(String),
    #[error("token expired: {0}")]
    Expired(String),
    #[error("key set unavailable: {0}")]
    KeySetUnavailable(String),
}

/// Verifies provider tokens against the remote key set and the
/// configured issuer/audience allow-lists.
///
/// Created once at startup and shared across requests.
#[derive(Clone)]
pub struct TokenVerifier {
    jwks: Option<JwksCache>,
    issuers: Vec<String>,
    audiences: Vec<String>,
    leeway_secs: u64,
}

impl TokenVerifier {
    pub fn new(config: &Config) -> Self {
        let jwks = config.jwks_url().map(|url| {
            JwksCache::new(url, Duration::from_secs(config.auth.jwks_cache_ttl_secs))
        });

        Self {
            jwks,
            issuers: config.auth.issuers.clone(),
            audiences: config.auth.audiences.clone(),
            leeway_secs: config.auth.leeway_secs,
        }
    }

    /// The JWKS endpoint in use, for response envelopes.
    pub fn jwks_endpoint(&self) -> Option<&str> {
        self.jwks.as_ref().map(|jwks| jwks.endpoint())
    }

    /// Full verification: signature over header+payload, issuer and
    /// audience membership, expiry with the configured leeway.
    pub async fn verify(&self, token: &str) -> Result<TokenClaims, VerificationError> {
        let header =
            decode_header(token).map_err(|e| VerificationError::Malformed(e.to_string()))?;

        if header.alg != Algorithm::RS256 {
            return Err(VerificationError::Malformed(format!(
                "unsupported algorithm {:?}",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| VerificationError::Malformed("token header has no 'kid'".into()))?;

        let jwks = self.jwks.as_ref().ok_or_else(|| {
            VerificationError::KeySetUnavailable("JWKS endpoint is not configured".into())
        })?;

        let key = jwks.get_key(&kid).await.map_err(|e| match e {
            JwksError::UnknownKeyId(kid) => VerificationError::SignatureInvalid(format!(
                "no provider key matches kid '{}'",
                kid
            )),
            other => VerificationError::KeySetUnavailable(other.to_string()),
        })?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = self.leeway_secs;
        validation.set_issuer(&self.issuers);
        validation.set_audience(&self.audiences);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        let data = decode::<TokenClaims>(token, &key, &validation).map_err(|e| {
            use jsonwebtoken::errors::ErrorKind;

            let detail = e.to_string();
            match e.kind() {
                ErrorKind::ExpiredSignature => VerificationError::Expired(detail),
                ErrorKind::InvalidIssuer => VerificationError::IssuerNotAllowed(detail),
                ErrorKind::InvalidAudience => VerificationError::AudienceNotAllowed(detail),
                ErrorKind::InvalidSignature => VerificationError::SignatureInvalid(detail),
                _ => VerificationError::Malformed(detail),
            }
        })?;

        debug!("Verified token for subject {}", data.claims.sub);
        Ok(data.claims)
    }
}
