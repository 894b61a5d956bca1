// web-server/src/auth/jwks.rs
use jsonwebtoken::DecodingKey;
use moka::future::Cache;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum JwksError {
    #[error("failed to fetch key set: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("key set document is malformed: {0}")]
    Malformed(String),
    #[error("no key in the set matches kid '{0}'")]
    UnknownKeyId(String),
}

/// A JWK entry as served by the provider's well-known endpoint. Only
/// RSA keys are expected.
#[derive(Debug, Deserialize)]
struct JsonWebKey {
    kid: String,
    kty: String,
    n: Option<String>,
    e: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JsonWebKeySet {
    keys: Vec<JsonWebKey>,
}

/// Fetches the provider's signing keys and caches them by `kid`.
///
/// Cache misses trigger a full refetch, so key rotation is picked up
/// as soon as a token signed with a new key arrives; the TTL bounds
/// how long a withdrawn key keeps verifying.
#[derive(Clone)]
pub struct JwksCache {
    inner: Arc<Inner>,
}

struct Inner {
    jwks_url: String,
    http: reqwest::Client,
    // kid -> DecodingKey
    keys: Cache<String, Arc<DecodingKey>>,
}

impl JwksCache {
    pub fn new(jwks_url: String, cache_ttl: Duration) -> Self {
        let keys = Cache::builder()
            .max_capacity(100)
            .time_to_live(cache_ttl)
            .build();

        Self {
            inner: Arc::new(Inner {
                jwks_url,
                http: reqwest::Client::new(),
                keys,
            }),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.inner.jwks_url
    }

    /// Decoding key for the given `kid`, fetching the set on a miss.
    pub async fn get_key(&self, kid: &str) -> Result<Arc<DecodingKey>, JwksError> {
        if let Some(key) = self.inner.keys.get(kid).await {
            debug!("JWK cache hit for kid {}", kid);
            return Ok(key);
        }

        debug!("JWK cache miss for kid {}; fetching key set", kid);
        self.fetch_and_cache().await?;

        self.inner
            .keys
            .get(kid)
            .await
            .ok_or_else(|| JwksError::UnknownKeyId(kid.to_string()))
    }

    async fn fetch_and_cache(&self) -> Result<(), JwksError> {
        let response = self
            .inner
            .http
            .get(&self.inner.jwks_url)
            .send()
            .await?
            .error_for_status()?;

        let jwks: JsonWebKeySet = response
            .json()
            .await
            .map_err(|e| JwksError::Malformed(e.to_string()))?;

        info!("Fetched {} provider signing key(s)", jwks.keys.len());

        for jwk in jwks.keys {
            if jwk.kty != "RSA" {
                debug!("Skipping non-RSA key {} ({})", jwk.kid, jwk.kty);
                continue;
            }

            let (n, e) = match (&jwk.n, &jwk.e) {
                (Some(n), Some(e)) => (n, e),
                _ => {
                    return Err(JwksError::Malformed(format!(
                        "RSA key {} is missing 'n' or 'e'",
                        jwk.kid
                    )))
                }
            };

            let key = DecodingKey::from_rsa_components(n, e)
                .map_err(|err| JwksError::Malformed(format!("key {}: {}", jwk.kid, err)))?;

            self.inner.keys.insert(jwk.kid, Arc::new(key)).await;
        }

        Ok(())
    }
}
