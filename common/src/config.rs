// common/src/config.rs
use config::{Config as ConfigFile, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

const DEFAULT_WALLET_API_BASE: &str = "https://app.dynamic.xyz/api/v0";
const DEFAULT_REST_API_BASE: &str = "https://app.dynamicauth.com/api/v0";

fn default_issuers() -> Vec<String> {
    vec![
        "app.dynamic.xyz".to_string(),
        "https://app.dynamic.xyz".to_string(),
    ]
}

fn default_audiences() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "https://localhost:3000".to_string(),
    ]
}

/// Central configuration for the gateway and the session sweeper
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub web_server_addr: String,
    pub run_mode: String,

    pub provider: ProviderConfig,
    pub auth: AuthConfig,
}

/// Connection details for the wallet provider's REST API.
///
/// The bearer token and environment id are deliberately optional: the
/// process boots without them and the proxy handlers answer 500 until
/// both are configured.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub bearer_token: Option<String>,
    pub environment_id: Option<String>,
    pub wallet_api_base: String,
    pub rest_api_base: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Explicit JWKS endpoint. When unset it is derived from the
    /// provider environment id.
    pub jwks_url: Option<String>,
    /// Issuer allow-list. Multiple entries cover the provider's
    /// equivalent issuer spellings (with and without scheme).
    pub issuers: Vec<String>,
    /// Audience allow-list, one entry per accepted origin variant.
    pub audiences: Vec<String>,
    /// Parent domain for the session cookie in production.
    pub cookie_domain: Option<String>,
    pub jwks_cache_ttl_secs: u64,
    pub leeway_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            web_server_addr: "127.0.0.1:8081".to_string(),
            run_mode: "development".to_string(),
            provider: ProviderConfig {
                bearer_token: None,
                environment_id: None,
                wallet_api_base: DEFAULT_WALLET_API_BASE.to_string(),
                rest_api_base: DEFAULT_REST_API_BASE.to_string(),
            },
            auth: AuthConfig {
                jwks_url: None,
                issuers: default_issuers(),
                audiences: default_audiences(),
                cookie_domain: None,
                jwks_cache_ttl_secs: 3600,
                leeway_secs: 60,
            },
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config_dir = env::var("CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                // Check if we're in the project root or a subcrate
                let mut path = PathBuf::from("./config");
                if !path.exists() {
                    path = PathBuf::from("../config");
                }
                path
            });

        tracing::info!("Loading configuration from {}", config_dir.display());
        tracing::info!("Using run mode: {}", run_mode);

        let config = ConfigFile::builder()
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", run_mode))).required(false))
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            .add_source(Environment::with_prefix("GATEWAY").separator("__"))
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load from environment variables directly (used when no config files exist)
    pub fn from_env() -> Self {
        match Self::load() {
            Ok(config) => {
                tracing::info!("Configuration loaded from files and environment");
                config
            }
            Err(e) => {
                tracing::warn!("Failed to load configuration from files: {}", e);
                tracing::info!("Falling back to environment variables only");

                let defaults = Self::default();

                let web_server_addr =
                    env::var("WEB_SERVER_ADDR").unwrap_or(defaults.web_server_addr);

                let run_mode = env::var("RUN_MODE").unwrap_or(defaults.run_mode);

                let bearer_token = env::var("PROVIDER_BEARER_TOKEN").ok();
                let environment_id = env::var("PROVIDER_ENVIRONMENT_ID").ok();

                let wallet_api_base = env::var("PROVIDER_WALLET_API_BASE")
                    .unwrap_or(defaults.provider.wallet_api_base);

                let rest_api_base = env::var("PROVIDER_REST_API_BASE")
                    .unwrap_or(defaults.provider.rest_api_base);

                let jwks_url = env::var("AUTH_JWKS_URL").ok();

                let issuers = env::var("AUTH_ISSUERS")
                    .map(|v| parse_list(&v))
                    .unwrap_or(defaults.auth.issuers);

                let audiences = env::var("AUTH_AUDIENCES")
                    .map(|v| parse_list(&v))
                    .unwrap_or(defaults.auth.audiences);

                let cookie_domain = env::var("AUTH_COOKIE_DOMAIN").ok();

                let jwks_cache_ttl_secs = env::var("AUTH_JWKS_CACHE_TTL_SECS")
                    .ok()
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(defaults.auth.jwks_cache_ttl_secs);

                let leeway_secs = env::var("AUTH_LEEWAY_SECS")
                    .ok()
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(defaults.auth.leeway_secs);

                Self {
                    web_server_addr,
                    run_mode,
                    provider: ProviderConfig {
                        bearer_token,
                        environment_id,
                        wallet_api_base,
                        rest_api_base,
                    },
                    auth: AuthConfig {
                        jwks_url,
                        issuers,
                        audiences,
                        cookie_domain,
                        jwks_cache_ttl_secs,
                        leeway_secs,
                    },
                }
            }
        }
    }

    pub fn is_production(&self) -> bool {
        self.run_mode.eq_ignore_ascii_case("production")
    }

    /// The JWKS endpoint to verify tokens against: the configured URL,
    /// or the provider's well-known location for the environment.
    pub fn jwks_url(&self) -> Option<String> {
        if let Some(url) = &self.auth.jwks_url {
            return Some(url.clone());
        }
        self.provider.environment_id.as_ref().map(|env_id| {
            format!(
                "{}/sdk/{}/.well-known/jwks",
                self.provider.wallet_api_base.trim_end_matches('/'),
                env_id
            )
        })
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
