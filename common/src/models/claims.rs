// common/src/models/claims.rs
use serde::{Deserialize, Serialize};

/// Claim set asserted by the wallet provider's identity tokens.
///
/// Only the fields the gateway acts on are typed; the provider is free
/// to add more.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub iss: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
    #[serde(default)]
    pub sid: Option<String>,
    #[serde(default)]
    pub environment_id: Option<String>,
    #[serde(default)]
    pub wallet_public_key: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub verified_credentials: Vec<VerifiedCredential>,
}

/// One verified credential (wallet, email, social handle) attached to
/// the token by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifiedCredential {
    #[serde(rename = "type")]
    pub credential_type: Option<String>,
    pub format: Option<String>,
    pub address: Option<String>,
    pub chain: Option<String>,
    pub wallet_name: Option<String>,
    pub wallet_provider: Option<String>,
}

impl TokenClaims {
    /// The first verified credential, which the provider lists as the
    /// primary wallet.
    pub fn primary_credential(&self) -> Option<&VerifiedCredential> {
        self.verified_credentials.first()
    }

    pub fn wallet_address(&self) -> Option<&str> {
        self.primary_credential().and_then(|c| c.address.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_provider_token_payload() {
        let claims: TokenClaims = serde_json::from_value(serde_json::json!({
            "sub": "user-1",
            "iss": "app.dynamic.xyz",
            "aud": "http://localhost:3000",
            "exp": 2_000_000_000i64,
            "iat": 1_999_996_400i64,
            "sid": "session-1",
            "environment_id": "env-1",
            "email": "user@example.com",
            "verified_credentials": [
                {
                    "type": "blockchain",
                    "format": "blockchain",
                    "address": "0xabc",
                    "chain": "eip155:1",
                    "wallet_provider": "embeddedWallet"
                }
            ]
        }))
        .unwrap();

        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.wallet_address(), Some("0xabc"));
        assert_eq!(
            claims
                .primary_credential()
                .and_then(|c| c.wallet_provider.as_deref()),
            Some("embeddedWallet")
        );
    }

    #[test]
    fn optional_fields_default() {
        let claims: TokenClaims = serde_json::from_value(serde_json::json!({
            "sub": "user-1",
            "iss": "app.dynamic.xyz",
            "aud": "http://localhost:3000",
            "exp": 2_000_000_000i64,
            "iat": 1_999_996_400i64
        }))
        .unwrap();

        assert!(claims.verified_credentials.is_empty());
        assert!(claims.wallet_address().is_none());
        assert!(claims.email.is_none());
    }
}
