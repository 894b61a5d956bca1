// Common Crate - utils.rs
use serde_json::Value;
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Setup tracing for consistent logging across services
pub fn setup_tracing() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Claim names that may carry the session identifier, in precedence order.
pub const SESSION_ID_CLAIMS: &[&str] = &["sid", "session_id", "jti"];

/// Claim names that may carry the user identifier, in precedence order.
pub const USER_ID_CLAIMS: &[&str] = &["sub", "user_id"];

#[derive(Debug, Error)]
pub enum TokenDecodeError {
    #[error("token is not a three-part compact JWT")]
    NotCompact,
    #[error("payload segment is not valid base64url: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("payload segment is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode the payload segment of a compact JWT without checking the
/// signature. Used where only claim extraction is needed; anything
/// security-relevant goes through the verifier instead.
pub fn decode_token_payload(token: &str) -> Result<Value, TokenDecodeError> {
    let mut parts = token.split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => return Err(TokenDecodeError::NotCompact),
    };

    let bytes = base64::decode_config(payload, base64::URL_SAFE_NO_PAD)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// First candidate claim present as a string, by list order.
pub fn first_string_claim(payload: &Value, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .find_map(|key| payload.get(*key).and_then(Value::as_str).map(str::to_owned))
}

pub fn session_id_claim(payload: &Value) -> Option<String> {
    first_string_claim(payload, SESSION_ID_CLAIMS)
}

pub fn user_id_claim(payload: &Value) -> Option<String> {
    first_string_claim(payload, USER_ID_CLAIMS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fake_token(payload: &Value) -> String {
        let header = base64::encode_config(
            serde_json::to_vec(&json!({"alg": "RS256", "typ": "JWT"})).unwrap(),
            base64::URL_SAFE_NO_PAD,
        );
        let body = base64::encode_config(
            serde_json::to_vec(payload).unwrap(),
            base64::URL_SAFE_NO_PAD,
        );
        format!("{}.{}.sig", header, body)
    }

    #[test]
    fn test_decode_token_payload() {
        let payload = json!({"sub": "user-1", "sid": "session-1"});
        let decoded = decode_token_payload(&fake_token(&payload)).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_decode_rejects_non_compact_input() {
        assert!(matches!(
            decode_token_payload("only.two-parts"),
            Err(TokenDecodeError::NotCompact)
        ));
        assert!(matches!(
            decode_token_payload("a.b.c.d"),
            Err(TokenDecodeError::NotCompact)
        ));
    }

    #[test]
    fn test_session_id_precedence() {
        let payload = json!({"sid": "a", "session_id": "b", "jti": "c"});
        assert_eq!(session_id_claim(&payload).as_deref(), Some("a"));

        let payload = json!({"session_id": "b", "jti": "c"});
        assert_eq!(session_id_claim(&payload).as_deref(), Some("b"));

        let payload = json!({"jti": "c"});
        assert_eq!(session_id_claim(&payload).as_deref(), Some("c"));

        assert_eq!(session_id_claim(&json!({})), None);
    }

    #[test]
    fn test_user_id_precedence() {
        let payload = json!({"sub": "u1", "user_id": "u2"});
        assert_eq!(user_id_claim(&payload).as_deref(), Some("u1"));

        let payload = json!({"user_id": "u2"});
        assert_eq!(user_id_claim(&payload).as_deref(), Some("u2"));
    }

    #[test]
    fn test_non_string_claims_are_skipped() {
        let payload = json!({"sid": 42, "session_id": "s2"});
        assert_eq!(session_id_claim(&payload).as_deref(), Some("s2"));
    }
}
