// common/src/models/session.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One session record as reported by the provider's users API.
///
/// The gateway never owns these: it only reads them and triggers
/// revocation through the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Null until the provider revokes the session.
    #[serde(default)]
    pub revoked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl SessionRecord {
    /// Active means the provider has not stamped a revocation time yet.
    pub fn is_active(&self) -> bool {
        self.revoked_at.is_none()
    }
}

/// User entity carried in the provider's get-user response. Fields the
/// sweeper does not need are left untyped.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    pub id: String,
    #[serde(default)]
    pub sessions: Vec<SessionRecord>,
}

/// Envelope shape of the get-user response body.
#[derive(Debug, Clone, Deserialize)]
pub struct UserEnvelope {
    pub user: UserRecord,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_iff_revoked_at_is_null() {
        let record: SessionRecord = serde_json::from_value(serde_json::json!({
            "id": "s1",
            "createdAt": "2024-01-01T00:00:00Z",
            "revokedAt": null
        }))
        .unwrap();
        assert!(record.is_active());

        let record: SessionRecord = serde_json::from_value(serde_json::json!({
            "id": "s2",
            "createdAt": "2024-01-01T00:00:00Z",
            "revokedAt": "2024-01-02T00:00:00Z"
        }))
        .unwrap();
        assert!(!record.is_active());
    }

    #[test]
    fn missing_revoked_at_counts_as_active() {
        let record: SessionRecord =
            serde_json::from_value(serde_json::json!({"id": "s3"})).unwrap();
        assert!(record.is_active());
    }

    #[test]
    fn user_envelope_with_network_metadata() {
        let envelope: UserEnvelope = serde_json::from_value(serde_json::json!({
            "user": {
                "id": "u1",
                "email": "user@example.com",
                "sessions": [
                    {
                        "id": "s1",
                        "createdAt": "2024-03-01T10:00:00Z",
                        "revokedAt": null,
                        "ipAddress": "203.0.113.9",
                        "userAgent": "Mozilla/5.0"
                    }
                ]
            }
        }))
        .unwrap();

        assert_eq!(envelope.user.id, "u1");
        assert_eq!(envelope.user.sessions.len(), 1);
        assert_eq!(
            envelope.user.sessions[0].ip_address.as_deref(),
            Some("203.0.113.9")
        );
    }

    #[test]
    fn sessions_default_to_empty() {
        let envelope: UserEnvelope =
            serde_json::from_value(serde_json::json!({"user": {"id": "u1"}})).unwrap();
        assert!(envelope.user.sessions.is_empty());
    }
}
