// End-to-end sweep against a mocked gateway.
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use session_sweeper::api_client::GatewayClient;
use session_sweeper::sweep::{SweepConfig, SweepEngine, SweepError, SweepState};

fn token_with_claims(payload: &Value) -> String {
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

fn zero_delay() -> SweepConfig {
    SweepConfig {
        revoke_delay: Duration::ZERO,
    }
}

#[tokio::test]
async fn sweeps_exactly_the_other_active_session() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/get-user"))
        .and(query_param("userId", "u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {
                "id": "u1",
                "sessions": [
                    {"id": "s1", "createdAt": "2024-03-01T10:00:00Z", "revokedAt": null},
                    {"id": "s2", "createdAt": "2024-03-02T10:00:00Z", "revokedAt": null},
                    {"id": "s3", "createdAt": "2024-01-01T10:00:00Z", "revokedAt": "2024-01-02T00:00:00Z"}
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/revoke-session"))
        .and(body_json(json!({"sessionId": "s2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let token = token_with_claims(&json!({"sid": "s1", "sub": "u1"}));
    let mut engine = SweepEngine::new(GatewayClient::new(server.uri()), zero_delay());

    let report = engine.run(&token).await.unwrap();

    assert_eq!(engine.state(), SweepState::Completed);
    assert_eq!(report.total_sessions, 3);
    assert_eq!(report.active_sessions, 2);
    assert_eq!(report.revoked, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(report.current_session_id, "s1");
}

#[tokio::test]
async fn gateway_errors_during_revocation_are_counted_not_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/get-user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {
                "id": "u1",
                "sessions": [
                    {"id": "s1", "revokedAt": null},
                    {"id": "s2", "revokedAt": null},
                    {"id": "s3", "revokedAt": null}
                ]
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/revoke-session"))
        .and(body_json(json!({"sessionId": "s2"})))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"error": "Internal server error"})),
        )
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/revoke-session"))
        .and(body_json(json!({"sessionId": "s3"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let token = token_with_claims(&json!({"sid": "s1", "sub": "u1"}));
    let mut engine = SweepEngine::new(GatewayClient::new(server.uri()), zero_delay());

    let report = engine.run(&token).await.unwrap();

    assert_eq!(report.revoked, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(engine.state(), SweepState::Completed);
}

#[tokio::test]
async fn a_failed_user_fetch_aborts_the_sweep() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/get-user"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"error": "Internal server error"})),
        )
        .mount(&server)
        .await;

    let token = token_with_claims(&json!({"sid": "s1", "sub": "u1"}));
    let mut engine = SweepEngine::new(GatewayClient::new(server.uri()), zero_delay());

    let result = engine.run(&token).await;

    assert!(matches!(result, Err(SweepError::FetchFailed(_))));
    assert_eq!(engine.state(), SweepState::Aborted);
}
