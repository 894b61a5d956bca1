// Session Sweeper - main.rs
use std::env;
use std::time::Duration;

use common::setup_tracing;
use uuid::Uuid;

use session_sweeper::api_client::GatewayClient;
use session_sweeper::sweep::{SweepConfig, SweepEngine};

#[tokio::main]
async fn main() {
    // Setup tracing
    setup_tracing();

    let base_url = env::var("SWEEPER_GATEWAY_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:8081".to_string());

    let token = match env::var("SWEEPER_TOKEN") {
        Ok(token) if !token.is_empty() => token,
        _ => {
            tracing::error!("SWEEPER_TOKEN is not set; export the provider JWT before running");
            std::process::exit(2);
        }
    };

    let revoke_delay = env::var("SWEEPER_REVOKE_DELAY_MS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or_else(|| SweepConfig::default().revoke_delay);

    let run_id = Uuid::new_v4();
    tracing::info!("Session sweep {} against {}", run_id, base_url);

    let mut engine = SweepEngine::new(GatewayClient::new(base_url), SweepConfig { revoke_delay });

    match engine.run(&token).await {
        Ok(report) => {
            tracing::info!(
                "Sweep {} complete: {} total, {} active, {} revoked, {} failed; current session {} preserved",
                run_id,
                report.total_sessions,
                report.active_sessions,
                report.revoked,
                report.failed,
                report.current_session_id
            );
            if report.failed > 0 {
                std::process::exit(1);
            }
        }
        Err(e) => {
            tracing::error!("Sweep {} aborted: {}", run_id, e);
            std::process::exit(1);
        }
    }
}
