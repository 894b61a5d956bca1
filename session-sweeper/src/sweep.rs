// session-sweeper/src/sweep.rs
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use common::models::session::{SessionRecord, UserRecord};
use common::utils::{decode_token_payload, session_id_claim, user_id_claim, TokenDecodeError};

/// Lifecycle of one sweep run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepState {
    Idle,
    Running,
    Completed,
    Aborted,
}

/// Failures that abort a sweep outright. Individual revocation
/// failures do not land here: they are counted in the report and the
/// loop keeps going.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("token payload could not be decoded: {0}")]
    TokenUnreadable(#[from] TokenDecodeError),
    #[error("token carries no session identifier claim")]
    MissingSessionId,
    #[error("token carries no user identifier claim")]
    MissingUserId,
    #[error("failed to fetch the session list: {0}")]
    FetchFailed(String),
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct ApiError(pub String);

/// The two gateway calls the sweep needs. Behind a trait so the
/// engine is testable without a server.
#[async_trait]
pub trait SessionApi {
    async fn fetch_user(&self, user_id: &str) -> Result<UserRecord, ApiError>;
    async fn revoke_session(&self, session_id: &str) -> Result<(), ApiError>;
}

#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Pause between revocation calls. Keeps the provider's rate
    /// limiter off our back; not a correctness requirement.
    pub revoke_delay: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            revoke_delay: Duration::from_millis(500),
        }
    }
}

/// Outcome of a completed sweep.
#[derive(Debug, Clone)]
pub struct SweepReport {
    pub user_id: String,
    pub current_session_id: String,
    pub total_sessions: usize,
    pub active_sessions: usize,
    pub already_revoked: usize,
    pub revoked: usize,
    pub failed: usize,
}

/// Active sessions other than the current one, in list order.
pub fn plan_targets<'a>(
    sessions: &'a [SessionRecord],
    current_session_id: &str,
) -> Vec<&'a SessionRecord> {
    sessions
        .iter()
        .filter(|s| s.is_active() && s.id != current_session_id)
        .collect()
}

/// Revokes every active provider session except the one the held
/// token belongs to.
///
/// The current session is excluded when targets are planned, so it is
/// untouched by construction. Revocations run sequentially with a
/// fixed delay; a failed call is recorded and the loop continues.
pub struct SweepEngine<A: SessionApi> {
    api: A,
    config: SweepConfig,
    state: SweepState,
}

impl<A: SessionApi> SweepEngine<A> {
    pub fn new(api: A, config: SweepConfig) -> Self {
        Self {
            api,
            config,
            state: SweepState::Idle,
        }
    }

    pub fn state(&self) -> SweepState {
        self.state
    }

    pub async fn run(&mut self, token: &str) -> Result<SweepReport, SweepError> {
        self.state = SweepState::Running;
        match self.sweep(token).await {
            Ok(report) => {
                self.state = SweepState::Completed;
                Ok(report)
            }
            Err(e) => {
                self.state = SweepState::Aborted;
                Err(e)
            }
        }
    }

    async fn sweep(&self, token: &str) -> Result<SweepReport, SweepError> {
        // Decode-only claim extraction; the gateway re-verifies
        // everything that matters.
        let payload = decode_token_payload(token)?;
        let current_session_id =
            session_id_claim(&payload).ok_or(SweepError::MissingSessionId)?;
        let user_id = user_id_claim(&payload).ok_or(SweepError::MissingUserId)?;

        info!(
            "Starting sweep for user {} (current session {})",
            user_id, current_session_id
        );

        let user = self
            .api
            .fetch_user(&user_id)
            .await
            .map_err(|e| SweepError::FetchFailed(e.to_string()))?;

        let total_sessions = user.sessions.len();
        let active_sessions = user.sessions.iter().filter(|s| s.is_active()).count();
        let already_revoked = total_sessions - active_sessions;

        info!(
            "Found {} session(s): {} active, {} already revoked",
            total_sessions, active_sessions, already_revoked
        );

        let targets = plan_targets(&user.sessions, &current_session_id);

        if targets.is_empty() {
            info!("No other active sessions; nothing to revoke");
            return Ok(SweepReport {
                user_id,
                current_session_id,
                total_sessions,
                active_sessions,
                already_revoked,
                revoked: 0,
                failed: 0,
            });
        }

        info!(
            "Revoking {} session(s), excluding the current one",
            targets.len()
        );

        let mut revoked = 0;
        let mut failed = 0;

        for (index, target) in targets.iter().enumerate() {
            info!(
                "[{}/{}] Revoking session {}",
                index + 1,
                targets.len(),
                target.id
            );

            match self.api.revoke_session(&target.id).await {
                Ok(()) => revoked += 1,
                Err(e) => {
                    warn!("Failed to revoke session {}: {}", target.id, e);
                    failed += 1;
                }
            }

            if index + 1 < targets.len() {
                tokio::time::sleep(self.config.revoke_delay).await;
            }
        }

        info!(
            "Sweep finished: {} revoked, {} failed, current session {} preserved",
            revoked, failed, current_session_id
        );

        Ok(SweepReport {
            user_id,
            current_session_id,
            total_sessions,
            active_sessions,
            already_revoked,
            revoked,
            failed,
        })
    }
}
