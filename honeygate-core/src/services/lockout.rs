//! Lockout tracking service for failed login attempts.
//!
//! Per-username failure counters with a time-boxed lockout once a
//! threshold is crossed. Expiry is lazy: stale records are evicted when
//! read, and a separate sweep exists for scheduled cleanup. Only non-typo
//! password failures are ever recorded here; the typo verdict bypasses
//! this service entirely.

use std::sync::Arc;

use chrono::Utc;

use crate::{
    Error,
    repositories::LockoutRepository,
    storage::{LockoutConfig, LockoutStatus},
};

/// Service for tracking failed attempts and lockout state per username.
///
/// Thread-safe; the repository is responsible for making each recorded
/// failure an atomic read-increment-write.
pub struct LockoutService<R: LockoutRepository> {
    repository: Arc<R>,
    config: LockoutConfig,
}

impl<R: LockoutRepository> LockoutService<R> {
    pub fn new(repository: Arc<R>, config: LockoutConfig) -> Self {
        Self { repository, config }
    }

    pub fn config(&self) -> &LockoutConfig {
        &self.config
    }

    /// Get the current lockout status for a username.
    ///
    /// A record whose lockout has elapsed is deleted on the spot and
    /// reported as absent.
    pub async fn get_lockout_status(&self, username: &str) -> Result<LockoutStatus, Error> {
        let now = Utc::now();
        let Some(record) = self.repository.find(username).await? else {
            return Ok(LockoutStatus::unlocked(username));
        };

        if record.is_stale(now) {
            self.repository.clear(username).await?;
            tracing::debug!(username, "lockout elapsed, record evicted");
            return Ok(LockoutStatus::unlocked(username));
        }

        Ok(LockoutStatus {
            username: username.to_string(),
            failed_attempts: record.failure_count,
            is_locked: record.is_locked_at(now),
            locked_until: record.locked_until,
        })
    }

    /// Check whether a username is currently locked out.
    pub async fn is_locked(&self, username: &str) -> Result<bool, Error> {
        Ok(self.get_lockout_status(username).await?.is_locked)
    }

    /// Record a failed login attempt and return the updated status.
    ///
    /// Crossing the threshold fixes `locked_until` at `now +
    /// lockout_duration`; later failures never move it.
    pub async fn record_failed_attempt(&self, username: &str) -> Result<LockoutStatus, Error> {
        let record = self
            .repository
            .record_failure(
                username,
                self.config.max_failed_attempts,
                self.config.lockout_duration,
            )
            .await?;

        let now = Utc::now();
        let is_locked = record.is_locked_at(now);
        if is_locked && record.failure_count == self.config.max_failed_attempts {
            tracing::info!(
                username,
                failed_attempts = record.failure_count,
                "username locked out"
            );
        }

        Ok(LockoutStatus {
            username: username.to_string(),
            failed_attempts: record.failure_count,
            is_locked,
            locked_until: record.locked_until,
        })
    }

    /// Clear the attempt record for a username.
    ///
    /// Called only after a fully successful login (password and OTP both
    /// valid).
    pub async fn clear_attempts(&self, username: &str) -> Result<(), Error> {
        self.repository.clear(username).await?;
        Ok(())
    }

    /// Failed attempts left before the username locks out.
    ///
    /// The full threshold when no live record exists (including after a
    /// lockout has expired).
    pub async fn remaining_attempts(&self, username: &str) -> Result<u32, Error> {
        let status = self.get_lockout_status(username).await?;
        Ok(self
            .config
            .max_failed_attempts
            .saturating_sub(status.failed_attempts))
    }

    /// Delete every record whose lockout has already elapsed.
    pub async fn sweep_expired(&self) -> Result<u64, Error> {
        self.repository.sweep_expired(Utc::now()).await
    }
}
