//! Repository trait for failed-attempt tracking.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::{Error, storage::AttemptRecord};

/// Storage for per-username failed-attempt records.
///
/// Lockout policy (threshold, duration) lives in the service; the
/// repository's job is to apply it inside a single atomic update, since
/// concurrent failures for the same username must not lose increments.
#[async_trait]
pub trait LockoutRepository: Send + Sync + 'static {
    /// Look up the attempt record for a username, stale or not.
    ///
    /// Staleness handling belongs to the caller; the repository reports
    /// whatever it holds.
    async fn find(&self, username: &str) -> Result<Option<AttemptRecord>, Error>;

    /// Record one failed attempt, atomically.
    ///
    /// The update must, in one linearized step:
    /// - treat a stale record (lockout already elapsed) as absent, so the
    ///   count restarts at 1;
    /// - increment the failure count;
    /// - when the count reaches `lock_after` and no lockout is pending,
    ///   set `locked_until = now + lock_for`. An already-set `locked_until`
    ///   is never moved; the window is fixed at the threshold crossing.
    ///
    /// Returns the record as written.
    async fn record_failure(
        &self,
        username: &str,
        lock_after: u32,
        lock_for: Duration,
    ) -> Result<AttemptRecord, Error>;

    /// Delete the record for a username.
    ///
    /// Returns whether a record existed. Called on successful login and on
    /// lazy expiry of an elapsed lockout.
    async fn clear(&self, username: &str) -> Result<bool, Error>;

    /// Delete every record whose lockout has elapsed at `now`.
    ///
    /// Returns the number of records removed. Records still tracking
    /// failures below the threshold are kept.
    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<u64, Error>;
}
