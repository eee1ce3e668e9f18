//! In-memory storage backend for honeygate
//!
//! Repositories backed by process-wide concurrent maps. Nothing survives a
//! restart and nothing is shared across processes; this is the reference
//! backend for the single-process demonstration.
//!
//! Atomicity requirements are discharged at the map level: failed-attempt
//! updates run under a per-key entry guard (concurrent failures for one
//! username lose no increments), and passcode consumption is a single
//! `remove` (at most one concurrent verifier obtains the record).

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use honeygate_core::{
    Error,
    repositories::{
        LockoutRepository, LockoutRepositoryProvider, OtpRepository, OtpRepositoryProvider,
        RepositoryProvider,
    },
    storage::{AttemptRecord, OtpId, OtpRecord},
};

/// Failed-attempt records keyed by username.
#[derive(Debug, Default)]
pub struct MemoryLockoutRepository {
    records: DashMap<String, AttemptRecord>,
}

impl MemoryLockoutRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LockoutRepository for MemoryLockoutRepository {
    async fn find(&self, username: &str) -> Result<Option<AttemptRecord>, Error> {
        Ok(self.records.get(username).map(|entry| entry.value().clone()))
    }

    async fn record_failure(
        &self,
        username: &str,
        lock_after: u32,
        lock_for: Duration,
    ) -> Result<AttemptRecord, Error> {
        let now = Utc::now();
        // The entry guard is held across the whole update, so the
        // read-increment-write is atomic per username.
        let mut entry = self
            .records
            .entry(username.to_string())
            .or_insert(AttemptRecord {
                failure_count: 0,
                locked_until: None,
            });

        if entry.is_stale(now) {
            *entry = AttemptRecord {
                failure_count: 0,
                locked_until: None,
            };
        }

        entry.failure_count += 1;
        if entry.failure_count >= lock_after && entry.locked_until.is_none() {
            entry.locked_until = Some(now + lock_for);
        }

        Ok(entry.value().clone())
    }

    async fn clear(&self, username: &str) -> Result<bool, Error> {
        Ok(self.records.remove(username).is_some())
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<u64, Error> {
        let before = self.records.len();
        self.records.retain(|_, record| !record.is_stale(now));
        let swept = before.saturating_sub(self.records.len()) as u64;
        if swept > 0 {
            tracing::debug!(count = swept, "swept elapsed lockout records");
        }
        Ok(swept)
    }
}

/// Issued passcode records keyed by their opaque id.
#[derive(Debug, Default)]
pub struct MemoryOtpRepository {
    records: DashMap<OtpId, OtpRecord>,
}

impl MemoryOtpRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OtpRepository for MemoryOtpRepository {
    async fn insert(&self, record: OtpRecord) -> Result<(), Error> {
        self.records.insert(record.id.clone(), record);
        Ok(())
    }

    async fn take(&self, id: &OtpId) -> Result<Option<OtpRecord>, Error> {
        Ok(self.records.remove(id).map(|(_, record)| record))
    }

    async fn sweep_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, Error> {
        let before = self.records.len();
        self.records.retain(|_, record| record.issued_at >= cutoff);
        let swept = before.saturating_sub(self.records.len()) as u64;
        if swept > 0 {
            tracing::debug!(count = swept, "swept expired OTP records");
        }
        Ok(swept)
    }
}

/// Repository provider handing out the in-memory repositories.
#[derive(Debug, Default)]
pub struct MemoryRepositoryProvider {
    lockout: MemoryLockoutRepository,
    otps: MemoryOtpRepository,
}

impl MemoryRepositoryProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LockoutRepositoryProvider for MemoryRepositoryProvider {
    type LockoutRepo = MemoryLockoutRepository;

    fn lockout(&self) -> &Self::LockoutRepo {
        &self.lockout
    }
}

impl OtpRepositoryProvider for MemoryRepositoryProvider {
    type OtpRepo = MemoryOtpRepository;

    fn otp(&self) -> &Self::OtpRepo {
        &self.otps
    }
}

#[async_trait]
impl RepositoryProvider for MemoryRepositoryProvider {
    async fn health_check(&self) -> Result<(), Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_record_failure_increments_and_locks() {
        let repo = MemoryLockoutRepository::new();

        for expected in 1..=2 {
            let record = repo
                .record_failure("alice", 3, Duration::minutes(5))
                .await
                .unwrap();
            assert_eq!(record.failure_count, expected);
            assert!(record.locked_until.is_none());
        }

        let record = repo
            .record_failure("alice", 3, Duration::minutes(5))
            .await
            .unwrap();
        assert_eq!(record.failure_count, 3);
        let deadline = record.locked_until.unwrap();
        assert!(deadline > Utc::now());

        // The deadline is fixed at the threshold crossing.
        let record = repo
            .record_failure("alice", 3, Duration::minutes(5))
            .await
            .unwrap();
        assert_eq!(record.failure_count, 4);
        assert_eq!(record.locked_until.unwrap(), deadline);
    }

    #[tokio::test]
    async fn test_stale_record_restarts_at_one() {
        let repo = MemoryLockoutRepository::new();

        for _ in 0..3 {
            repo.record_failure("alice", 3, Duration::zero())
                .await
                .unwrap();
        }

        let record = repo
            .record_failure("alice", 3, Duration::zero())
            .await
            .unwrap();
        assert_eq!(record.failure_count, 1);
        assert!(record.locked_until.is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_failures_lose_no_increments() {
        let repo = Arc::new(MemoryLockoutRepository::new());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..25 {
                    repo.record_failure("alice", 1_000, Duration::minutes(5))
                        .await
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let record = repo.find("alice").await.unwrap().unwrap();
        assert_eq!(record.failure_count, 200);
    }

    #[tokio::test]
    async fn test_clear_reports_existence() {
        let repo = MemoryLockoutRepository::new();
        assert!(!repo.clear("alice").await.unwrap());

        repo.record_failure("alice", 3, Duration::minutes(5))
            .await
            .unwrap();
        assert!(repo.clear("alice").await.unwrap());
        assert!(repo.find("alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lockout_sweep_keeps_tracking_records() {
        let repo = MemoryLockoutRepository::new();

        // Locked with an already-elapsed deadline.
        for _ in 0..3 {
            repo.record_failure("mallory", 3, Duration::zero())
                .await
                .unwrap();
        }
        // Still tracking, below threshold.
        repo.record_failure("alice", 3, Duration::minutes(5))
            .await
            .unwrap();

        let swept = repo.sweep_expired(Utc::now()).await.unwrap();
        assert_eq!(swept, 1);
        assert!(repo.find("mallory").await.unwrap().is_none());
        assert!(repo.find("alice").await.unwrap().is_some());
    }

    fn otp_record(code: &str, issued_at: DateTime<Utc>) -> OtpRecord {
        OtpRecord {
            id: OtpId::new_random(),
            code: code.to_string(),
            issued_at,
        }
    }

    #[tokio::test]
    async fn test_take_consumes_exactly_once() {
        let repo = MemoryOtpRepository::new();
        let record = otp_record("123456", Utc::now());
        let id = record.id.clone();
        repo.insert(record).await.unwrap();

        assert!(repo.take(&id).await.unwrap().is_some());
        assert!(repo.take(&id).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_take_has_one_winner() {
        let repo = Arc::new(MemoryOtpRepository::new());
        let record = otp_record("123456", Utc::now());
        let id = record.id.clone();
        repo.insert(record).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let repo = repo.clone();
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                repo.take(&id).await.unwrap().is_some()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_otp_sweep_by_cutoff() {
        let repo = MemoryOtpRepository::new();
        let now = Utc::now();

        let stale = otp_record("111111", now - Duration::seconds(60));
        let fresh = otp_record("222222", now);
        let fresh_id = fresh.id.clone();
        repo.insert(stale).await.unwrap();
        repo.insert(fresh).await.unwrap();

        let swept = repo.sweep_expired(now - Duration::seconds(30)).await.unwrap();
        assert_eq!(swept, 1);
        assert!(repo.take(&fresh_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_provider_health_check() {
        let provider = MemoryRepositoryProvider::new();
        provider.health_check().await.unwrap();
        assert!(provider.lockout().find("alice").await.unwrap().is_none());
        assert!(
            provider
                .otp()
                .take(&OtpId::from("otp_missing"))
                .await
                .unwrap()
                .is_none()
        );
    }
}
