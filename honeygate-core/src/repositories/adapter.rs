//! Adapters that borrow one repository out of a shared provider.
//!
//! Services are generic over a single repository trait; a storage backend
//! hands out all of its repositories through one `RepositoryProvider`.
//! These wrappers bridge the two so a provider can be shared by `Arc`
//! while each service sees only the repository it needs.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::{
    Error,
    repositories::{LockoutRepository, OtpRepository, RepositoryProvider},
    storage::{AttemptRecord, OtpId, OtpRecord},
};

pub struct LockoutRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> LockoutRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> LockoutRepository for LockoutRepositoryAdapter<R> {
    async fn find(&self, username: &str) -> Result<Option<AttemptRecord>, Error> {
        self.provider.lockout().find(username).await
    }

    async fn record_failure(
        &self,
        username: &str,
        lock_after: u32,
        lock_for: Duration,
    ) -> Result<AttemptRecord, Error> {
        self.provider
            .lockout()
            .record_failure(username, lock_after, lock_for)
            .await
    }

    async fn clear(&self, username: &str) -> Result<bool, Error> {
        self.provider.lockout().clear(username).await
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<u64, Error> {
        self.provider.lockout().sweep_expired(now).await
    }
}

pub struct OtpRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> OtpRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> OtpRepository for OtpRepositoryAdapter<R> {
    async fn insert(&self, record: OtpRecord) -> Result<(), Error> {
        self.provider.otp().insert(record).await
    }

    async fn take(&self, id: &OtpId) -> Result<Option<OtpRecord>, Error> {
        self.provider.otp().take(id).await
    }

    async fn sweep_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, Error> {
        self.provider.otp().sweep_expired(cutoff).await
    }
}
