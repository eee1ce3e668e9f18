//! Repository trait for stored one-time passcodes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    Error,
    storage::{OtpId, OtpRecord},
};

/// Storage for issued, not-yet-consumed one-time passcodes.
#[async_trait]
pub trait OtpRepository: Send + Sync + 'static {
    /// Store a freshly issued passcode record.
    async fn insert(&self, record: OtpRecord) -> Result<(), Error>;

    /// Remove and return the record for an identifier, atomically.
    ///
    /// Consumption and lookup are one operation so that of any number of
    /// concurrent verifiers for the same id, exactly one receives the
    /// record and the rest see `None`.
    async fn take(&self, id: &OtpId) -> Result<Option<OtpRecord>, Error>;

    /// Delete every record issued before `cutoff`.
    ///
    /// Returns the number of records removed. Called opportunistically on
    /// each issuance and available for scheduled cleanup.
    async fn sweep_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, Error>;
}
