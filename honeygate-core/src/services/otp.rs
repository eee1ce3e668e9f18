//! One-time-passcode issuance and verification.
//!
//! Codes are six random digits, stored under an unpredictable opaque id
//! and valid for a short fixed window. Verification is single-shot: the
//! first attempt consumes the stored record whatever the outcome, which
//! bounds guessing to one try per issuance.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;

use crate::{
    Error,
    error::{OtpError, ValidationError},
    repositories::OtpRepository,
    storage::{IssuedOtp, OtpConfig, OtpId, OtpRecord},
};

/// Service managing the lifecycle of one-time passcodes.
pub struct OtpService<R: OtpRepository> {
    repository: Arc<R>,
    config: OtpConfig,
}

impl<R: OtpRepository> OtpService<R> {
    pub fn new(repository: Arc<R>, config: OtpConfig) -> Self {
        Self { repository, config }
    }

    pub fn config(&self) -> &OtpConfig {
        &self.config
    }

    /// Issue a new passcode.
    ///
    /// The code is drawn uniformly from `100000..=999999` so it always has
    /// exactly six digits. Each issuance also sweeps records that have
    /// already aged out; cleanup is amortized here instead of running as a
    /// background task.
    pub async fn issue(&self) -> Result<IssuedOtp, Error> {
        let now = Utc::now();

        let swept = self
            .repository
            .sweep_expired(now - self.config.expires_in)
            .await?;
        if swept > 0 {
            tracing::debug!(count = swept, "swept expired OTP records");
        }

        let code = rand::rng().random_range(100_000..=999_999).to_string();
        let record = OtpRecord {
            id: OtpId::new_random(),
            code: code.clone(),
            issued_at: now,
        };
        self.repository.insert(record.clone()).await?;

        Ok(IssuedOtp {
            code,
            otp_id: record.id,
            expires_in_ms: self.config.expires_in.num_milliseconds(),
        })
    }

    /// Verify a submitted passcode against a stored record.
    ///
    /// Outcomes:
    /// - empty code or id: [`ValidationError::MissingField`], nothing
    ///   consumed;
    /// - unknown id: [`OtpError::NotFound`] (reported as expired);
    /// - window elapsed: [`OtpError::Expired`], record consumed;
    /// - code mismatch: [`OtpError::Mismatch`], record consumed;
    /// - match within the window: `Ok(())`, record consumed.
    ///
    /// The repository's `take` removes the record in the same step that
    /// retrieves it, so concurrent verifiers of one id cannot both
    /// succeed.
    pub async fn verify(&self, code: &str, otp_id: &str) -> Result<(), Error> {
        if code.trim().is_empty() || otp_id.trim().is_empty() {
            return Err(ValidationError::MissingField("otp code or id".to_string()).into());
        }

        let Some(record) = self.repository.take(&OtpId::from(otp_id)).await? else {
            return Err(OtpError::NotFound.into());
        };

        let now = Utc::now();
        if record.is_expired_at(now, self.config.expires_in) {
            tracing::debug!(otp_id, "OTP presented after its window elapsed");
            return Err(OtpError::Expired.into());
        }

        if record.code != code {
            return Err(OtpError::Mismatch.into());
        }

        Ok(())
    }

    /// Delete every record that has aged past the expiration window.
    pub async fn sweep_expired(&self) -> Result<u64, Error> {
        self.repository
            .sweep_expired(Utc::now() - self.config.expires_in)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration as StdDuration;
    use tokio::time::sleep;

    /// Mock repository for testing
    struct MockOtpRepository {
        records: Mutex<HashMap<OtpId, OtpRecord>>,
    }

    impl MockOtpRepository {
        fn new() -> Self {
            Self {
                records: Mutex::new(HashMap::new()),
            }
        }

        fn len(&self) -> usize {
            self.records.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl OtpRepository for MockOtpRepository {
        async fn insert(&self, record: OtpRecord) -> Result<(), Error> {
            self.records
                .lock()
                .unwrap()
                .insert(record.id.clone(), record);
            Ok(())
        }

        async fn take(&self, id: &OtpId) -> Result<Option<OtpRecord>, Error> {
            Ok(self.records.lock().unwrap().remove(id))
        }

        async fn sweep_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, Error> {
            let mut records = self.records.lock().unwrap();
            let before = records.len();
            records.retain(|_, record| record.issued_at >= cutoff);
            Ok((before - records.len()) as u64)
        }
    }

    fn service(config: OtpConfig) -> (Arc<MockOtpRepository>, OtpService<MockOtpRepository>) {
        let repo = Arc::new(MockOtpRepository::new());
        (repo.clone(), OtpService::new(repo, config))
    }

    #[tokio::test]
    async fn test_issued_code_shape() {
        let (_, service) = service(OtpConfig::default());
        let issued = service.issue().await.unwrap();

        assert_eq!(issued.code.len(), 6);
        let value: u32 = issued.code.parse().unwrap();
        assert!((100_000..=999_999).contains(&value));
        assert!(issued.otp_id.is_valid());
        assert_eq!(issued.expires_in_ms, 30_000);
    }

    #[tokio::test]
    async fn test_issued_ids_are_unique() {
        let (_, service) = service(OtpConfig::default());
        let first = service.issue().await.unwrap();
        let second = service.issue().await.unwrap();
        assert_ne!(first.otp_id, second.otp_id);
    }

    #[tokio::test]
    async fn test_verify_succeeds_exactly_once() {
        let (repo, service) = service(OtpConfig::default());
        let issued = service.issue().await.unwrap();

        service
            .verify(&issued.code, issued.otp_id.as_str())
            .await
            .unwrap();
        assert_eq!(repo.len(), 0, "verification must consume the record");

        // The second attempt is indistinguishable from an expired code.
        let err = service
            .verify(&issued.code, issued.otp_id.as_str())
            .await
            .unwrap_err();
        match err {
            Error::Otp(e) => assert!(e.is_expired()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_mismatched_code_consumes_record() {
        let (repo, service) = service(OtpConfig::default());
        let issued = service.issue().await.unwrap();

        let wrong = if issued.code == "100000" { "100001" } else { "100000" };
        let err = service
            .verify(wrong, issued.otp_id.as_str())
            .await
            .unwrap_err();
        match err {
            Error::Otp(e) => assert!(!e.is_expired(), "mismatch is not an expiry"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(repo.len(), 0, "one attempt spends the code");

        // The correct code is now useless.
        let err = service
            .verify(&issued.code, issued.otp_id.as_str())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Otp(OtpError::NotFound)));
    }

    #[tokio::test]
    async fn test_unknown_id_reports_expired() {
        let (_, service) = service(OtpConfig::default());
        let err = service
            .verify("123456", "otp_does-not-exist")
            .await
            .unwrap_err();
        match err {
            Error::Otp(e) => assert!(e.is_expired()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_inputs_leave_state_untouched() {
        let (repo, service) = service(OtpConfig::default());
        let issued = service.issue().await.unwrap();

        let err = service.verify("", issued.otp_id.as_str()).await.unwrap_err();
        assert!(err.is_validation_error());
        let err = service.verify(&issued.code, "  ").await.unwrap_err();
        assert!(err.is_validation_error());
        assert_eq!(repo.len(), 1, "validation failures must not consume");

        // The record is still redeemable afterward.
        service
            .verify(&issued.code, issued.otp_id.as_str())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_elapsed_window_reports_expired() {
        let (repo, service) = service(OtpConfig {
            expires_in: Duration::zero(),
        });
        let issued = service.issue().await.unwrap();

        sleep(StdDuration::from_millis(5)).await;

        let err = service
            .verify(&issued.code, issued.otp_id.as_str())
            .await
            .unwrap_err();
        match err {
            Error::Otp(e) => {
                assert!(matches!(e, OtpError::Expired));
                assert!(e.is_expired());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(repo.len(), 0, "expired record is deleted on verify");
    }

    #[tokio::test]
    async fn test_issue_sweeps_aged_records() {
        let (repo, service) = service(OtpConfig {
            expires_in: Duration::zero(),
        });
        let stale = service.issue().await.unwrap();
        assert_eq!(repo.len(), 1);

        sleep(StdDuration::from_millis(5)).await;

        // Issuing again purges the aged record before storing the new one.
        let fresh = service.issue().await.unwrap();
        assert_eq!(repo.len(), 1);
        assert!(
            repo.records
                .lock()
                .unwrap()
                .contains_key(&fresh.otp_id)
        );
        assert!(
            !repo
                .records
                .lock()
                .unwrap()
                .contains_key(&stale.otp_id)
        );
    }
}
