//! Record, status, and configuration types shared by services and storage
//! backends.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{generate_opaque_id, validate_opaque_id};

/// Prefix carried by every OTP identifier.
const OTP_ID_PREFIX: &str = "otp";

/// Opaque identifier under which an issued one-time passcode is stored.
///
/// Treat the value as opaque: it carries no meaning beyond being
/// unpredictable and unique per issuance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OtpId(String);

impl OtpId {
    pub fn new(id: &str) -> Self {
        OtpId(id.to_string())
    }

    pub fn new_random() -> Self {
        OtpId(generate_opaque_id(OTP_ID_PREFIX))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Validate that this identifier has the issued format.
    pub fn is_valid(&self) -> bool {
        validate_opaque_id(&self.0, OTP_ID_PREFIX)
    }
}

impl From<String> for OtpId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OtpId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for OtpId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-username failed-attempt record.
///
/// Invariant: `locked_until` is only ever set once `failure_count` has
/// reached the configured threshold, and is never moved afterward. Once the
/// wall clock passes `locked_until` the record is stale and must be treated
/// as absent wherever it is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    pub failure_count: u32,
    pub locked_until: Option<DateTime<Utc>>,
}

impl AttemptRecord {
    /// Whether the lockout window has already passed.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| now >= until)
    }

    /// Whether the record locks out attempts at the given instant.
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| now < until)
    }
}

/// A stored one-time passcode awaiting its single verification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpRecord {
    pub id: OtpId,
    pub code: String,
    pub issued_at: DateTime<Utc>,
}

impl OtpRecord {
    /// Whether the expiration window has elapsed at the given instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now - self.issued_at > window
    }
}

/// Snapshot of a username's lockout state.
#[derive(Debug, Clone, Serialize)]
pub struct LockoutStatus {
    pub username: String,
    pub failed_attempts: u32,
    pub is_locked: bool,
    pub locked_until: Option<DateTime<Utc>>,
}

impl LockoutStatus {
    pub(crate) fn unlocked(username: &str) -> Self {
        Self {
            username: username.to_string(),
            failed_attempts: 0,
            is_locked: false,
            locked_until: None,
        }
    }

    /// The lockout deadline, if the status is an active lockout.
    pub fn active_until(&self) -> Option<DateTime<Utc>> {
        if self.is_locked { self.locked_until } else { None }
    }

    /// Seconds until the lockout lifts, if locked.
    pub fn retry_after_seconds(&self) -> Option<i64> {
        self.active_until()
            .map(|until| (until - Utc::now()).num_seconds().max(0))
    }
}

/// A freshly issued one-time passcode.
///
/// The code travels next to its redemption id because this is a
/// demonstration; an out-of-band delivery channel would carry the code in a
/// production variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedOtp {
    pub code: String,
    pub otp_id: OtpId,
    pub expires_in_ms: i64,
}

/// Configuration for the lockout tracker.
#[derive(Debug, Clone)]
pub struct LockoutConfig {
    /// Failed attempts after which a username is locked out.
    pub max_failed_attempts: u32,
    /// How long a lockout lasts, fixed from the threshold crossing.
    pub lockout_duration: Duration,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            max_failed_attempts: 3,
            lockout_duration: Duration::minutes(5),
        }
    }
}

/// Configuration for the OTP manager.
#[derive(Debug, Clone)]
pub struct OtpConfig {
    /// Window after issuance during which a passcode verifies.
    pub expires_in: Duration,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            expires_in: Duration::seconds(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_id_random_format() {
        let id = OtpId::new_random();
        assert!(id.is_valid());
        assert!(id.as_str().starts_with("otp_"));
        assert_ne!(id, OtpId::new_random());
    }

    #[test]
    fn test_otp_id_from_caller_input() {
        let id = OtpId::from("otp_bogus");
        assert_eq!(id.as_str(), "otp_bogus");
        assert!(!id.is_valid());
    }

    #[test]
    fn test_attempt_record_staleness() {
        let now = Utc::now();
        let tracking = AttemptRecord {
            failure_count: 2,
            locked_until: None,
        };
        assert!(!tracking.is_stale(now));
        assert!(!tracking.is_locked_at(now));

        let locked = AttemptRecord {
            failure_count: 3,
            locked_until: Some(now + Duration::minutes(5)),
        };
        assert!(!locked.is_stale(now));
        assert!(locked.is_locked_at(now));
        assert!(locked.is_stale(now + Duration::minutes(5)));
        assert!(!locked.is_locked_at(now + Duration::minutes(5)));
    }

    #[test]
    fn test_otp_record_expiry_window() {
        let issued_at = Utc::now();
        let record = OtpRecord {
            id: OtpId::new_random(),
            code: "123456".to_string(),
            issued_at,
        };
        let window = Duration::seconds(30);
        assert!(!record.is_expired_at(issued_at, window));
        assert!(!record.is_expired_at(issued_at + Duration::seconds(30), window));
        assert!(record.is_expired_at(issued_at + Duration::seconds(31), window));
    }

    #[test]
    fn test_lockout_status_retry_after() {
        let status = LockoutStatus {
            username: "alice".to_string(),
            failed_attempts: 3,
            is_locked: true,
            locked_until: Some(Utc::now() + Duration::minutes(5)),
        };
        let retry_after = status.retry_after_seconds().unwrap();
        assert!(retry_after > 290 && retry_after <= 300);

        assert!(
            LockoutStatus::unlocked("alice")
                .retry_after_seconds()
                .is_none()
        );
    }

    #[test]
    fn test_default_configs_match_policy() {
        let lockout = LockoutConfig::default();
        assert_eq!(lockout.max_failed_attempts, 3);
        assert_eq!(lockout.lockout_duration, Duration::minutes(5));

        let otp = OtpConfig::default();
        assert_eq!(otp.expires_in, Duration::seconds(30));
    }
}
