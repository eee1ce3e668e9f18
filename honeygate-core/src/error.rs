use thiserror::Error;

/// Top-level error type for honeygate operations.
///
/// User-facing authentication rejections (trap accounts, lockout, wrong or
/// mistyped passwords) are not errors: they are reported as
/// [`LoginOutcome`](crate::services::login::LoginOutcome) variants. This type
/// covers input validation failures, one-time-passcode verification failures,
/// and faults in the storage backend.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("OTP error: {0}")]
    Otp(#[from] OtpError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Failures of one-time-passcode verification.
///
/// Every variant except a validation failure consumes the stored passcode:
/// one verification attempt spends the code regardless of its outcome.
#[derive(Debug, Error)]
pub enum OtpError {
    /// No passcode is stored under the given identifier. Callers cannot
    /// distinguish this from a passcode that already aged out and was
    /// swept, so it reports as expired.
    #[error("OTP not found or expired")]
    NotFound,

    #[error("OTP expired")]
    Expired,

    #[error("Invalid OTP code")]
    Mismatch,
}

impl OtpError {
    /// Whether this failure should be reported to callers with the
    /// `expired` marker. An unknown identifier is indistinguishable from a
    /// true expiry.
    pub fn is_expired(&self) -> bool {
        matches!(self, OtpError::NotFound | OtpError::Expired)
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Connection error: {0}")]
    Connection(String),
}

impl Error {
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    pub fn is_otp_error(&self) -> bool {
        matches!(self, Error::Otp(_))
    }

    /// Storage faults are the only category a caller should surface as a
    /// generic internal failure; everything else carries a specific,
    /// user-reportable message.
    pub fn is_storage_error(&self) -> bool {
        matches!(self, Error::Storage(_))
    }
}
