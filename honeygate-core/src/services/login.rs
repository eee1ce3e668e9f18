//! Login decision flow.
//!
//! One entry point orchestrates the trap-account detector, the lockout
//! tracker, the fuzzy credential checker, and the OTP manager in a fixed
//! order, short-circuiting at the first non-pass outcome. Every expected
//! rejection is an [`LoginOutcome`] value; an `Err` escapes only for
//! internal faults.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Error, HoneyuserDetector, PasswordChecker, PasswordVerdict,
    repositories::{LockoutRepository, OtpRepository},
    services::{AttemptLogger, LockoutService, OtpService},
};

/// One submitted login attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub otp_code: Option<String>,
    pub otp_id: Option<String>,
    /// Network address the attempt arrived from, when the caller knows it.
    pub source_address: Option<String>,
    /// Client self-identification (a user-agent string, for HTTP callers).
    pub client_identifier: Option<String>,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            otp_code: None,
            otp_id: None,
            source_address: None,
            client_identifier: None,
        }
    }

    pub fn with_otp(mut self, code: impl Into<String>, id: impl Into<String>) -> Self {
        self.otp_code = Some(code.into());
        self.otp_id = Some(id.into());
        self
    }

    pub fn with_client(
        mut self,
        source_address: impl Into<String>,
        client_identifier: impl Into<String>,
    ) -> Self {
        self.source_address = Some(source_address.into());
        self.client_identifier = Some(client_identifier.into());
        self
    }
}

/// Result of a login attempt.
///
/// Each variant carries a human-readable message and an HTTP-style status
/// code for presentation layers; the enum itself is what callers should
/// branch on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoginOutcome {
    /// The username is a trap account; the attempt was reported.
    Caught,
    /// The username is locked out until the given instant.
    Locked { locked_until: DateTime<Utc> },
    /// Password was correct but no passcode accompanied the request.
    OtpRequired,
    /// Password was correct but the passcode failed verification.
    OtpRejected,
    /// Password was within the typo band. Not counted toward lockout.
    PasswordTypo,
    /// Password was wrong and the failure was recorded.
    PasswordWrong { remaining_attempts: u32 },
    Success,
}

impl LoginOutcome {
    /// HTTP-style status code for this outcome.
    pub fn status_code(&self) -> u16 {
        match self {
            LoginOutcome::Caught => 403,
            LoginOutcome::Locked { .. } => 423,
            LoginOutcome::OtpRequired => 400,
            LoginOutcome::OtpRejected => 400,
            LoginOutcome::PasswordTypo => 400,
            LoginOutcome::PasswordWrong { .. } => 401,
            LoginOutcome::Success => 200,
        }
    }

    /// Human-readable message for this outcome.
    ///
    /// For a lockout the remaining time is computed against the current
    /// wall clock, rounded up to whole minutes.
    pub fn message(&self) -> String {
        match self {
            LoginOutcome::Caught => {
                "We caught you, hacker. This attempt has been logged.".to_string()
            }
            LoginOutcome::Locked { locked_until } => {
                let seconds = (*locked_until - Utc::now()).num_seconds().max(0);
                let minutes = (seconds as u64).div_ceil(60);
                format!("Account locked. Please try again in {minutes} minute(s).")
            }
            LoginOutcome::OtpRequired => "OTP code is required".to_string(),
            LoginOutcome::OtpRejected => "Code is expired / wrong".to_string(),
            LoginOutcome::PasswordTypo => "Wrong password".to_string(),
            LoginOutcome::PasswordWrong { remaining_attempts } => {
                format!("Wrong password. {remaining_attempts} attempt(s) remaining before lockout.")
            }
            LoginOutcome::Success => "Login successful!".to_string(),
        }
    }
}

/// Orchestrates one login attempt end to end.
pub struct LoginService<L: LockoutRepository, O: OtpRepository> {
    detector: HoneyuserDetector,
    checker: PasswordChecker,
    lockout: LockoutService<L>,
    otp: OtpService<O>,
    audit: Arc<dyn AttemptLogger>,
}

impl<L: LockoutRepository, O: OtpRepository> LoginService<L, O> {
    pub fn new(
        detector: HoneyuserDetector,
        checker: PasswordChecker,
        lockout: LockoutService<L>,
        otp: OtpService<O>,
        audit: Arc<dyn AttemptLogger>,
    ) -> Self {
        Self {
            detector,
            checker,
            lockout,
            otp,
            audit,
        }
    }

    pub fn lockout(&self) -> &LockoutService<L> {
        &self.lockout
    }

    pub fn otp(&self) -> &OtpService<O> {
        &self.otp
    }

    /// Decide one login attempt.
    ///
    /// Order: trap account, lockout, password, passcode. Only a wrong
    /// (non-typo) password mutates the lockout tracker; a rejected
    /// passcode does not.
    pub async fn submit(&self, request: &LoginRequest) -> Result<LoginOutcome, Error> {
        if self.detector.is_honeyuser(&request.username) {
            tracing::info!(username = %request.username, "login attempt against trap account");
            if let Err(error) = self
                .audit
                .log_attempt(
                    &request.username,
                    request.source_address.as_deref(),
                    request.client_identifier.as_deref(),
                )
                .await
            {
                // The collaborator must never fail the login response.
                tracing::warn!(%error, "attempt logger failed");
            }
            return Ok(LoginOutcome::Caught);
        }

        let status = self.lockout.get_lockout_status(&request.username).await?;
        if let Some(locked_until) = status.active_until() {
            return Ok(LoginOutcome::Locked { locked_until });
        }

        match self.checker.check(&request.password) {
            PasswordVerdict::Correct => {
                let code = request.otp_code.as_deref().unwrap_or("");
                let otp_id = request.otp_id.as_deref().unwrap_or("");
                if code.trim().is_empty() || otp_id.trim().is_empty() {
                    return Ok(LoginOutcome::OtpRequired);
                }

                match self.otp.verify(code, otp_id).await {
                    Ok(()) => {
                        self.lockout.clear_attempts(&request.username).await?;
                        Ok(LoginOutcome::Success)
                    }
                    // Rejected passcodes never count toward lockout.
                    Err(Error::Otp(_)) => Ok(LoginOutcome::OtpRejected),
                    Err(Error::Validation(_)) => Ok(LoginOutcome::OtpRequired),
                    Err(error) => Err(error),
                }
            }
            PasswordVerdict::Typo => Ok(LoginOutcome::PasswordTypo),
            PasswordVerdict::Wrong => {
                let status = self.lockout.record_failed_attempt(&request.username).await?;
                if let Some(locked_until) = status.active_until() {
                    // This failure crossed the threshold: report the fresh
                    // lockout rather than zero remaining attempts.
                    return Ok(LoginOutcome::Locked { locked_until });
                }

                let remaining = self
                    .lockout
                    .config()
                    .max_failed_attempts
                    .saturating_sub(status.failed_attempts);
                Ok(LoginOutcome::PasswordWrong {
                    remaining_attempts: remaining,
                })
            }
        }
    }
}
