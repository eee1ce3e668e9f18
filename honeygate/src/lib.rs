//! # Honeygate
//!
//! Honeygate is a small, deliberately readable demonstration of three
//! login-security behaviors:
//!
//! - **Honeyuser traps**: a fixed set of bait usernames whose mere use
//!   flags an intrusion attempt,
//! - **Typo tolerance**: passwords within a small edit distance of the
//!   secret are treated as honest mistakes, not attacks,
//! - **One-time passcodes**: short-lived, single-use 6-digit codes as a
//!   second factor,
//!
//! tied together by an attempt-based lockout tracker and a fixed decision
//! flow. It is an in-memory, single-process reference implementation: no
//! persistence, no sessions, no real credential hashing.
//!
//! The presentation layer (HTTP routes, forms, notifications) is yours;
//! honeygate is the decision engine behind it, called through
//! [`Honeygate::submit_login`], [`Honeygate::request_otp`], and
//! [`Honeygate::check_otp`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use honeygate::{Honeygate, LoginRequest, MemoryRepositoryProvider};
//!
//! #[tokio::main]
//! async fn main() {
//!     let repositories = Arc::new(MemoryRepositoryProvider::new());
//!     let gate = Honeygate::new(repositories).with_secret("SecurePass123!");
//!
//!     let issued = gate.request_otp().await.unwrap();
//!     let request = LoginRequest::new("alice", "SecurePass123!")
//!         .with_otp(issued.code, issued.otp_id.into_inner());
//!
//!     let outcome = gate.submit_login(&request).await.unwrap();
//!     println!("{} ({})", outcome.message(), outcome.status_code());
//! }
//! ```

use std::sync::Arc;

use honeygate_core::{
    HoneyuserDetector, PasswordChecker,
    repositories::{LockoutRepositoryAdapter, OtpRepositoryAdapter, RepositoryProvider},
    services::{LockoutService, LoginService, OtpService, TracingAttemptLogger},
};

/// Re-export core types from honeygate_core
///
/// These types are commonly used when working with the Honeygate API.
pub use honeygate_core::{
    AttemptLogger, Error, FileAttemptLogger, IssuedOtp, LockoutConfig, LockoutStatus,
    LoginOutcome, LoginRequest, OtpConfig, OtpId, PasswordVerdict,
    error::{OtpError, ValidationError},
    honeyuser::DEFAULT_TRAP_USERNAMES,
    password::DEMO_SECRET,
};

/// Re-export storage backends
///
/// Available when the corresponding feature is enabled.
#[cfg(feature = "memory")]
pub use honeygate_storage_memory::MemoryRepositoryProvider;

/// The authentication coordinator that wires services to storage.
///
/// `Honeygate` owns the decision flow and hands each service the
/// repository it needs out of a shared [`RepositoryProvider`]. Configure it
/// with the builder-style `with_*` methods, then drive it through
/// [`submit_login`](Self::submit_login),
/// [`request_otp`](Self::request_otp), and
/// [`check_otp`](Self::check_otp).
pub struct Honeygate<R: RepositoryProvider> {
    repositories: Arc<R>,
    detector: HoneyuserDetector,
    checker: PasswordChecker,
    lockout_config: LockoutConfig,
    otp_config: OtpConfig,
    audit: Arc<dyn AttemptLogger>,
    login: LoginService<LockoutRepositoryAdapter<R>, OtpRepositoryAdapter<R>>,
}

impl<R: RepositoryProvider> Honeygate<R> {
    /// Create a new Honeygate instance with default configuration.
    ///
    /// Defaults: the built-in trap set, the demonstration secret, three
    /// failed attempts before a five-minute lockout, thirty-second
    /// passcodes, and trapped attempts reported via `tracing`.
    pub fn new(repositories: Arc<R>) -> Self {
        let detector = HoneyuserDetector::default();
        let checker = PasswordChecker::default();
        let lockout_config = LockoutConfig::default();
        let otp_config = OtpConfig::default();
        let audit: Arc<dyn AttemptLogger> = Arc::new(TracingAttemptLogger);
        let login = Self::build_login(
            &repositories,
            detector.clone(),
            checker.clone(),
            lockout_config.clone(),
            otp_config.clone(),
            audit.clone(),
        );

        Self {
            repositories,
            detector,
            checker,
            lockout_config,
            otp_config,
            audit,
            login,
        }
    }

    /// Set the secret all login attempts are compared against.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.checker = PasswordChecker::new(secret);
        self.rebuild()
    }

    /// Replace the trap-account username set.
    pub fn with_honeyusers<I, S>(mut self, usernames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.detector = HoneyuserDetector::new(usernames);
        self.rebuild()
    }

    /// Set the lockout policy (attempt threshold and lockout duration).
    pub fn with_lockout_config(mut self, config: LockoutConfig) -> Self {
        self.lockout_config = config;
        self.rebuild()
    }

    /// Set the passcode policy (expiration window).
    pub fn with_otp_config(mut self, config: OtpConfig) -> Self {
        self.otp_config = config;
        self.rebuild()
    }

    /// Replace the collaborator that receives trapped login attempts.
    ///
    /// Use a [`FileAttemptLogger`] for the append-only log-file behavior.
    pub fn with_attempt_logger(mut self, logger: Arc<dyn AttemptLogger>) -> Self {
        self.audit = logger;
        self.rebuild()
    }

    fn rebuild(mut self) -> Self {
        self.login = Self::build_login(
            &self.repositories,
            self.detector.clone(),
            self.checker.clone(),
            self.lockout_config.clone(),
            self.otp_config.clone(),
            self.audit.clone(),
        );
        self
    }

    fn build_login(
        repositories: &Arc<R>,
        detector: HoneyuserDetector,
        checker: PasswordChecker,
        lockout_config: LockoutConfig,
        otp_config: OtpConfig,
        audit: Arc<dyn AttemptLogger>,
    ) -> LoginService<LockoutRepositoryAdapter<R>, OtpRepositoryAdapter<R>> {
        let lockout_repo = Arc::new(LockoutRepositoryAdapter::new(repositories.clone()));
        let otp_repo = Arc::new(OtpRepositoryAdapter::new(repositories.clone()));
        LoginService::new(
            detector,
            checker,
            LockoutService::new(lockout_repo, lockout_config),
            OtpService::new(otp_repo, otp_config),
            audit,
        )
    }

    /// Decide one login attempt.
    ///
    /// Runs the fixed flow (trap account, lockout, password, passcode)
    /// and returns the first non-pass outcome. `Err` is reserved for
    /// internal faults; report those as a generic internal error, never as
    /// an authentication result.
    pub async fn submit_login(&self, request: &LoginRequest) -> Result<LoginOutcome, Error> {
        self.login.submit(request).await
    }

    /// Issue a one-time passcode.
    ///
    /// The response carries the code next to the id used to redeem it.
    /// That is a demonstration shortcut: a production variant would hand
    /// the code to an out-of-band delivery channel and return only the id
    /// and the expiry window.
    pub async fn request_otp(&self) -> Result<IssuedOtp, Error> {
        self.login.otp().issue().await
    }

    /// Verify a passcode outside the login flow.
    ///
    /// Same semantics as the in-flow verification, including single-use
    /// consumption. Distinguish expiry from mismatch via
    /// [`OtpError::is_expired`] on the `Error::Otp` variant.
    pub async fn check_otp(&self, code: &str, otp_id: &str) -> Result<(), Error> {
        self.login.otp().verify(code, otp_id).await
    }

    /// Current lockout status for a username.
    ///
    /// Reading evicts an elapsed lockout record, so a stale lockout
    /// reports as unlocked with a fresh attempt budget.
    pub async fn lockout_status(&self, username: &str) -> Result<LockoutStatus, Error> {
        self.login.lockout().get_lockout_status(username).await
    }

    /// Failed attempts left before the username locks out.
    pub async fn remaining_attempts(&self, username: &str) -> Result<u32, Error> {
        self.login.lockout().remaining_attempts(username).await
    }

    /// Purge every expired record from both stores.
    ///
    /// Expiry is otherwise lazy; call this on a schedule if the stores are
    /// expected to grow under attack traffic.
    pub async fn sweep_expired(&self) -> Result<(), Error> {
        self.login.lockout().sweep_expired().await?;
        self.login.otp().sweep_expired().await?;
        Ok(())
    }

    /// Health check for all repositories
    pub async fn health_check(&self) -> Result<(), Error> {
        self.repositories.health_check().await
    }
}
