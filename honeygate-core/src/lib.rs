//! Core functionality for the honeygate project
//!
//! This crate contains the authentication decision engine behind the
//! honeygate login-security demonstration: trap-account ("honeyuser")
//! detection, typo-tolerant password checking, attempt-based lockout, and
//! short-lived single-use one-time passcodes, orchestrated by a fixed
//! decision flow.
//!
//! State lives behind the repository traits in [`repositories`]; this
//! crate ships no storage implementation. Pair it with a backend crate
//! (such as `honeygate-storage-memory`) or use the `honeygate` facade,
//! which wires everything together.
//!
//! See [`services::LoginService`] for the decision flow and
//! [`services::login::LoginOutcome`] for the request/response contract it
//! produces.

pub mod error;
pub mod honeyuser;
pub mod id;
pub mod password;
pub mod repositories;
pub mod services;
pub mod storage;

pub use error::Error;
pub use honeyuser::HoneyuserDetector;
pub use password::{PasswordChecker, PasswordVerdict};
pub use services::{
    AttemptLogger, FileAttemptLogger, LockoutService, LoginOutcome, LoginRequest, LoginService,
    OtpService, TracingAttemptLogger,
};
pub use storage::{
    AttemptRecord, IssuedOtp, LockoutConfig, LockoutStatus, OtpConfig, OtpId, OtpRecord,
};
