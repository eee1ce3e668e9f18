//! Service layer for the authentication decision engine
//!
//! Concrete services encapsulating lockout tracking, passcode lifecycle,
//! attempt reporting, and the login decision flow itself.

pub mod audit;
pub mod lockout;
pub mod login;
pub mod otp;

pub use audit::{AttemptLogger, FileAttemptLogger, TracingAttemptLogger};
pub use lockout::LockoutService;
pub use login::{LoginOutcome, LoginRequest, LoginService};
pub use otp::OtpService;
