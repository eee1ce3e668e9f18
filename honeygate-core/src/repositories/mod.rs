//! Repository traits for the data access layer
//!
//! Attempt and OTP records live behind repository traits rather than
//! ambient process-wide maps, so storage can be injected, isolated per
//! test, and eventually swapped for something persistent.
//!
//! The hierarchy follows a composable shape:
//!
//! - individual `*Repository` traits define the operations per data domain
//! - individual `*RepositoryProvider` traits expose each repository type
//! - [`RepositoryProvider`] is a supertrait combining the providers plus a
//!   health check

pub mod adapter;
pub mod lockout;
pub mod otp;

pub use adapter::{LockoutRepositoryAdapter, OtpRepositoryAdapter};
pub use lockout::LockoutRepository;
pub use otp::OtpRepository;

use async_trait::async_trait;

use crate::Error;

/// Provider trait for lockout repository access.
pub trait LockoutRepositoryProvider: Send + Sync + 'static {
    /// The lockout repository implementation type
    type LockoutRepo: LockoutRepository;

    /// Get the lockout repository
    fn lockout(&self) -> &Self::LockoutRepo;
}

/// Provider trait for OTP repository access.
pub trait OtpRepositoryProvider: Send + Sync + 'static {
    /// The OTP repository implementation type
    type OtpRepo: OtpRepository;

    /// Get the OTP repository
    fn otp(&self) -> &Self::OtpRepo;
}

/// Provider trait that storage backends implement to hand out all
/// repositories.
///
/// Backends implement each `*Repository` trait, each `*RepositoryProvider`
/// trait, and then this supertrait. There is deliberately no migration
/// hook: the reference backend is in-memory and has nothing to migrate.
#[async_trait]
pub trait RepositoryProvider: LockoutRepositoryProvider + OtpRepositoryProvider {
    /// Health check for all repositories
    async fn health_check(&self) -> Result<(), Error>;
}
