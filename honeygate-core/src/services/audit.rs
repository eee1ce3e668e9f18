//! Attempt logging collaborator for honeyuser hits.
//!
//! The decision flow reports trapped login attempts to an [`AttemptLogger`]
//! and otherwise ignores it: a logger failure is noted and must never
//! block or fail the login response.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::AsyncWriteExt;

use crate::{Error, error::StorageError};

/// Receiver for trapped login attempts.
#[async_trait]
pub trait AttemptLogger: Send + Sync + 'static {
    /// Report one trapped attempt.
    ///
    /// `source_address` and `client_identifier` are whatever the caller
    /// knows about the client (an IP address and a user-agent string, for
    /// an HTTP front end).
    async fn log_attempt(
        &self,
        username: &str,
        source_address: Option<&str>,
        client_identifier: Option<&str>,
    ) -> Result<(), Error>;
}

/// Appends one timestamped line per trapped attempt to a log file.
///
/// The file and its parent directory are created on first use; existing
/// content is never rewritten.
pub struct FileAttemptLogger {
    path: PathBuf,
}

impl FileAttemptLogger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl AttemptLogger for FileAttemptLogger {
    async fn log_attempt(
        &self,
        username: &str,
        source_address: Option<&str>,
        client_identifier: Option<&str>,
    ) -> Result<(), Error> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| StorageError::Backend(e.to_string()))?;
        }

        let mut line = format!(
            "[{}] Honeyuser attempt: {username}",
            Utc::now().to_rfc3339()
        );
        if let Some(addr) = source_address {
            line.push_str(&format!(" from {addr}"));
        }
        if let Some(client) = client_identifier {
            line.push_str(&format!(" ({client})"));
        }
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        file.flush()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(())
    }
}

/// Emits each trapped attempt as a structured tracing event.
///
/// The default collaborator: keeps the demonstration free of filesystem
/// side effects unless a file logger is configured explicitly.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAttemptLogger;

#[async_trait]
impl AttemptLogger for TracingAttemptLogger {
    async fn log_attempt(
        &self,
        username: &str,
        source_address: Option<&str>,
        client_identifier: Option<&str>,
    ) -> Result<(), Error> {
        tracing::warn!(
            username,
            source_address,
            client_identifier,
            "honeyuser login attempt"
        );
        Ok(())
    }
}
