//! Domain Entities - Core business objects
//!
//! These entities represent the core concepts of the readiness domain.
//! They have no external dependencies and contain only business logic.

use crate::domain::value_objects::{DatabaseId, DatabaseUrl, ErrorKind};
use std::time::Duration;

/// A database the command waits for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseTarget {
    /// Identifier the check is asked about
    pub id: DatabaseId,
    /// Where the database lives
    pub url: DatabaseUrl,
}

impl DatabaseTarget {
    pub fn new(id: DatabaseId, url: DatabaseUrl) -> Self {
        Self { id, url }
    }
}

/// A failed connectivity check.
///
/// Carries a kind the prober classifies on, and a human-readable message
/// that only ends up in logs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}{}: {message}", database_suffix(.database))]
pub struct CheckError {
    /// Failure category
    pub kind: ErrorKind,
    /// Database that failed, when known
    pub database: Option<DatabaseId>,
    /// Description from the driver
    pub message: String,
}

impl CheckError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            database: None,
            message: message.into(),
        }
    }

    /// Attach the database the failure belongs to.
    pub fn for_database(mut self, database: DatabaseId) -> Self {
        self.database = Some(database);
        self
    }
}

fn database_suffix(database: &Option<DatabaseId>) -> String {
    database
        .as_ref()
        .map(|db| format!(" ({})", db))
        .unwrap_or_default()
}

/// Outcome of one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The check succeeded
    Ready,
    /// The check failed with a transient kind and will be retried
    NotReady(ErrorKind),
}

/// A single probe, as seen by attempt observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeAttempt {
    /// Attempt number, starting at 1
    pub number: u32,
    /// What the probe observed
    pub outcome: ProbeOutcome,
    /// How long the check took
    pub latency: Duration,
}
