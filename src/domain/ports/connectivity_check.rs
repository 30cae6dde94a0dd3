//! Connectivity Check Port
//!
//! Defines the interface for probing whether databases accept connections.
//! Implementations may talk to PostgreSQL, SQLite, or be scripted in tests.

use crate::domain::entities::CheckError;
use crate::domain::value_objects::DatabaseId;
use async_trait::async_trait;

/// Check that a set of databases is reachable.
///
/// This is an outbound port that the readiness prober calls once per
/// attempt. Failures are categorized by [`CheckError::kind`] so the
/// prober can tell transient failures from fatal ones.
#[async_trait]
pub trait ConnectivityCheck: Send + Sync {
    /// Probe every database in `databases`.
    ///
    /// Returns `Ok(())` only if all of them are reachable.
    async fn check(&self, databases: &[DatabaseId]) -> Result<(), CheckError>;
}
