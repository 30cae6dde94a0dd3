//! Wait For DB - Main application use case
//!
//! The named, argument-free operation: block until every configured
//! database is reachable, or fail.

use crate::domain::services::{ProbeError, ReadinessProber, ReadinessReport};
use crate::domain::value_objects::DatabaseId;

/// Wait-for-database use case.
///
/// Owns the target set so every probe asks about the same databases.
pub struct WaitForDb {
    prober: ReadinessProber,
    targets: Vec<DatabaseId>,
}

impl WaitForDb {
    /// Create the use case. Duplicate targets are dropped, first occurrence wins.
    pub fn new(prober: ReadinessProber, targets: Vec<DatabaseId>) -> Self {
        let mut unique: Vec<DatabaseId> = Vec::with_capacity(targets.len());
        for id in targets {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        Self {
            prober,
            targets: unique,
        }
    }

    pub fn targets(&self) -> &[DatabaseId] {
        &self.targets
    }

    /// Run until the databases are ready or a fatal error occurs.
    pub async fn run(&self) -> Result<ReadinessReport, ProbeError> {
        let names: Vec<&str> = self.targets.iter().map(DatabaseId::as_str).collect();
        tracing::info!("waiting for database... targets={}", names.join(","));

        let report = self.prober.wait_until_ready(&self.targets).await?;

        tracing::info!(
            "database available! attempts={} elapsed={:?}",
            report.attempts,
            report.elapsed
        );
        Ok(report)
    }
}
