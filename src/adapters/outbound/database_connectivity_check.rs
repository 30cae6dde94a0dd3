//! Database Connectivity Check
//!
//! Implements ConnectivityCheck over the configured database targets,
//! dispatching each one to the PostgreSQL or SQLite probe by URL scheme.

use super::{postgres_probe, sqlite_probe};
use crate::domain::entities::{CheckError, DatabaseTarget};
use crate::domain::ports::ConnectivityCheck;
use crate::domain::value_objects::{DatabaseId, DatabaseUrl, ErrorKind};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// Connectivity check backed by real database connections.
///
/// Databases are probed one after the other in the order requested;
/// the first failure ends the check.
pub struct DatabaseConnectivityCheck {
    targets: HashMap<DatabaseId, DatabaseUrl>,
    connect_timeout: Duration,
}

impl DatabaseConnectivityCheck {
    /// Create a check over the given targets.
    ///
    /// A later target with the same id replaces an earlier one.
    pub fn new<I>(targets: I, connect_timeout: Duration) -> Self
    where
        I: IntoIterator<Item = DatabaseTarget>,
    {
        Self {
            targets: targets.into_iter().map(|t| (t.id, t.url)).collect(),
            connect_timeout,
        }
    }

    async fn check_one(&self, id: &DatabaseId) -> Result<(), CheckError> {
        let url = self.targets.get(id).ok_or_else(|| {
            CheckError::new(
                ErrorKind::Configuration,
                format!("no connection configured for database '{}'", id),
            )
        })?;

        match url {
            DatabaseUrl::Postgres(conn_str) => {
                postgres_probe::probe(conn_str, self.connect_timeout).await?
            }
            DatabaseUrl::Sqlite(path) => sqlite_probe::probe(path.clone()).await?,
        }

        tracing::debug!("database {} ({}) is reachable", id, url.engine());
        Ok(())
    }
}

#[async_trait]
impl ConnectivityCheck for DatabaseConnectivityCheck {
    async fn check(&self, databases: &[DatabaseId]) -> Result<(), CheckError> {
        for id in databases {
            self.check_one(id)
                .await
                .map_err(|e| e.for_database(id.clone()))?;
        }
        Ok(())
    }
}
