//! Value Objects - Immutable domain primitives
//!
//! Value objects are identified by their value rather than identity.
//! They are immutable and can be freely shared.

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Identifier of a configured database (e.g. `default`).
///
/// The identifier is what the connectivity check is asked about; the
/// URL it resolves to lives in the adapter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DatabaseId(String);

impl DatabaseId {
    /// Identifier used when only one database is configured.
    pub const DEFAULT: &'static str = "default";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DatabaseId {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}

impl fmt::Display for DatabaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DatabaseId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Category of a failed connectivity check.
///
/// The readiness prober never inspects error messages, only the kind:
/// membership of the kind in the configured transient set decides whether
/// a failure is retried or propagated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The server is not accepting connections yet (refused, unreachable, timed out)
    ServerUnavailable,
    /// The server accepts connections but the database is still starting up
    DatabaseStarting,
    /// Credentials were rejected
    Authentication,
    /// The target is misconfigured (bad URL, unknown database id)
    Configuration,
    /// Anything else
    Other,
}

impl ErrorKind {
    /// Kinds retried when nothing else is configured.
    pub const DEFAULT_TRANSIENT: [ErrorKind; 2] =
        [ErrorKind::ServerUnavailable, ErrorKind::DatabaseStarting];

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ServerUnavailable => "server_unavailable",
            Self::DatabaseStarting => "database_starting",
            Self::Authentication => "authentication",
            Self::Configuration => "configuration",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorKind {
    type Err = UnknownErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "server_unavailable" => Ok(Self::ServerUnavailable),
            "database_starting" => Ok(Self::DatabaseStarting),
            "authentication" => Ok(Self::Authentication),
            "configuration" => Ok(Self::Configuration),
            "other" => Ok(Self::Other),
            _ => Err(UnknownErrorKind(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown error kind: {0}")]
pub struct UnknownErrorKind(pub String);

/// Where a database lives, by engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseUrl {
    /// `postgres://` or `postgresql://` connection string, kept verbatim
    Postgres(String),
    /// Path to a SQLite database file
    Sqlite(PathBuf),
}

impl DatabaseUrl {
    /// Engine name, for logging.
    pub fn engine(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Sqlite(_) => "sqlite",
        }
    }
}

impl FromStr for DatabaseUrl {
    type Err = InvalidDatabaseUrl;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with("postgres://") || s.starts_with("postgresql://") {
            return Ok(Self::Postgres(s.to_string()));
        }

        let path = s
            .strip_prefix("sqlite://")
            .or_else(|| s.strip_prefix("sqlite:"))
            .ok_or_else(|| InvalidDatabaseUrl::UnsupportedScheme(s.to_string()))?;

        if path.is_empty() {
            return Err(InvalidDatabaseUrl::MissingPath(s.to_string()));
        }

        Ok(Self::Sqlite(PathBuf::from(path)))
    }
}

/// Rejected database URL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidDatabaseUrl {
    #[error("unsupported database url scheme: {0}")]
    UnsupportedScheme(String),
    #[error("sqlite url has no path: {0}")]
    MissingPath(String),
}
