use crate::domain::entities::DatabaseTarget;
use crate::domain::services::ProberConfig;
use crate::domain::value_objects::{DatabaseId, DatabaseUrl, ErrorKind};
use anyhow::{bail, Context};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::time::Duration;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost:5432/postgres";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// A named database from the environment.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct DatabaseEntry {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    // Databases to wait for
    pub databases: Vec<DatabaseEntry>,

    // Retry settings
    pub retry_delay_ms: u64,
    pub max_attempts: u32,
    pub transient_kinds: Vec<ErrorKind>,

    // Probe settings
    pub connect_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            databases: vec![DatabaseEntry {
                name: DatabaseId::DEFAULT.to_string(),
                url: DEFAULT_DATABASE_URL.to_string(),
            }],
            retry_delay_ms: 1000,
            max_attempts: 0,
            transient_kinds: ErrorKind::DEFAULT_TRANSIENT.to_vec(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Identifiers of all configured databases, in configuration order.
    pub fn database_ids(&self) -> Vec<DatabaseId> {
        self.databases
            .iter()
            .map(|d| DatabaseId::new(d.name.clone()))
            .collect()
    }

    /// Resolve configured databases into probe targets.
    pub fn targets(&self) -> anyhow::Result<Vec<DatabaseTarget>> {
        self.databases
            .iter()
            .map(|d| -> anyhow::Result<DatabaseTarget> {
                let url: DatabaseUrl = d
                    .url
                    .parse()
                    .with_context(|| format!("invalid url for database '{}'", d.name))?;
                Ok(DatabaseTarget::new(DatabaseId::new(d.name.clone()), url))
            })
            .collect()
    }

    pub fn prober_config(&self) -> ProberConfig {
        ProberConfig {
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            max_attempts: NonZeroU32::new(self.max_attempts),
            ..Default::default()
        }
        .with_transient_kinds(self.transient_kinds.iter().copied())
    }

    /// Per-attempt connection timeout. Zero is not a usable timeout and
    /// falls back to the default.
    pub fn connect_timeout(&self) -> Duration {
        match self.connect_timeout_secs {
            0 => Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            secs => Duration::from_secs(secs),
        }
    }
}

pub fn load_config() -> anyhow::Result<Config> {
    load_config_from(|key| std::env::var(key).ok())
}

/// Build the configuration from an arbitrary variable lookup.
pub fn load_config_from<F>(var: F) -> anyhow::Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let databases = match var("WAITFORDB_DATABASES") {
        Some(list) => parse_databases(&list)?,
        None => vec![DatabaseEntry {
            name: DatabaseId::DEFAULT.to_string(),
            url: var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
        }],
    };

    for db in &databases {
        db.url
            .parse::<DatabaseUrl>()
            .with_context(|| format!("invalid url for database '{}'", db.name))?;
    }

    let retry_delay_ms = var("WAITFORDB_RETRY_DELAY_MS")
        .and_then(|v| v.parse().ok())
        .unwrap_or(1000);

    // 0 = unbounded
    let max_attempts = var("WAITFORDB_MAX_ATTEMPTS")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    let connect_timeout_secs = match var("WAITFORDB_CONNECT_TIMEOUT_SECS")
        .and_then(|v| v.parse::<u64>().ok())
    {
        Some(0) => {
            tracing::warn!(
                "WAITFORDB_CONNECT_TIMEOUT_SECS=0 would time out every attempt, using {}",
                DEFAULT_CONNECT_TIMEOUT_SECS
            );
            DEFAULT_CONNECT_TIMEOUT_SECS
        }
        Some(secs) => secs,
        None => DEFAULT_CONNECT_TIMEOUT_SECS,
    };

    let transient_kinds = match var("WAITFORDB_TRANSIENT_KINDS") {
        Some(list) => parse_transient_kinds(&list),
        None => ErrorKind::DEFAULT_TRANSIENT.to_vec(),
    };

    Ok(Config {
        databases,
        retry_delay_ms,
        max_attempts,
        transient_kinds,
        connect_timeout_secs,
    })
}

/// Parse `name=url,name=url`.
fn parse_databases(list: &str) -> anyhow::Result<Vec<DatabaseEntry>> {
    let mut entries: Vec<DatabaseEntry> = Vec::new();

    for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let Some((name, url)) = item.split_once('=') else {
            bail!("database entry '{}' is not of the form name=url", item);
        };
        let name = name.trim();
        if name.is_empty() {
            bail!("database entry '{}' has an empty name", item);
        }
        if entries.iter().any(|e| e.name == name) {
            bail!("database '{}' is configured twice", name);
        }
        entries.push(DatabaseEntry {
            name: name.to_string(),
            url: url.trim().to_string(),
        });
    }

    if entries.is_empty() {
        bail!("WAITFORDB_DATABASES is set but lists no databases");
    }

    Ok(entries)
}

fn parse_transient_kinds(list: &str) -> Vec<ErrorKind> {
    let kinds: Vec<ErrorKind> = list
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse::<ErrorKind>() {
            Ok(kind) => Some(kind),
            Err(e) => {
                tracing::warn!("ignoring transient kind: {}", e);
                None
            }
        })
        .collect();

    if kinds.is_empty() {
        tracing::warn!("no transient kinds configured, every failed attempt is fatal");
    }

    kinds
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tracing_test::traced_test;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        load_config_from(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.database_ids(), vec![DatabaseId::default()]);
        assert_eq!(cfg.retry_delay_ms, 1000);
        assert_eq!(cfg.max_attempts, 0);
        assert_eq!(cfg.connect_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_load_config_defaults() {
        let cfg = load(&[]).unwrap();
        assert_eq!(cfg.databases.len(), 1);
        assert_eq!(cfg.databases[0].name, "default");
        assert_eq!(cfg.databases[0].url, DEFAULT_DATABASE_URL);
        assert_eq!(cfg.retry_delay_ms, 1000);
        assert_eq!(cfg.connect_timeout_secs, 5);
        assert_eq!(cfg.transient_kinds, ErrorKind::DEFAULT_TRANSIENT.to_vec());
    }

    #[test]
    fn test_load_config_database_url() {
        let cfg = load(&[("DATABASE_URL", "postgres://app@db:5432/app")]).unwrap();
        assert_eq!(cfg.databases[0].url, "postgres://app@db:5432/app");
    }

    #[test]
    fn test_load_config_database_list() {
        let cfg = load(&[(
            "WAITFORDB_DATABASES",
            "default=postgres://db/app, cache = sqlite:///tmp/cache.db",
        )])
        .unwrap();

        assert_eq!(
            cfg.database_ids(),
            vec![DatabaseId::default(), DatabaseId::from("cache")]
        );
        let targets = cfg.targets().unwrap();
        assert_eq!(targets[1].url, DatabaseUrl::Sqlite("/tmp/cache.db".into()));
    }

    #[test]
    fn test_database_list_overrides_database_url() {
        let cfg = load(&[
            ("DATABASE_URL", "postgres://ignored/app"),
            ("WAITFORDB_DATABASES", "main=postgres://db/app"),
        ])
        .unwrap();
        assert_eq!(cfg.database_ids(), vec![DatabaseId::from("main")]);
    }

    #[test]
    fn test_load_config_rejects_malformed_entry() {
        assert!(load(&[("WAITFORDB_DATABASES", "postgres://db/app")]).is_err());
        assert!(load(&[("WAITFORDB_DATABASES", "=postgres://db/app")]).is_err());
        assert!(load(&[("WAITFORDB_DATABASES", " , ")]).is_err());
    }

    #[test]
    fn test_load_config_rejects_duplicate_name() {
        let err = load(&[(
            "WAITFORDB_DATABASES",
            "a=sqlite:a.db,a=sqlite:b.db",
        )])
        .unwrap_err();
        assert!(err.to_string().contains("twice"));
    }

    #[test]
    fn test_load_config_rejects_unsupported_scheme() {
        assert!(load(&[("DATABASE_URL", "mysql://db/app")]).is_err());
    }

    #[test]
    fn test_load_config_retry_settings() {
        let cfg = load(&[
            ("WAITFORDB_RETRY_DELAY_MS", "250"),
            ("WAITFORDB_MAX_ATTEMPTS", "30"),
            ("WAITFORDB_CONNECT_TIMEOUT_SECS", "2"),
        ])
        .unwrap();

        let prober = cfg.prober_config();
        assert_eq!(prober.retry_delay, Duration::from_millis(250));
        assert_eq!(prober.max_attempts, NonZeroU32::new(30));
        assert_eq!(cfg.connect_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_load_config_zero_attempts_is_unbounded() {
        let cfg = load(&[("WAITFORDB_MAX_ATTEMPTS", "0")]).unwrap();
        assert!(cfg.prober_config().max_attempts.is_none());
    }

    #[test]
    fn test_load_config_parse_error_uses_default() {
        let cfg = load(&[("WAITFORDB_RETRY_DELAY_MS", "soon")]).unwrap();
        assert_eq!(cfg.retry_delay_ms, 1000); // default
    }

    #[test]
    fn test_load_config_transient_kinds() {
        let cfg = load(&[(
            "WAITFORDB_TRANSIENT_KINDS",
            "database_starting, bogus, authentication, database_starting",
        )])
        .unwrap();

        assert_eq!(
            cfg.prober_config().transient_kinds(),
            &[ErrorKind::DatabaseStarting, ErrorKind::Authentication]
        );
    }

    #[test]
    #[traced_test]
    fn test_unknown_transient_kind_is_logged() {
        let cfg = load(&[("WAITFORDB_TRANSIENT_KINDS", "server_unavailable,databse_starting")])
            .unwrap();

        assert_eq!(cfg.transient_kinds, vec![ErrorKind::ServerUnavailable]);
        assert!(logs_contain("ignoring transient kind"));
        assert!(logs_contain("databse_starting"));
    }

    #[test]
    #[traced_test]
    fn test_all_transient_kinds_unknown_is_logged() {
        let cfg = load(&[("WAITFORDB_TRANSIENT_KINDS", "bogus")]).unwrap();

        assert!(cfg.prober_config().transient_kinds().is_empty());
        assert!(logs_contain("no transient kinds configured"));
    }

    #[test]
    #[traced_test]
    fn test_load_config_zero_connect_timeout_uses_default() {
        let cfg = load(&[("WAITFORDB_CONNECT_TIMEOUT_SECS", "0")]).unwrap();

        assert_eq!(cfg.connect_timeout_secs, 5);
        assert_eq!(cfg.connect_timeout(), Duration::from_secs(5));
        assert!(logs_contain("WAITFORDB_CONNECT_TIMEOUT_SECS=0"));
    }

    #[test]
    fn test_zero_connect_timeout_falls_back() {
        let cfg = Config {
            connect_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(cfg.connect_timeout(), Duration::from_secs(5));
    }
}
