//! SQLite Connectivity Probe
//!
//! Opens the database file read-only and reads its schema version.
//! The file is never created; a missing file means the database is
//! not there yet.

use crate::domain::entities::CheckError;
use crate::domain::value_objects::ErrorKind;
use rusqlite::{Connection, ErrorCode, OpenFlags};
use std::path::{Path, PathBuf};

/// Probe a SQLite database file.
pub(crate) async fn probe(path: PathBuf) -> Result<(), CheckError> {
    match tokio::task::spawn_blocking(move || open_and_query(&path)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(CheckError::new(classify(&e), e.to_string())),
        Err(e) => Err(CheckError::new(
            ErrorKind::Other,
            format!("spawn_blocking error: {}", e),
        )),
    }
}

fn open_and_query(path: &Path) -> rusqlite::Result<()> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    conn.query_row("PRAGMA schema_version", [], |row| row.get::<_, i64>(0))?;
    Ok(())
}

/// Map a rusqlite error onto an error kind.
pub(crate) fn classify(err: &rusqlite::Error) -> ErrorKind {
    match err.sqlite_error_code() {
        Some(ErrorCode::CannotOpen) => ErrorKind::ServerUnavailable,
        Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
            ErrorKind::DatabaseStarting
        }
        _ => ErrorKind::Other,
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use rusqlite::ffi;
    use tempfile::TempDir;

    fn sqlite_failure(code: std::os::raw::c_int) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(ffi::Error::new(code), None)
    }

    #[test]
    fn test_classify_codes() {
        assert_eq!(
            classify(&sqlite_failure(ffi::SQLITE_CANTOPEN)),
            ErrorKind::ServerUnavailable
        );
        assert_eq!(
            classify(&sqlite_failure(ffi::SQLITE_BUSY)),
            ErrorKind::DatabaseStarting
        );
        assert_eq!(
            classify(&sqlite_failure(ffi::SQLITE_LOCKED)),
            ErrorKind::DatabaseStarting
        );
        assert_eq!(classify(&sqlite_failure(ffi::SQLITE_NOTADB)), ErrorKind::Other);
        assert_eq!(classify(&rusqlite::Error::QueryReturnedNoRows), ErrorKind::Other);
    }

    #[tokio::test]
    async fn test_probe_existing_database() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE users (id INTEGER PRIMARY KEY);")
            .unwrap();
        drop(conn);

        assert!(probe(path).await.is_ok());
    }

    #[tokio::test]
    async fn test_probe_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.db");

        let err = probe(path.clone()).await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::ServerUnavailable);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_probe_not_a_database() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("garbage.db");
        std::fs::write(&path, vec![0x42u8; 4096]).unwrap();

        let err = probe(path).await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::Other);
    }
}
