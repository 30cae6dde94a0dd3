//! PostgreSQL Connectivity Probe
//!
//! Opens a single connection with sqlx, pings it and closes it.
//! Failures are mapped onto [`ErrorKind`] from the transport error or
//! the server's SQLSTATE.

use crate::domain::entities::CheckError;
use crate::domain::value_objects::ErrorKind;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use std::str::FromStr;
use std::time::Duration;

/// Probe a PostgreSQL server.
///
/// `connect_timeout` bounds the whole exchange: connect, ping and close.
pub(crate) async fn probe(url: &str, connect_timeout: Duration) -> Result<(), CheckError> {
    let options = PgConnectOptions::from_str(url).map_err(to_check_error)?;

    match tokio::time::timeout(connect_timeout, connect_and_ping(&options)).await {
        Ok(result) => result,
        Err(_) => Err(CheckError::new(
            ErrorKind::ServerUnavailable,
            format!("connection timeout after {:?}", connect_timeout),
        )),
    }
}

async fn connect_and_ping(options: &PgConnectOptions) -> Result<(), CheckError> {
    let mut conn = PgConnection::connect_with(options)
        .await
        .map_err(to_check_error)?;

    conn.ping().await.map_err(to_check_error)?;

    if let Err(e) = conn.close().await {
        tracing::debug!("error closing probe connection: {}", e);
    }

    Ok(())
}

fn to_check_error(err: sqlx::Error) -> CheckError {
    CheckError::new(classify(&err), err.to_string())
}

/// Map a sqlx error onto an error kind.
pub(crate) fn classify(err: &sqlx::Error) -> ErrorKind {
    match err {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut => ErrorKind::ServerUnavailable,
        sqlx::Error::Configuration(_) | sqlx::Error::Tls(_) => ErrorKind::Configuration,
        sqlx::Error::Database(db) => db
            .code()
            .as_deref()
            .map(kind_for_sqlstate)
            .unwrap_or(ErrorKind::Other),
        _ => ErrorKind::Other,
    }
}

/// Map a PostgreSQL SQLSTATE onto an error kind.
pub(crate) fn kind_for_sqlstate(code: &str) -> ErrorKind {
    match code {
        // admin_shutdown, crash_shutdown, cannot_connect_now ("the database system is starting up")
        "57P01" | "57P02" | "57P03" => ErrorKind::DatabaseStarting,
        // invalid_authorization_specification, invalid_password
        "28000" | "28P01" => ErrorKind::Authentication,
        _ => ErrorKind::Other,
    }
}
