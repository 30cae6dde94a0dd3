mod database_connectivity_check;
mod postgres_probe;
mod sqlite_probe;
mod tokio_sleeper;

pub use database_connectivity_check::DatabaseConnectivityCheck;
pub use tokio_sleeper::TokioSleeper;
