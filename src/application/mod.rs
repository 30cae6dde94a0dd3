//! Application Layer
//!
//! Use cases wiring domain services to ports.

mod wait_for_db;

pub use wait_for_db::WaitForDb;
