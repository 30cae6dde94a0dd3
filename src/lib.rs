//! wait-for-db Library
//!
//! This module exposes the wait-for-db components for use in integration tests
//! and as a library.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;

// Re-export commonly used types
pub use adapters::outbound::{DatabaseConnectivityCheck, TokioSleeper};
pub use application::WaitForDb;
pub use config::{load_config, Config};
pub use domain::entities::{CheckError, DatabaseTarget, ProbeAttempt, ProbeOutcome};
pub use domain::ports::{ConnectivityCheck, Sleeper};
pub use domain::services::{
    ProbeError, ProberConfig, ProberState, ReadinessProber, ReadinessReport,
};
pub use domain::value_objects::{DatabaseId, DatabaseUrl, ErrorKind};
