//! Adapters Layer
//!
//! Outbound adapters implementing the domain ports against real databases
//! and the tokio timer.

pub mod outbound;
