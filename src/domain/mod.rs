//! Domain Layer
//!
//! Entities, value objects, ports and the readiness prober.
//! Nothing in here talks to a database directly.

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
