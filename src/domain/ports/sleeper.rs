//! Sleeper Port
//!
//! Defines how the prober waits between attempts.

use async_trait::async_trait;
use std::time::Duration;

/// Suspend the caller for a duration.
///
/// Injected so tests can count sleeps without waiting in real time.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}
