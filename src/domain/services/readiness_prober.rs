//! Readiness Prober
//!
//! Retry loop that waits until the configured databases accept connections.
//! Both the connectivity check and the sleep are injected ports, so this
//! service performs no I/O of its own.

use crate::domain::entities::{CheckError, ProbeAttempt, ProbeOutcome};
use crate::domain::ports::{ConnectivityCheck, Sleeper};
use crate::domain::value_objects::{DatabaseId, ErrorKind};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Prober configuration.
#[derive(Debug, Clone)]
pub struct ProberConfig {
    /// Fixed delay between attempts
    pub retry_delay: Duration,
    /// Give up after this many attempts (None = retry forever)
    pub max_attempts: Option<NonZeroU32>,
    /// Error kinds that are retried, in configuration order
    pub transient_kinds: Vec<ErrorKind>,
}

impl Default for ProberConfig {
    fn default() -> Self {
        Self {
            retry_delay: Duration::from_secs(1),
            max_attempts: None,
            transient_kinds: ErrorKind::DEFAULT_TRANSIENT.to_vec(),
        }
    }
}

impl ProberConfig {
    /// Replace the transient set. Duplicates are dropped, first occurrence wins.
    pub fn with_transient_kinds<I>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = ErrorKind>,
    {
        self.transient_kinds.clear();
        for kind in kinds {
            if !self.transient_kinds.contains(&kind) {
                self.transient_kinds.push(kind);
            }
        }
        self
    }

    pub fn transient_kinds(&self) -> &[ErrorKind] {
        &self.transient_kinds
    }

    /// Whether a failure of this kind is retried.
    pub fn is_transient(&self, kind: ErrorKind) -> bool {
        self.transient_kinds.contains(&kind)
    }
}

/// Where the prober is in its state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProberState {
    /// Checking, or sleeping between checks
    Probing,
    /// Last check succeeded (terminal)
    Ready,
    /// Gave up (terminal)
    Failed,
}

/// Summary of a successful wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessReport {
    /// Number of checks performed, including the successful one
    pub attempts: u32,
    /// Wall time spent waiting
    pub elapsed: Duration,
}

/// Why the prober stopped without reaching readiness.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    /// A non-transient failure, propagated unchanged
    #[error(transparent)]
    Fatal(#[from] CheckError),
    /// The retry cap was reached while failures were still transient
    #[error("database not ready after {attempts} attempts: {last}")]
    AttemptsExhausted { attempts: u32, last: CheckError },
}

impl ProbeError {
    /// The check failure that ended the loop.
    pub fn check_error(&self) -> &CheckError {
        match self {
            ProbeError::Fatal(e) => e,
            ProbeError::AttemptsExhausted { last, .. } => last,
        }
    }
}

type AttemptCallback = Arc<dyn Fn(&ProbeAttempt) + Send + Sync>;

/// Waits for databases to become reachable.
///
/// Each attempt calls the connectivity check with the same target set.
/// A failure whose kind is in the transient set is followed by one sleep
/// and another attempt; any other failure ends the loop immediately.
pub struct ReadinessProber {
    check: Arc<dyn ConnectivityCheck>,
    sleeper: Arc<dyn Sleeper>,
    config: ProberConfig,
    state: RwLock<ProberState>,
    /// Callback invoked after every successful or transient attempt
    on_attempt: Option<AttemptCallback>,
}

impl ReadinessProber {
    /// Create a new prober.
    pub fn new(
        check: Arc<dyn ConnectivityCheck>,
        sleeper: Arc<dyn Sleeper>,
        config: ProberConfig,
    ) -> Self {
        Self {
            check,
            sleeper,
            config,
            state: RwLock::new(ProberState::Probing),
            on_attempt: None,
        }
    }

    /// Set callback for attempts.
    ///
    /// Fatal failures are not reported here; they are returned to the caller.
    pub fn on_attempt<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ProbeAttempt) + Send + Sync + 'static,
    {
        self.on_attempt = Some(Arc::new(callback));
        self
    }

    /// Current state of the last (or running) wait.
    pub async fn state(&self) -> ProberState {
        *self.state.read().await
    }

    /// Block until every database in `targets` is reachable.
    pub async fn wait_until_ready(
        &self,
        targets: &[DatabaseId],
    ) -> Result<ReadinessReport, ProbeError> {
        let started = Instant::now();
        let mut attempt: u32 = 1;
        self.set_state(ProberState::Probing).await;

        loop {
            let probe_start = Instant::now();
            let result = self.check.check(targets).await;
            let latency = probe_start.elapsed();

            let err = match result {
                Ok(()) => {
                    self.notify(attempt, ProbeOutcome::Ready, latency);
                    self.set_state(ProberState::Ready).await;
                    tracing::debug!("probe attempt {} succeeded in {:?}", attempt, latency);
                    return Ok(ReadinessReport {
                        attempts: attempt,
                        elapsed: started.elapsed(),
                    });
                }
                Err(e) => e,
            };

            if !self.config.is_transient(err.kind) {
                self.set_state(ProberState::Failed).await;
                tracing::error!("probe attempt {} failed: {}", attempt, err);
                return Err(ProbeError::Fatal(err));
            }

            self.notify(attempt, ProbeOutcome::NotReady(err.kind), latency);

            if let Some(max) = self.config.max_attempts {
                if attempt >= max.get() {
                    self.set_state(ProberState::Failed).await;
                    tracing::error!("giving up after {} attempts: {}", attempt, err);
                    return Err(ProbeError::AttemptsExhausted {
                        attempts: attempt,
                        last: err,
                    });
                }
            }

            tracing::warn!(
                "database unavailable ({}), waiting {:?} before attempt {}",
                err,
                self.config.retry_delay,
                attempt.saturating_add(1)
            );
            self.sleeper.sleep(self.config.retry_delay).await;
            attempt = attempt.saturating_add(1);
        }
    }

    async fn set_state(&self, state: ProberState) {
        *self.state.write().await = state;
    }

    fn notify(&self, number: u32, outcome: ProbeOutcome, latency: Duration) {
        if let Some(callback) = &self.on_attempt {
            callback(&ProbeAttempt {
                number,
                outcome,
                latency,
            });
        }
    }
}
