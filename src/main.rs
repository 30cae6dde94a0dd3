//! wait-for-db - Block until the application's databases accept connections
//!
//! This is the composition root that wires together all the components.

use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;
use wait_for_db::{
    load_config, DatabaseConnectivityCheck, ReadinessProber, TokioSleeper, WaitForDb,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Setup logging first: loading the configuration may warn
    let log_level = if std::env::var("DEBUG").is_ok() {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    // Load configuration from environment
    let cfg = load_config()?;

    tracing::debug!(
        "retry_delay_ms={} max_attempts={} transient_kinds={:?}",
        cfg.retry_delay_ms,
        cfg.max_attempts,
        cfg.transient_kinds
    );

    // ===== COMPOSITION ROOT =====

    // 1. Outbound adapters
    let check = Arc::new(DatabaseConnectivityCheck::new(
        cfg.targets()?,
        cfg.connect_timeout(),
    ));
    let sleeper = Arc::new(TokioSleeper::new());

    // 2. Domain service
    let prober = ReadinessProber::new(check, sleeper, cfg.prober_config()).on_attempt(|attempt| {
        tracing::debug!(
            "attempt {} -> {:?} in {:?}",
            attempt.number,
            attempt.outcome,
            attempt.latency
        );
    });

    // 3. Use case
    let command = WaitForDb::new(prober, cfg.database_ids());
    command.run().await?;

    Ok(())
}
