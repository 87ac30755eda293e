// Readiness polling - distinguishes "spawned" from "accepting connections"
//
// Advisory only: the supervisor marks an instance active whether or not
// the probe ever succeeds. The outcome is reported for logging and timing.

use super::constants::{DEFAULT_PROBE_TIMEOUT, DEFAULT_READY_TIMEOUT, DEFAULT_RETRY_INTERVAL};
use crate::port::ReadinessProbe;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{info, trace, warn};

/// Timing knobs for the readiness loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessConfig {
    /// Total budget for all attempts
    pub ready_timeout: Duration,
    /// Connect timeout for a single attempt
    pub probe_timeout: Duration,
    /// Pause after a failed attempt
    pub retry_interval: Duration,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            ready_timeout: DEFAULT_READY_TIMEOUT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            retry_interval: DEFAULT_RETRY_INTERVAL,
        }
    }
}

/// Outcome of the readiness loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// The port accepted a connection
    Ready { elapsed: Duration },
    /// Budget exhausted without a successful connect
    TimedOut { elapsed: Duration },
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready { .. })
    }

    pub fn elapsed(&self) -> Duration {
        match self {
            Readiness::Ready { elapsed } | Readiness::TimedOut { elapsed } => *elapsed,
        }
    }
}

/// Poll `port` until it accepts a connection or the budget runs out.
/// Never fails; every unsuccessful attempt is treated as transient.
pub async fn await_ready(
    probe: &dyn ReadinessProbe,
    port: u16,
    config: &ReadinessConfig,
) -> Readiness {
    let started = Instant::now();
    let mut attempts: u32 = 0;

    while started.elapsed() < config.ready_timeout {
        attempts += 1;
        if probe.probe(port, config.probe_timeout).await {
            let elapsed = started.elapsed();
            info!(
                port = %port,
                attempts = attempts,
                elapsed_ms = elapsed.as_millis() as u64,
                "redis startup finished"
            );
            return Readiness::Ready { elapsed };
        }

        trace!(port = %port, attempt = attempts, "while waiting for server startup");
        sleep(config.retry_interval).await;
    }

    let elapsed = started.elapsed();
    warn!(
        port = %port,
        attempts = attempts,
        budget_ms = config.ready_timeout.as_millis() as u64,
        "redis did not accept connections within the readiness budget"
    );
    Readiness::TimedOut { elapsed }
}
