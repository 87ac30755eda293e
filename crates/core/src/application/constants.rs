// Supervisor constants (no magic values)
use std::time::Duration;

/// Total readiness budget per start (10s)
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-attempt TCP connect timeout (500ms)
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(500);

/// Sleep between failed readiness attempts (100ms)
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// Label prefixed to relayed output tags
pub const PROCESS_LABEL: &str = "redis";
