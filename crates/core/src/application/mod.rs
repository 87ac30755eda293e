// Application Layer - Supervisor use cases

pub mod cancel;
pub mod constants;
pub mod output_relay;
pub mod readiness;
pub mod supervisor;

// Re-exports
pub use cancel::{cancel_channel, CancelHandle, CancelToken};
pub use output_relay::{relay_tag, OutputRelay};
pub use readiness::{await_ready, Readiness, ReadinessConfig};
pub use supervisor::ServerInstance;
