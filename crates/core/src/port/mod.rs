// Port Layer - Interfaces for external dependencies

pub mod artifact_store;
pub mod output_sink;
pub mod platform_probe;
pub mod process_launcher;
pub mod readiness_probe;

// Re-exports
pub use artifact_store::ArtifactStore;
pub use output_sink::{OutputSink, TracingOutputSink};
pub use platform_probe::PlatformProbe;
pub use process_launcher::{ChildProcess, LaunchRequest, OutputStream, ProcessLauncher};
pub use readiness_probe::ReadinessProbe;
