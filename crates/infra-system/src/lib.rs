// Embedded Redis Infrastructure - System Adapters
// Implements: PlatformProbe, ArtifactStore, ProcessLauncher, ReadinessProbe

pub mod artifact_store;
pub mod executable_resolver;
pub mod platform_detector;
pub mod process_launcher;
pub mod tcp_probe;

pub use artifact_store::DirectoryArtifactStore;
pub use executable_resolver::ExecutableResolver;
pub use platform_detector::PlatformDetector;
pub use process_launcher::TokioProcessLauncher;
pub use tcp_probe::TcpReadinessProbe;
