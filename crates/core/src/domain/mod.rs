// Domain Layer - Pure value types and rules

pub mod command;
pub mod error;
pub mod executable;
pub mod platform;
pub mod registry;

// Re-exports
pub use command::{ServerCommand, REDIS_READY_PATTERN};
pub use error::DomainError;
pub use executable::ResolvedExecutable;
pub use platform::{Architecture, OsFamily, PlatformKey};
pub use registry::{ExecutableRegistry, ExecutableRegistryBuilder, REDIS_VERSION, REDIS_VERSION_WINDOWS};
