// Central Error Type for the control plane

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Platform detection failed: {0}")]
    PlatformDetection(String),

    #[error("Executable resolution failed: {0}")]
    ExecutableResolution(String),

    #[error("Already running: {0}")]
    AlreadyRunning(String),

    #[error("Process teardown failed: {0}")]
    ProcessTeardown(String),

    #[error("Spawn failed: {0}")]
    Spawn(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// True for the "no registry entry for this platform" case
    pub fn is_unsupported_platform(&self) -> bool {
        matches!(
            self,
            AppError::Domain(crate::domain::DomainError::UnsupportedPlatform(_))
        )
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
