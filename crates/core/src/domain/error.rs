// Domain Error Types

use super::platform::PlatformKey;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("No Redis executable registered for {0}")]
    UnsupportedPlatform(PlatformKey),

    #[error("Invalid executable override: {0}")]
    InvalidOverride(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
