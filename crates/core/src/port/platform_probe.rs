// Platform Probe Port
// Detects the host (OS family, architecture) pair
use crate::domain::PlatformKey;
use crate::error::Result;
use async_trait::async_trait;

/// Platform probe port
///
/// Implementations must not cache: every call re-detects.
#[async_trait]
pub trait PlatformProbe: Send + Sync {
    /// Detect the current platform
    ///
    /// # Errors
    /// - AppError::PlatformDetection if the OS name is unrecognized or the
    ///   architecture cannot be determined
    async fn detect(&self) -> Result<PlatformKey>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock PlatformProbe returning a fixed key (or a detection failure)
    pub struct MockPlatformProbe {
        key: Option<PlatformKey>,
        calls: AtomicUsize,
    }

    impl MockPlatformProbe {
        pub fn new(key: PlatformKey) -> Self {
            Self {
                key: Some(key),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn failing() -> Self {
            Self {
                key: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PlatformProbe for MockPlatformProbe {
        async fn detect(&self) -> Result<PlatformKey> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.key.ok_or_else(|| {
                AppError::PlatformDetection("Unrecognized OS: mock".to_string())
            })
        }
    }
}
