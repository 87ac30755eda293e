// Artifact Store Port
// Source of the bundled redis-server binaries
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Read the full contents of the bundled artifact `name`
    ///
    /// # Errors
    /// - AppError::ExecutableResolution if no such artifact is bundled
    async fn read(&self, name: &str) -> Result<Vec<u8>>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory artifact store
    #[derive(Default)]
    pub struct InMemoryArtifactStore {
        artifacts: HashMap<String, Vec<u8>>,
        reads: Mutex<Vec<String>>,
    }

    impl InMemoryArtifactStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_artifact(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
            self.artifacts.insert(name.into(), bytes.into());
            self
        }

        /// Names requested so far, in order
        pub fn reads(&self) -> Vec<String> {
            self.reads.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ArtifactStore for InMemoryArtifactStore {
        async fn read(&self, name: &str) -> Result<Vec<u8>> {
            self.reads.lock().unwrap().push(name.to_string());
            self.artifacts.get(name).cloned().ok_or_else(|| {
                AppError::ExecutableResolution(format!("bundled artifact '{}' not found", name))
            })
        }
    }
}
