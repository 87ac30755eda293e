// Directory-backed artifact store
// Bundled redis-server binaries live as plain files under one root directory
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use embedded_redis_core::error::{AppError, Result};
use embedded_redis_core::port::ArtifactStore;

pub struct DirectoryArtifactStore {
    root: PathBuf,
}

impl DirectoryArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ArtifactStore for DirectoryArtifactStore {
    async fn read(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.root.join(name);

        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => AppError::ExecutableResolution(format!(
                "bundled artifact '{}' not found in {}",
                name,
                self.root.display()
            )),
            _ => AppError::ExecutableResolution(format!(
                "failed to read bundled artifact {}: {}",
                path.display(),
                e
            )),
        })
    }
}
