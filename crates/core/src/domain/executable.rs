// Resolved Executable - absolute path of a launchable redis-server binary

use std::path::{Path, PathBuf};

/// Absolute path known to exist and be executable when it was resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedExecutable(PathBuf);

impl ResolvedExecutable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn into_path(self) -> PathBuf {
        self.0
    }
}

impl AsRef<Path> for ResolvedExecutable {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl std::fmt::Display for ResolvedExecutable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}
