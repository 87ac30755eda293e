// Executable resolver
// Turns (registry, detected platform) into an executable file on disk
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};
use uuid::Uuid;

use embedded_redis_core::domain::{ExecutableRegistry, ResolvedExecutable};
use embedded_redis_core::error::{AppError, Result};
use embedded_redis_core::port::{ArtifactStore, PlatformProbe};

const TEMP_DIR_PREFIX: &str = "embedded-redis-";

/// Resolves the redis-server binary for the host.
///
/// Algorithm:
/// 1. Detect the platform and look up its artifact name
/// 2. Pick the data directory (explicit, or one temp dir per resolver)
/// 3. A file already at the bare artifact name (relative to the working
///    directory, or absolute) wins as-is and is returned as an absolute path
/// 4. Otherwise copy the bundled artifact into `<data_dir>/<artifact>` and
///    mark it executable; this copy happens on every call
///
/// Neither the data directory nor the extracted file is deleted afterwards.
pub struct ExecutableResolver {
    registry: ExecutableRegistry,
    probe: Arc<dyn PlatformProbe>,
    artifacts: Arc<dyn ArtifactStore>,
    data_dir: Option<PathBuf>,
    working_dir: Option<PathBuf>,
    temp_dir: Mutex<Option<PathBuf>>,
}

impl ExecutableResolver {
    pub fn new(
        registry: ExecutableRegistry,
        probe: Arc<dyn PlatformProbe>,
        artifacts: Arc<dyn ArtifactStore>,
    ) -> Self {
        Self {
            registry,
            probe,
            artifacts,
            data_dir: None,
            working_dir: None,
            temp_dir: Mutex::new(None),
        }
    }

    /// Extract into `dir` instead of a temporary directory
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Directory a bare artifact name is looked up in before extraction
    /// (default: the current working directory)
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn registry(&self) -> &ExecutableRegistry {
        &self.registry
    }

    /// Explicit data directory, or the temp directory once allocated
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.data_dir.clone().or_else(|| {
            self.temp_dir
                .lock()
                .ok()
                .and_then(|guard| guard.clone())
        })
    }

    /// Resolve a launchable executable for the host
    ///
    /// # Errors
    /// - AppError::PlatformDetection from the probe
    /// - AppError::Domain(UnsupportedPlatform) if the registry has no entry
    /// - AppError::ExecutableResolution if extraction fails
    pub async fn resolve(&self) -> Result<ResolvedExecutable> {
        let key = self.probe.detect().await?;
        let artifact = self.registry.lookup(&key)?.to_string();
        let data_dir = self.ensure_data_dir()?;

        debug!(platform = %key, artifact = %artifact, "Resolving redis executable");

        let existing = match &self.working_dir {
            Some(dir) => dir.join(&artifact),
            None => PathBuf::from(&artifact),
        };
        if existing.is_file() {
            let path = absolutize(&existing)?;
            info!(path = %path.display(), "Using pre-installed redis executable");
            return Ok(ResolvedExecutable::new(path));
        }

        self.extract(&data_dir, &artifact).await
    }

    fn ensure_data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }

        let mut temp_dir = self
            .temp_dir
            .lock()
            .map_err(|_| AppError::ExecutableResolution("temp dir lock poisoned".to_string()))?;

        if let Some(dir) = temp_dir.as_ref() {
            return Ok(dir.clone());
        }

        let dir = std::env::temp_dir().join(format!("{}{}", TEMP_DIR_PREFIX, Uuid::new_v4()));
        std::fs::create_dir_all(&dir).map_err(|e| {
            AppError::ExecutableResolution(format!(
                "failed to create temp dir {}: {}",
                dir.display(),
                e
            ))
        })?;
        debug!(dir = %dir.display(), "Allocated temporary data directory");

        *temp_dir = Some(dir.clone());
        Ok(dir)
    }

    /// Copy the bundled artifact next to a temp name, then rename over the
    /// target so a binary that is currently executing is replaced, not
    /// rewritten in place.
    async fn extract(&self, data_dir: &Path, artifact: &str) -> Result<ResolvedExecutable> {
        let bytes = self.artifacts.read(artifact).await?;

        let target = data_dir.join(artifact);
        let parent = target.parent().unwrap_or(data_dir).to_path_buf();
        tokio::fs::create_dir_all(&parent)
            .await
            .map_err(|e| write_error(&parent, e))?;

        let file_name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| artifact.to_string());
        let partial = parent.join(format!(".{}.{}.partial", file_name, Uuid::new_v4()));

        tokio::fs::write(&partial, &bytes)
            .await
            .map_err(|e| write_error(&partial, e))?;
        mark_executable(&partial).await?;
        if let Err(e) = tokio::fs::rename(&partial, &target).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(write_error(&target, e));
        }

        let path = absolutize(&target)?;
        info!(
            artifact = %artifact,
            path = %path.display(),
            bytes = bytes.len(),
            "Extracted redis executable"
        );
        Ok(ResolvedExecutable::new(path))
    }
}

fn write_error(path: &Path, e: std::io::Error) -> AppError {
    AppError::ExecutableResolution(format!("failed to write {}: {}", path.display(), e))
}

#[cfg(unix)]
async fn mark_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .await
        .map_err(|e| {
            AppError::ExecutableResolution(format!(
                "failed to mark {} executable: {}",
                path.display(),
                e
            ))
        })
}

#[cfg(not(unix))]
async fn mark_executable(_path: &Path) -> Result<()> {
    Ok(())
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_redis_core::domain::{OsFamily, PlatformKey};
    use embedded_redis_core::port::artifact_store::mocks::InMemoryArtifactStore;
    use embedded_redis_core::port::platform_probe::mocks::MockPlatformProbe;

    const LINUX_AMD64: &str = "redis-server-7.0.15-linux-amd64";

    fn resolver(store: Arc<InMemoryArtifactStore>) -> ExecutableResolver {
        ExecutableResolver::new(
            ExecutableRegistry::defaults(),
            Arc::new(MockPlatformProbe::new(PlatformKey::UNIX_X86_64)),
            store,
        )
    }

    #[tokio::test]
    async fn test_extracts_into_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(InMemoryArtifactStore::new().with_artifact(LINUX_AMD64, b"binary".to_vec()));
        let resolver = resolver(store).with_data_dir(dir.path());

        let exe = resolver.resolve().await.unwrap();

        assert_eq!(exe.path(), dir.path().join(LINUX_AMD64));
        assert!(exe.path().is_absolute());
        assert_eq!(std::fs::read(exe.path()).unwrap(), b"binary");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(exe.path()).unwrap().permissions().mode();
            assert_eq!(mode & 0o111, 0o111);
        }
    }

    #[tokio::test]
    async fn test_copies_on_every_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(InMemoryArtifactStore::new().with_artifact(LINUX_AMD64, b"v1".to_vec()));
        let resolver = resolver(store.clone()).with_data_dir(dir.path());

        let first = resolver.resolve().await.unwrap();
        std::fs::write(first.path(), b"tampered").unwrap();
        let second = resolver.resolve().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(std::fs::read(second.path()).unwrap(), b"v1");
        assert_eq!(store.reads().len(), 2);
    }

    #[tokio::test]
    async fn test_temp_dir_reused_for_resolver_lifetime() {
        let store = Arc::new(InMemoryArtifactStore::new().with_artifact(LINUX_AMD64, b"bin".to_vec()));
        let resolver = resolver(store);
        assert!(resolver.data_dir().is_none());

        let first = resolver.resolve().await.unwrap();
        let temp = resolver.data_dir().unwrap();
        let second = resolver.resolve().await.unwrap();

        assert!(temp.starts_with(std::env::temp_dir()));
        assert_eq!(first.path().parent().unwrap(), temp);
        assert_eq!(first, second);

        let _ = std::fs::remove_dir_all(temp);
    }

    #[tokio::test]
    async fn test_unsupported_platform() {
        let store = Arc::new(InMemoryArtifactStore::new());
        let resolver = ExecutableResolver::new(
            ExecutableRegistry::defaults(),
            Arc::new(MockPlatformProbe::new(PlatformKey::new(
                OsFamily::MacOs,
                embedded_redis_core::domain::Architecture::X86,
            ))),
            store.clone(),
        );

        let err = resolver.resolve().await.unwrap_err();
        assert!(err.is_unsupported_platform());
        assert!(store.reads().is_empty());
    }

    #[tokio::test]
    async fn test_detection_failure_propagates() {
        let resolver = ExecutableResolver::new(
            ExecutableRegistry::defaults(),
            Arc::new(MockPlatformProbe::failing()),
            Arc::new(InMemoryArtifactStore::new()),
        );

        let err = resolver.resolve().await.unwrap_err();
        assert!(matches!(err, AppError::PlatformDetection(_)));
    }

    #[tokio::test]
    async fn test_garbage_override_does_not_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ExecutableRegistry::builder()
            .override_os(OsFamily::Unix, "some")
            .unwrap()
            .override_os(OsFamily::MacOs, "some")
            .unwrap()
            .build();
        let store = Arc::new(InMemoryArtifactStore::new().with_artifact(LINUX_AMD64, b"bin".to_vec()));
        let resolver = ExecutableResolver::new(
            registry,
            Arc::new(MockPlatformProbe::new(PlatformKey::UNIX_X86_64)),
            store.clone(),
        )
        .with_data_dir(dir.path());

        let err = resolver.resolve().await.unwrap_err();
        assert!(matches!(err, AppError::ExecutableResolution(_)));
        assert_eq!(store.reads(), vec!["some".to_string()]);
    }

    #[tokio::test]
    async fn test_existing_file_used_without_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let preinstalled = dir.path().join("my-redis-server");
        std::fs::write(&preinstalled, b"custom").unwrap();

        let registry = ExecutableRegistry::builder()
            .override_os(OsFamily::Unix, preinstalled.to_string_lossy())
            .unwrap()
            .build();
        let store = Arc::new(InMemoryArtifactStore::new());
        let resolver = ExecutableResolver::new(
            registry,
            Arc::new(MockPlatformProbe::new(PlatformKey::UNIX_ARM64)),
            store.clone(),
        )
        .with_data_dir(dir.path().join("data"));

        let exe = resolver.resolve().await.unwrap();
        assert_eq!(exe.path(), preinstalled);
        assert!(store.reads().is_empty());
    }

    #[tokio::test]
    async fn test_bare_name_in_working_dir_used_without_extraction() {
        let cwd = tempfile::tempdir().unwrap();
        std::fs::write(cwd.path().join(LINUX_AMD64), b"local build").unwrap();
        let data = tempfile::tempdir().unwrap();
        let store = Arc::new(InMemoryArtifactStore::new().with_artifact(LINUX_AMD64, b"bundled".to_vec()));

        let resolver = resolver(store.clone())
            .with_data_dir(data.path())
            .with_working_dir(cwd.path());
        let exe = resolver.resolve().await.unwrap();

        assert_eq!(exe.path(), cwd.path().join(LINUX_AMD64));
        assert!(exe.path().is_absolute());
        assert_eq!(std::fs::read(exe.path()).unwrap(), b"local build");
        assert!(store.reads().is_empty());
        assert!(!data.path().join(LINUX_AMD64).exists());
    }

    #[test]
    fn test_absolutize_joins_relative_path_onto_cwd() {
        let cwd = std::env::current_dir().unwrap();

        let path = absolutize(Path::new(LINUX_AMD64)).unwrap();
        assert_eq!(path, cwd.join(LINUX_AMD64));

        let absolute = Path::new("/opt/redis/redis-server");
        assert_eq!(absolutize(absolute).unwrap(), absolute);
    }
}
