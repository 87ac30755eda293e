// Executable Registry - platform key -> bundled artifact name
//
// Immutable once built. Overrides go through ExecutableRegistryBuilder and
// yield a fresh registry, so two resolvers never share mutable state.

use super::error::{DomainError, Result};
use super::platform::{Architecture, OsFamily, PlatformKey};
use std::collections::HashMap;

/// Pinned Redis version for the Unix / macOS artifacts
pub const REDIS_VERSION: &str = "7.0.15";

/// Pinned Redis version for the Windows artifact
pub const REDIS_VERSION_WINDOWS: &str = "7.2.5";

const PROGRAM: &str = "redis-server";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutableRegistry {
    executables: HashMap<PlatformKey, String>,
}

impl ExecutableRegistry {
    /// Registry with the six built-in artifacts
    pub fn defaults() -> Self {
        let unix = |tag: &str| format!("{PROGRAM}-{REDIS_VERSION}-{tag}");

        let executables = HashMap::from([
            (PlatformKey::UNIX_X86, unix("linux-386")),
            (PlatformKey::UNIX_X86_64, unix("linux-amd64")),
            (PlatformKey::UNIX_ARM64, unix("linux-arm64")),
            (PlatformKey::MAC_OS_X86_64, unix("darwin-amd64")),
            (PlatformKey::MAC_OS_ARM64, unix("darwin-arm64")),
            (
                PlatformKey::WINDOWS_X86_64,
                format!("{PROGRAM}-{REDIS_VERSION_WINDOWS}-windows-amd64.exe"),
            ),
        ]);

        Self { executables }
    }

    /// Builder seeded with the defaults
    pub fn builder() -> ExecutableRegistryBuilder {
        ExecutableRegistryBuilder {
            executables: Self::defaults().executables,
        }
    }

    /// Builder seeded with this registry's entries
    pub fn to_builder(&self) -> ExecutableRegistryBuilder {
        ExecutableRegistryBuilder {
            executables: self.executables.clone(),
        }
    }

    /// Artifact name for `key`
    ///
    /// # Errors
    /// - DomainError::UnsupportedPlatform if nothing is registered for `key`
    pub fn lookup(&self, key: &PlatformKey) -> Result<&str> {
        self.executables
            .get(key)
            .map(String::as_str)
            .ok_or(DomainError::UnsupportedPlatform(*key))
    }

    pub fn len(&self) -> usize {
        self.executables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.executables.is_empty()
    }
}

impl Default for ExecutableRegistry {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Collects overrides before producing an immutable registry
#[derive(Debug, Clone)]
pub struct ExecutableRegistryBuilder {
    executables: HashMap<PlatformKey, String>,
}

impl ExecutableRegistryBuilder {
    /// Replace the entry for one (os, arch) pair
    pub fn override_arch(
        mut self,
        os: OsFamily,
        arch: Architecture,
        executable: impl Into<String>,
    ) -> Result<Self> {
        let executable = validate(executable.into())?;
        self.executables.insert(PlatformKey::new(os, arch), executable);
        Ok(self)
    }

    /// Replace the entry for every architecture of `os`
    pub fn override_os(mut self, os: OsFamily, executable: impl Into<String>) -> Result<Self> {
        let executable = validate(executable.into())?;
        for arch in Architecture::ALL {
            self.executables
                .insert(PlatformKey::new(os, arch), executable.clone());
        }
        Ok(self)
    }

    pub fn build(self) -> ExecutableRegistry {
        ExecutableRegistry {
            executables: self.executables,
        }
    }
}

fn validate(executable: String) -> Result<String> {
    if executable.trim().is_empty() {
        return Err(DomainError::InvalidOverride(
            "executable name cannot be empty".to_string(),
        ));
    }
    Ok(executable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_artifact_names() {
        let registry = ExecutableRegistry::defaults();
        let expected = [
            (PlatformKey::UNIX_X86, "redis-server-7.0.15-linux-386"),
            (PlatformKey::UNIX_X86_64, "redis-server-7.0.15-linux-amd64"),
            (PlatformKey::UNIX_ARM64, "redis-server-7.0.15-linux-arm64"),
            (PlatformKey::MAC_OS_X86_64, "redis-server-7.0.15-darwin-amd64"),
            (PlatformKey::MAC_OS_ARM64, "redis-server-7.0.15-darwin-arm64"),
            (
                PlatformKey::WINDOWS_X86_64,
                "redis-server-7.2.5-windows-amd64.exe",
            ),
        ];

        assert_eq!(registry.len(), expected.len());
        for (key, name) in expected {
            assert_eq!(registry.lookup(&key).unwrap(), name, "key {}", key);
        }
    }

    #[test]
    fn test_lookup_unsupported() {
        let registry = ExecutableRegistry::defaults();
        let key = PlatformKey::new(OsFamily::Windows, Architecture::X86);

        assert_eq!(
            registry.lookup(&key),
            Err(DomainError::UnsupportedPlatform(key))
        );
    }

    #[test]
    fn test_override_single_arch() {
        let registry = ExecutableRegistry::builder()
            .override_arch(OsFamily::Unix, Architecture::X86_64, "/opt/redis/bin/redis-server")
            .unwrap()
            .build();

        assert_eq!(
            registry.lookup(&PlatformKey::UNIX_X86_64).unwrap(),
            "/opt/redis/bin/redis-server"
        );
        // Other entries untouched
        assert_eq!(
            registry.lookup(&PlatformKey::UNIX_ARM64).unwrap(),
            "redis-server-7.0.15-linux-arm64"
        );
    }

    #[test]
    fn test_override_whole_family() {
        let registry = ExecutableRegistry::builder()
            .override_os(OsFamily::Windows, "redis-custom.exe")
            .unwrap()
            .build();

        for arch in Architecture::ALL {
            let key = PlatformKey::new(OsFamily::Windows, arch);
            assert_eq!(registry.lookup(&key).unwrap(), "redis-custom.exe");
        }
        assert_eq!(
            registry.lookup(&PlatformKey::MAC_OS_ARM64).unwrap(),
            "redis-server-7.0.15-darwin-arm64"
        );
    }

    #[test]
    fn test_override_rejects_empty_name() {
        let result = ExecutableRegistry::builder().override_os(OsFamily::Unix, "  ");
        assert!(matches!(result, Err(DomainError::InvalidOverride(_))));

        let result = ExecutableRegistry::builder().override_arch(
            OsFamily::MacOs,
            Architecture::Arm64,
            "",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_do_not_alias() {
        let base = ExecutableRegistry::defaults();
        let custom = base
            .to_builder()
            .override_os(OsFamily::Unix, "some")
            .unwrap()
            .build();

        assert_eq!(custom.lookup(&PlatformKey::UNIX_X86_64).unwrap(), "some");
        assert_eq!(
            base.lookup(&PlatformKey::UNIX_X86_64).unwrap(),
            "redis-server-7.0.15-linux-amd64"
        );
    }
}
