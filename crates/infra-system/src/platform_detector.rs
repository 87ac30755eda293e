// Platform detector implementation
// reason: tokio::process for the `uname -m` probe on Unix / macOS
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use embedded_redis_core::domain::{Architecture, OsFamily, PlatformKey};
use embedded_redis_core::error::{AppError, Result};
use embedded_redis_core::port::PlatformProbe;

/// Detects (OS family, architecture) of the host.
///
/// Windows reads `PROCESSOR_ARCHITECTURE` / `PROCESSOR_ARCHITEW6432`.
/// Everything else shells out to `uname -m` (blocking, no timeout).
pub struct PlatformDetector {
    os_name: Option<String>,
}

impl PlatformDetector {
    /// Detector for the running host
    pub fn new() -> Self {
        Self { os_name: None }
    }

    /// Detector that classifies `os_name` instead of the host name
    pub fn with_os_name(os_name: impl Into<String>) -> Self {
        Self {
            os_name: Some(os_name.into()),
        }
    }

    /// Human-readable host OS name (`"Linux"`, `"Mac OS X"`, `"Windows"`, ...)
    pub fn host_os_name() -> String {
        match std::env::consts::OS {
            "linux" => "Linux".to_string(),
            "macos" => "Mac OS X".to_string(),
            "windows" => "Windows".to_string(),
            other => other.to_string(),
        }
    }

    fn os_name(&self) -> String {
        self.os_name.clone().unwrap_or_else(Self::host_os_name)
    }
}

impl Default for PlatformDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlatformProbe for PlatformDetector {
    async fn detect(&self) -> Result<PlatformKey> {
        let os_name = self.os_name();
        let os = OsFamily::from_os_name(&os_name)
            .ok_or_else(|| AppError::PlatformDetection(format!("Unrecognized OS: {}", os_name)))?;

        let arch = match os {
            OsFamily::Windows => windows_architecture(),
            OsFamily::Unix | OsFamily::MacOs => machine_architecture(os).await?,
        };

        let key = PlatformKey::new(os, arch);
        debug!(os_name = %os_name, platform = %key, "Platform detected");
        Ok(key)
    }
}

fn windows_architecture() -> Architecture {
    let arch = std::env::var("PROCESSOR_ARCHITECTURE").ok();
    let wow64_arch = std::env::var("PROCESSOR_ARCHITEW6432").ok();
    Architecture::from_windows_env(arch.as_deref(), wow64_arch.as_deref())
}

async fn machine_architecture(os: OsFamily) -> Result<Architecture> {
    let output = Command::new("uname")
        .arg("-m")
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .await
        .map_err(|e| AppError::PlatformDetection(format!("failed to run uname -m: {}", e)))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let machine = stdout
        .lines()
        .next()
        .ok_or_else(|| AppError::PlatformDetection("uname -m printed nothing".to_string()))?;

    Architecture::from_machine(os, machine).ok_or_else(|| {
        AppError::PlatformDetection(format!("unsupported architecture: {}", machine))
    })
}
