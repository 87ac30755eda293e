//! Daemon configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file named by `EMBEDDED_REDIS_CONFIG`, then `EMBEDDED_REDIS_*` variables.

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use embedded_redis_core::application::ReadinessConfig;

pub const ENV_PREFIX: &str = "EMBEDDED_REDIS";
pub const CONFIG_PATH_VAR: &str = "EMBEDDED_REDIS_CONFIG";
const DEFAULT_ARTIFACT_DIR: &str = "~/.embedded-redis/artifacts";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DaemonConfig {
    pub port: u16,
    pub tls_port: u16,
    /// Informational only, redis-server binds per its own config
    pub bind: String,
    pub artifact_dir: String,
    pub data_dir: Option<String>,
    /// redis.conf passed through as the first server argument
    pub config_file: Option<String>,
    /// Pre-installed redis-server used on every platform instead of the bundle
    pub executable: Option<String>,
    pub ready_timeout_ms: u64,
    pub probe_timeout_ms: u64,
    pub retry_interval_ms: u64,
}

impl DaemonConfig {
    /// Load from the process environment
    pub fn load() -> Result<Self> {
        let file = std::env::var(CONFIG_PATH_VAR).ok().map(expand);
        Self::load_from(file, None)
    }

    /// Load with an explicit file and, for tests, an explicit variable map
    /// in place of the process environment.
    pub fn load_from(file: Option<PathBuf>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("port", 6379)?
            .set_default("tls_port", 0)?
            .set_default("bind", "127.0.0.1")?
            .set_default("artifact_dir", DEFAULT_ARTIFACT_DIR)?
            .set_default("ready_timeout_ms", 10_000)?
            .set_default("probe_timeout_ms", 500)?
            .set_default("retry_interval_ms", 100)?;

        if let Some(path) = &file {
            builder = builder.add_source(
                File::from(path.as_path())
                    .format(FileFormat::Toml)
                    .required(true),
            );
        }

        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .context("failed to build configuration")?;

        settings
            .try_deserialize()
            .context("invalid embedded redis configuration")
    }

    pub fn artifact_dir(&self) -> PathBuf {
        expand(&self.artifact_dir)
    }

    pub fn data_dir(&self) -> Option<PathBuf> {
        self.data_dir.as_deref().map(expand)
    }

    pub fn config_file(&self) -> Option<PathBuf> {
        self.config_file.as_deref().map(expand)
    }

    pub fn executable(&self) -> Option<String> {
        self.executable
            .as_deref()
            .map(|path| shellexpand::tilde(path).into_owned())
    }

    pub fn readiness(&self) -> ReadinessConfig {
        ReadinessConfig {
            ready_timeout: Duration::from_millis(self.ready_timeout_ms),
            probe_timeout: Duration::from_millis(self.probe_timeout_ms),
            retry_interval: Duration::from_millis(self.retry_interval_ms),
        }
    }
}

fn expand(path: impl AsRef<str>) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path.as_ref()).into_owned())
}
