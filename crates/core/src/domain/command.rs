// Server Command - argument vector for redis-server
//
// Only assembles argv. Writing redis.conf files is left to the caller.

use super::executable::ResolvedExecutable;
use std::path::PathBuf;

/// Startup line pattern printed by redis-server once it accepts connections.
///
/// Informational only: readiness is decided by the TCP probe, never by
/// matching output.
pub const REDIS_READY_PATTERN: &str = ".*[Rr]eady to accept connections.*";

/// Default redis port
pub const DEFAULT_PORT: u16 = 6379;

/// Builder for the redis-server argument vector
#[derive(Debug, Clone)]
pub struct ServerCommand {
    executable: PathBuf,
    config_file: Option<PathBuf>,
    port: u16,
    tls_port: u16,
    replica_of: Option<(String, u16)>,
}

impl ServerCommand {
    pub fn new(executable: &ResolvedExecutable) -> Self {
        Self {
            executable: executable.path().to_path_buf(),
            config_file: None,
            port: DEFAULT_PORT,
            tls_port: 0,
            replica_of: None,
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// TLS port; 0 leaves TLS disabled
    pub fn tls_port(mut self, tls_port: u16) -> Self {
        self.tls_port = tls_port;
        self
    }

    /// Existing redis.conf passed as the first positional argument
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Replicate from `host:port`. Emitted as `--slaveof`, which redis 7
    /// still accepts as an alias of `--replicaof`.
    pub fn replica_of(mut self, host: impl Into<String>, port: u16) -> Self {
        self.replica_of = Some((host.into(), port));
        self
    }

    pub fn port_number(&self) -> u16 {
        self.port
    }

    pub fn tls_port_number(&self) -> u16 {
        self.tls_port
    }

    /// Produce argv; the executable path is always first
    pub fn build(&self) -> Vec<String> {
        let mut args = vec![self.executable.to_string_lossy().into_owned()];

        if let Some(conf) = &self.config_file {
            args.push(conf.to_string_lossy().into_owned());
        }

        args.push("--port".to_string());
        args.push(self.port.to_string());

        if self.tls_port > 0 {
            args.push("--tls-port".to_string());
            args.push(self.tls_port.to_string());
        }

        if let Some((host, port)) = &self.replica_of {
            args.push("--slaveof".to_string());
            args.push(host.clone());
            args.push(port.to_string());
        }

        args
    }
}
