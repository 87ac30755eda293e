//! Embedded Redis - Main Entry Point
//! Resolves the bundled redis-server, runs it until Ctrl+C or SIGTERM, then
//! stops it.

mod config;
mod shutdown;

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use embedded_redis_core::application::ServerInstance;
use embedded_redis_core::domain::{ExecutableRegistry, OsFamily, ServerCommand};
use embedded_redis_core::port::TracingOutputSink;
use embedded_redis_infra_system::{
    DirectoryArtifactStore, ExecutableResolver, PlatformDetector, TcpReadinessProbe,
    TokioProcessLauncher,
};

use crate::config::DaemonConfig;
use crate::shutdown::ShutdownSignal;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging
    let log_format =
        std::env::var("EMBEDDED_REDIS_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("embedded_redis=info"))?;

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    info!("Embedded Redis v{} starting...", VERSION);

    // 2. Load configuration
    let config = DaemonConfig::load()?;
    // Before the child exists, so no stop request can slip past it
    let mut shutdown = ShutdownSignal::install()?;

    info!(
        port = config.port,
        tls_port = config.tls_port,
        bind = %config.bind,
        artifact_dir = %config.artifact_dir().display(),
        "Configuration loaded"
    );

    // 3. Resolve the executable
    let registry = match config.executable() {
        Some(path) => OsFamily::ALL
            .iter()
            .try_fold(ExecutableRegistry::builder(), |builder, os| {
                builder.override_os(*os, path.clone())
            })?
            .build(),
        None => ExecutableRegistry::defaults(),
    };

    let mut resolver = ExecutableResolver::new(
        registry,
        Arc::new(PlatformDetector::new()),
        Arc::new(DirectoryArtifactStore::new(config.artifact_dir())),
    );
    if let Some(dir) = config.data_dir() {
        resolver = resolver.with_data_dir(dir);
    }

    let executable = resolver
        .resolve()
        .await
        .map_err(|e| anyhow::anyhow!("Executable resolution failed: {}", e))?;
    info!(executable = %executable, "Redis executable ready");

    // 4. Build the command line
    let mut command = ServerCommand::new(&executable)
        .port(config.port)
        .tls_port(config.tls_port);
    if let Some(conf) = config.config_file() {
        command = command.config_file(conf);
    }

    // 5. Start the server
    let server = ServerInstance::new(
        command.build(),
        command.port_number(),
        command.tls_port_number(),
        Arc::new(TokioProcessLauncher::new()),
        Arc::new(TcpReadinessProbe::new()),
        Arc::new(TracingOutputSink),
    )
    .with_readiness(config.readiness());

    let readiness = server
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("Redis server start failed: {}", e))?;

    if readiness.is_ready() {
        info!(ports = ?server.ports(), tls_ports = ?server.tls_ports(), "Redis server ready");
    } else {
        warn!(
            elapsed_ms = readiness.elapsed().as_millis() as u64,
            "Redis server not accepting connections yet, continuing"
        );
    }
    info!("Press Ctrl+C to shutdown");

    // 6. Wait for shutdown signal
    let received = shutdown.recv().await?;

    info!(signal = received, "Shutdown signal received. Stopping redis server...");
    server
        .stop()
        .await
        .map_err(|e| anyhow::anyhow!("Redis server stop failed: {}", e))?;

    info!("Shutdown complete.");

    Ok(())
}
