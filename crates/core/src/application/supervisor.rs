//! Process Supervisor - lifecycle of one redis-server child
//!
//! States: `Stopped -> Starting -> Active -> Stopped`. `start` is only valid
//! from `Stopped`; `stop` from `Stopped` is a no-op. Both run under one async
//! mutex, so they never interleave on the same instance. Distinct instances
//! share nothing.
//!
//! Public contract on readiness: `start` marks the instance active once the
//! child has been spawned, **whether or not** the readiness probe succeeded
//! within its budget. The probe outcome is returned as an advisory
//! [`Readiness`] value. `is_active` therefore means "spawned and not yet torn
//! down", not "accepting connections".
//!
//! Cleanup is scoped: dropping an active instance terminates its child. This
//! is a hard kill, not a graceful stop: the terminate signal is followed at
//! once by the launcher's kill-on-drop (SIGKILL for the tokio launcher), so
//! redis gets no time to persist. Call `stop` for a clean shutdown.
//!
//! `Drop` does not run when the process aborts (`panic = "abort"`) or is
//! killed by an unhandled signal. Callers that must not leak the child handle
//! SIGTERM themselves and call `stop`.

use super::constants::PROCESS_LABEL;
use super::output_relay::{relay_tag, OutputRelay};
use super::readiness::{await_ready, Readiness, ReadinessConfig};
use crate::error::{AppError, Result};
use crate::port::{ChildProcess, LaunchRequest, OutputSink, ProcessLauncher, ReadinessProbe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Live child plus its relay task
struct RunningServer {
    child: Box<dyn ChildProcess>,
    relay: Option<OutputRelay>,
}

/// One supervised redis-server instance. Restartable after `stop`.
pub struct ServerInstance {
    args: Vec<String>,
    port: u16,
    tls_port: u16,
    readiness: ReadinessConfig,
    launcher: Arc<dyn ProcessLauncher>,
    probe: Arc<dyn ReadinessProbe>,
    sink: Arc<dyn OutputSink>,
    active: AtomicBool,
    running: Mutex<Option<RunningServer>>,
}

impl ServerInstance {
    /// Create a stopped instance
    ///
    /// # Arguments
    /// * `args` - Argument vector; the first element is the executable path
    /// * `port` - Primary port, probed for readiness (0 = unset)
    /// * `tls_port` - Secondary TLS port (0 = unset)
    /// * `launcher` - Spawns the child process
    /// * `probe` - Single-attempt readiness check
    /// * `sink` - Receives relayed stdout lines
    pub fn new(
        args: Vec<String>,
        port: u16,
        tls_port: u16,
        launcher: Arc<dyn ProcessLauncher>,
        probe: Arc<dyn ReadinessProbe>,
        sink: Arc<dyn OutputSink>,
    ) -> Self {
        Self {
            args,
            port,
            tls_port,
            readiness: ReadinessConfig::default(),
            launcher,
            probe,
            sink,
            active: AtomicBool::new(false),
            running: Mutex::new(None),
        }
    }

    /// Override the readiness timings (defaults: 10s / 500ms / 100ms)
    pub fn with_readiness(mut self, readiness: ReadinessConfig) -> Self {
        self.readiness = readiness;
        self
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Primary port as a 0- or 1-element list
    pub fn ports(&self) -> Vec<u16> {
        port_list(self.port)
    }

    /// TLS port as a 0- or 1-element list
    pub fn tls_ports(&self) -> Vec<u16> {
        port_list(self.tls_port)
    }

    /// Pid of the current child. Waits for any in-flight start/stop.
    pub async fn pid(&self) -> Option<u32> {
        self.running
            .lock()
            .await
            .as_ref()
            .and_then(|server| server.child.id())
    }

    /// Spawn the child, attach the output relay, then poll readiness.
    ///
    /// # Errors
    /// - AppError::AlreadyRunning if the instance is active
    /// - AppError::Spawn if argv is empty or the process cannot start
    pub async fn start(&self) -> Result<Readiness> {
        let mut running = self.running.lock().await;

        if self.is_active() {
            return Err(AppError::AlreadyRunning(format!(
                "redis server instance on port {} is already running",
                self.port
            )));
        }

        let request = LaunchRequest::from_argv(&self.args)?;
        info!(
            program = %request.program.display(),
            working_dir = %request.working_dir.display(),
            port = %self.port,
            "Starting redis server"
        );

        let started = Instant::now();
        let mut child = self.launcher.launch(&request).await?;
        let pid = child.id();

        let relay = child.take_stdout().map(|stdout| {
            OutputRelay::attach(self.sink.clone(), stdout, relay_tag(PROCESS_LABEL, pid))
        });

        let readiness = if self.port == 0 {
            warn!("No primary port configured, skipping readiness probe");
            Readiness::TimedOut {
                elapsed: started.elapsed(),
            }
        } else {
            await_ready(self.probe.as_ref(), self.port, &self.readiness).await
        };

        *running = Some(RunningServer { child, relay });
        self.active.store(true, Ordering::SeqCst);

        info!(
            pid = ?pid,
            port = %self.port,
            ready = readiness.is_ready(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Redis server instance active"
        );

        Ok(readiness)
    }

    /// Terminate the child and wait for it to exit. No-op when stopped.
    ///
    /// # Errors
    /// - AppError::ProcessTeardown if waiting for exit fails; the instance
    ///   stays active so the stop can be retried
    pub async fn stop(&self) -> Result<()> {
        let mut running = self.running.lock().await;

        if !self.is_active() {
            return Ok(());
        }

        if let Some(server) = running.as_mut() {
            let pid = server.child.id();
            info!(pid = ?pid, port = %self.port, "Stopping redis server");

            if let Err(e) = server.child.terminate() {
                warn!(pid = ?pid, error = %e, "Terminate signal failed, waiting for exit anyway");
            }

            let exit_code = server.child.wait().await?;
            info!(pid = ?pid, exit_code = ?exit_code, "Redis server exited");
        }

        if let Some(relay) = running.take().and_then(|server| server.relay) {
            relay.shutdown().await;
        }

        self.active.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// Hard kill; see the module docs
impl Drop for ServerInstance {
    fn drop(&mut self) {
        if let Some(mut server) = self.running.get_mut().take() {
            warn!(
                pid = ?server.child.id(),
                port = %self.port,
                "Server instance dropped while active, terminating child"
            );
            if let Err(e) = server.child.terminate() {
                warn!(error = %e, "Failed to terminate child on drop");
            }
            if let Some(relay) = &server.relay {
                relay.cancel();
            }
        }
    }
}

fn port_list(port: u16) -> Vec<u16> {
    if port > 0 {
        vec![port]
    } else {
        Vec::new()
    }
}
