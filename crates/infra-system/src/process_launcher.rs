// Process launcher implementation
// reason: tokio::process for async child management, nix for SIGTERM
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use embedded_redis_core::error::{AppError, Result};
use embedded_redis_core::port::{ChildProcess, LaunchRequest, OutputStream, ProcessLauncher};

/// Spawns children with tokio::process.
///
/// stdin and stderr are discarded, stdout is piped for the output relay.
/// Children are killed if their handle is dropped without a wait.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioProcessLauncher;

impl TokioProcessLauncher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessLauncher for TokioProcessLauncher {
    async fn launch(&self, request: &LaunchRequest) -> Result<Box<dyn ChildProcess>> {
        let child = Command::new(&request.program)
            .args(&request.args)
            .current_dir(&request.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                AppError::Spawn(format!(
                    "failed to spawn {}: {}",
                    request.program.display(),
                    e
                ))
            })?;

        debug!(
            program = %request.program.display(),
            pid = ?child.id(),
            "Spawned child process"
        );

        Ok(Box::new(TokioChild { child }))
    }
}

pub struct TokioChild {
    child: Child,
}

#[async_trait]
impl ChildProcess for TokioChild {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    fn take_stdout(&mut self) -> Option<OutputStream> {
        self.child
            .stdout
            .take()
            .map(|stdout| Box::new(stdout) as OutputStream)
    }

    fn terminate(&mut self) -> Result<()> {
        // Already reaped
        let Some(pid) = self.child.id() else {
            return Ok(());
        };

        #[cfg(unix)]
        {
            use nix::errno::Errno;
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            match kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
                Ok(()) | Err(Errno::ESRCH) => Ok(()),
                Err(e) => {
                    warn!(pid, error = %e, "SIGTERM failed");
                    Err(AppError::ProcessTeardown(format!(
                        "failed to signal process {}: {}",
                        pid, e
                    )))
                }
            }
        }

        #[cfg(not(unix))]
        {
            self.child.start_kill().map_err(|e| {
                AppError::ProcessTeardown(format!("failed to kill process {}: {}", pid, e))
            })
        }
    }

    async fn wait(&mut self) -> Result<Option<i32>> {
        let status = self.child.wait().await.map_err(|e| {
            AppError::ProcessTeardown(format!("failed waiting for child exit: {}", e))
        })?;
        Ok(status.code())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;
    use tokio::io::{AsyncBufReadExt, BufReader};

    fn sh(script: &str) -> LaunchRequest {
        LaunchRequest {
            program: PathBuf::from("/bin/sh"),
            args: vec!["-c".to_string(), script.to_string()],
            working_dir: PathBuf::from("/"),
        }
    }

    #[tokio::test]
    async fn test_launch_pipes_stdout_and_terminates() {
        let launcher = TokioProcessLauncher::new();
        let mut child = launcher
            .launch(&sh("echo hello; exec sleep 30"))
            .await
            .unwrap();

        assert!(child.id().is_some());

        let stdout = child.take_stdout().unwrap();
        let mut lines = BufReader::new(stdout).lines();
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("hello"));
        assert!(child.take_stdout().is_none());

        child.terminate().unwrap();
        let code = tokio::time::timeout(Duration::from_secs(5), child.wait())
            .await
            .unwrap()
            .unwrap();
        // Killed by signal: no exit code
        assert_eq!(code, None);
    }

    #[tokio::test]
    async fn test_wait_reports_exit_code() {
        let launcher = TokioProcessLauncher::new();
        let mut child = launcher.launch(&sh("exit 3")).await.unwrap();

        assert_eq!(child.wait().await.unwrap(), Some(3));
        // Reaped child: terminate is a no-op
        tokio_test::assert_ok!(child.terminate());
    }

    #[tokio::test]
    async fn test_spawn_failure() {
        let launcher = TokioProcessLauncher::new();
        let request = LaunchRequest {
            program: PathBuf::from("/nonexistent/redis-server"),
            args: vec![],
            working_dir: PathBuf::from("/"),
        };

        let result = launcher.launch(&request).await;
        assert!(matches!(result, Err(AppError::Spawn(_))));
    }
}
