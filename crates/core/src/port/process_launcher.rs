// Process Launcher Port
// Abstraction over spawning and tearing down the redis-server child

use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncRead;

/// Child stdout handed to the output relay
pub type OutputStream = Box<dyn AsyncRead + Send + Unpin>;

/// Everything needed to spawn one child process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

impl LaunchRequest {
    /// Build from an argument vector whose first element is the executable.
    /// The working directory is the executable's parent directory.
    ///
    /// # Errors
    /// - AppError::Spawn if `argv` is empty
    pub fn from_argv(argv: &[String]) -> Result<Self> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| AppError::Spawn("empty argument vector".to_string()))?;

        let program = PathBuf::from(program);
        let working_dir = program
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            program,
            args: args.to_vec(),
            working_dir,
        })
    }
}

/// Handle to a spawned child
#[async_trait]
pub trait ChildProcess: Send {
    /// OS process id, if still known
    fn id(&self) -> Option<u32>;

    /// Take the stdout stream (only the first call returns Some)
    fn take_stdout(&mut self) -> Option<OutputStream>;

    /// Ask the child to exit (SIGTERM on Unix). Does not wait.
    fn terminate(&mut self) -> Result<()>;

    /// Block until the child has exited; returns the exit code if any
    ///
    /// # Errors
    /// - AppError::ProcessTeardown if the wait is interrupted
    async fn wait(&mut self) -> Result<Option<i32>>;
}

/// Process launcher port
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Spawn a child with piped stdout
    ///
    /// # Errors
    /// - AppError::Spawn if the process cannot be started
    async fn launch(&self, request: &LaunchRequest) -> Result<Box<dyn ChildProcess>>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::sync::watch;

    /// Mock launcher that hands out fake children.
    ///
    /// Children exit only once terminated; `live_children` counts the ones
    /// launched and not yet terminated.
    pub struct MockProcessLauncher {
        launches: Mutex<Vec<LaunchRequest>>,
        next_pid: AtomicU32,
        live: Arc<AtomicUsize>,
        output: Vec<u8>,
        fail_spawn: bool,
        fail_wait: Arc<AtomicBool>,
    }

    impl MockProcessLauncher {
        pub fn new() -> Self {
            Self {
                launches: Mutex::new(Vec::new()),
                next_pid: AtomicU32::new(4000),
                live: Arc::new(AtomicUsize::new(0)),
                output: Vec::new(),
                fail_spawn: false,
                fail_wait: Arc::new(AtomicBool::new(false)),
            }
        }

        /// Bytes every child writes to stdout before closing it
        pub fn with_output(mut self, output: impl Into<Vec<u8>>) -> Self {
            self.output = output.into();
            self
        }

        pub fn failing_spawn() -> Self {
            Self {
                fail_spawn: true,
                ..Self::new()
            }
        }

        /// Make subsequent waits fail as if interrupted
        pub fn set_fail_wait(&self, fail: bool) {
            self.fail_wait.store(fail, Ordering::SeqCst);
        }

        pub fn launches(&self) -> Vec<LaunchRequest> {
            self.launches.lock().unwrap().clone()
        }

        pub fn live_children(&self) -> usize {
            self.live.load(Ordering::SeqCst)
        }
    }

    impl Default for MockProcessLauncher {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ProcessLauncher for MockProcessLauncher {
        async fn launch(&self, request: &LaunchRequest) -> Result<Box<dyn ChildProcess>> {
            if self.fail_spawn {
                return Err(AppError::Spawn(format!(
                    "mock spawn failure for {}",
                    request.program.display()
                )));
            }

            self.launches.lock().unwrap().push(request.clone());
            self.live.fetch_add(1, Ordering::SeqCst);

            let (terminated_tx, terminated_rx) = watch::channel(false);
            Ok(Box::new(MockChild {
                pid: self.next_pid.fetch_add(1, Ordering::SeqCst),
                stdout: Some(self.output.clone()),
                terminated_tx,
                terminated_rx,
                live: self.live.clone(),
                fail_wait: self.fail_wait.clone(),
            }))
        }
    }

    pub struct MockChild {
        pid: u32,
        stdout: Option<Vec<u8>>,
        terminated_tx: watch::Sender<bool>,
        terminated_rx: watch::Receiver<bool>,
        live: Arc<AtomicUsize>,
        fail_wait: Arc<AtomicBool>,
    }

    #[async_trait]
    impl ChildProcess for MockChild {
        fn id(&self) -> Option<u32> {
            Some(self.pid)
        }

        fn take_stdout(&mut self) -> Option<OutputStream> {
            self.stdout
                .take()
                .map(|bytes| Box::new(std::io::Cursor::new(bytes)) as OutputStream)
        }

        fn terminate(&mut self) -> Result<()> {
            if !*self.terminated_rx.borrow() {
                self.live.fetch_sub(1, Ordering::SeqCst);
                let _ = self.terminated_tx.send(true);
            }
            Ok(())
        }

        async fn wait(&mut self) -> Result<Option<i32>> {
            if self.fail_wait.load(Ordering::SeqCst) {
                return Err(AppError::ProcessTeardown("mock wait interrupted".to_string()));
            }
            loop {
                let terminated = *self.terminated_rx.borrow();
                if terminated || self.terminated_rx.changed().await.is_err() {
                    break;
                }
            }
            Ok(Some(0))
        }
    }
}
