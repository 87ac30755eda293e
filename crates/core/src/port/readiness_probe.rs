// Readiness Probe Port
// One liveness attempt against the child's primary port
use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    /// Single attempt; true if the port accepted a connection within `timeout`
    async fn probe(&self, port: u16, timeout: Duration) -> bool;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Succeeds from the N-th attempt on (1-based); `never()` always fails
    pub struct MockReadinessProbe {
        succeed_on: Option<usize>,
        attempts: AtomicUsize,
    }

    impl MockReadinessProbe {
        pub fn ready_after(attempts: usize) -> Self {
            Self {
                succeed_on: Some(attempts.max(1)),
                attempts: AtomicUsize::new(0),
            }
        }

        pub fn always_ready() -> Self {
            Self::ready_after(1)
        }

        pub fn never() -> Self {
            Self {
                succeed_on: None,
                attempts: AtomicUsize::new(0),
            }
        }

        pub fn attempts(&self) -> usize {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReadinessProbe for MockReadinessProbe {
        async fn probe(&self, _port: u16, _timeout: Duration) -> bool {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            self.succeed_on.is_some_and(|n| attempt >= n)
        }
    }
}
