// Output Sink Port
// Where relayed child output ends up

/// Receives child stdout lines tagged with the process identifier
pub trait OutputSink: Send + Sync {
    fn line(&self, tag: &str, line: &str);

    /// Read failure while draining; the relay stops after reporting it
    fn read_failed(&self, tag: &str, error: &std::io::Error);
}

/// Production sink: forwards every line to `tracing`
pub struct TracingOutputSink;

impl OutputSink for TracingOutputSink {
    fn line(&self, tag: &str, line: &str) {
        tracing::info!(target: "embedded_redis::output", source = %tag, "{}", line);
    }

    fn read_failed(&self, tag: &str, error: &std::io::Error) {
        tracing::error!(
            target: "embedded_redis::output",
            source = %tag,
            error = %error,
            "while reading output"
        );
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Collects everything it receives
    #[derive(Default)]
    pub struct CollectingOutputSink {
        lines: Mutex<Vec<(String, String)>>,
        errors: Mutex<Vec<(String, String)>>,
    }

    impl CollectingOutputSink {
        pub fn new() -> Self {
            Self::default()
        }

        /// (tag, line) pairs in arrival order
        pub fn lines(&self) -> Vec<(String, String)> {
            self.lines.lock().unwrap().clone()
        }

        pub fn errors(&self) -> Vec<(String, String)> {
            self.errors.lock().unwrap().clone()
        }
    }

    impl OutputSink for CollectingOutputSink {
        fn line(&self, tag: &str, line: &str) {
            self.lines
                .lock()
                .unwrap()
                .push((tag.to_string(), line.to_string()));
        }

        fn read_failed(&self, tag: &str, error: &std::io::Error) {
            self.errors
                .lock()
                .unwrap()
                .push((tag.to_string(), error.to_string()));
        }
    }
}
