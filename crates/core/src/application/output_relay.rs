// Output Relay - drains child stdout into an OutputSink
//
// One tokio task per started process. Lines are decoded lossily, so bytes
// that are not UTF-8 become U+FFFD and draining continues. The task ends on
// EOF, on the first I/O error (reported to the sink, never propagated) or on
// cancellation. The stream is dropped on every exit path.

use super::cancel::{cancel_channel, CancelHandle, CancelToken};
use crate::port::{OutputSink, OutputStream};
use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

static FALLBACK_ID: AtomicU64 = AtomicU64::new(1);

/// Tag for relayed lines: `label:pid(N)`, or `label:id(N)` with a
/// process-unique number when the pid is unavailable
pub fn relay_tag(label: &str, pid: Option<u32>) -> String {
    let label = if label.trim().is_empty() {
        "unknown"
    } else {
        label
    };

    match pid {
        Some(pid) => format!("{}:pid({})", label, pid),
        None => format!(
            "{}:id({})",
            label,
            FALLBACK_ID.fetch_add(1, Ordering::Relaxed)
        ),
    }
}

/// Handle to a running relay task
pub struct OutputRelay {
    tag: String,
    cancel: CancelHandle,
    handle: JoinHandle<()>,
}

impl OutputRelay {
    /// Spawn the relay task. Must be called from within a tokio runtime.
    pub fn attach(sink: Arc<dyn OutputSink>, stream: OutputStream, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        let (cancel, token) = cancel_channel();
        let handle = tokio::spawn(relay_lines(sink, stream, tag.clone(), token));

        Self { tag, cancel, handle }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Request cancellation without waiting
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the stream to close on its own
    pub async fn join(self) {
        let tag = self.tag;
        if let Err(e) = self.handle.await {
            warn!(source = %tag, error = %e, "output relay task failed");
        }
    }

    /// Cancel, then wait for the task to finish. Lines already buffered
    /// are still delivered before the task observes cancellation.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        self.join().await;
    }
}

async fn relay_lines(
    sink: Arc<dyn OutputSink>,
    stream: OutputStream,
    tag: String,
    mut cancel: CancelToken,
) {
    let mut reader = BufReader::new(stream);
    // Partial reads stay in `line` if cancellation wins the select
    let mut line = Vec::new();

    loop {
        tokio::select! {
            biased;
            read = reader.read_until(b'\n', &mut line) => match read {
                Ok(0) => {
                    debug!(source = %tag, "output stream closed");
                    break;
                }
                Ok(_) => {
                    sink.line(&tag, &decode_line(&line));
                    line.clear();
                }
                Err(e) => {
                    sink.read_failed(&tag, &e);
                    break;
                }
            },
            _ = cancel.cancelled() => {
                debug!(source = %tag, "output relay cancelled");
                break;
            }
        }
    }

    drop(reader);
}

/// Strip the line terminator (`\n` or `\r\n`) and decode lossily
fn decode_line(raw: &[u8]) -> Cow<'_, str> {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw)
}
