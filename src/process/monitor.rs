//! Node output relay and readiness detection.
//!
//! Chunks are matched as they arrive; a marker split across two reads is
//! not detected. The node writes each log line in a single write.

use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::process::supervisor::OutputStream;

const CHUNK_SIZE: usize = 8 * 1024;

/// Which node stream a notification refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    /// Standard output.
    Standard,
    /// Standard error, where the node logs.
    Diagnostic,
}

/// Notification sent from a relay task to the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSignal {
    /// A diagnostic chunk contained the readiness marker.
    Ready,
    /// The stream reached end of file or failed.
    Closed(StreamKind),
}

/// Does `chunk` contain `marker`?
pub fn contains_marker(chunk: &[u8], marker: &str) -> bool {
    let marker = marker.as_bytes();
    if marker.is_empty() {
        return true;
    }
    chunk.windows(marker.len()).any(|window| window == marker)
}

/// Relays node output and reports the readiness marker.
#[derive(Debug, Clone)]
pub struct LogMonitor {
    marker: Arc<str>,
    relay: bool,
}

impl LogMonitor {
    pub fn new(marker: &str) -> Self {
        Self {
            marker: Arc::from(marker),
            relay: true,
        }
    }

    /// Stop copying chunks to this process's own stdout / stderr.
    pub fn without_relay(mut self) -> Self {
        self.relay = false;
        self
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Spawn a task draining `reader` until end of file.
    pub fn spawn(
        &self,
        mut reader: OutputStream,
        kind: StreamKind,
        signals: mpsc::UnboundedSender<LogSignal>,
    ) -> JoinHandle<()> {
        let marker = self.marker.clone();
        let mut sink: Option<Box<dyn AsyncWrite + Send + Unpin>> = match (self.relay, kind) {
            (false, _) => None,
            (true, StreamKind::Standard) => Some(Box::new(tokio::io::stdout())),
            (true, StreamKind::Diagnostic) => Some(Box::new(tokio::io::stderr())),
        };

        tokio::spawn(async move {
            let mut buf = vec![0u8; CHUNK_SIZE];
            loop {
                let n = match reader.read(&mut buf).await {
                    Ok(0) => break,
                    Ok(n) => n,
                    Err(e) => {
                        tracing::warn!(stream = ?kind, error = %e, "Failed to read node output");
                        break;
                    }
                };
                let chunk = &buf[..n];

                if let Some(out) = sink.as_mut() {
                    if out.write_all(chunk).await.is_err() {
                        sink = None;
                    }
                }

                if kind == StreamKind::Diagnostic && contains_marker(chunk, &marker) {
                    let _ = signals.send(LogSignal::Ready);
                }
            }

            if let Some(out) = sink.as_mut() {
                let _ = out.flush().await;
            }
            tracing::debug!(stream = ?kind, "Node output closed");
            let _ = signals.send(LogSignal::Closed(kind));
        })
    }
}
