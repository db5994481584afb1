//! The ingestion loop.

use crate::error::{StreamError, StreamResult};
use crate::source::EventSource;
use command_router::{CommandRegistry, Entry};
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};

/// Where per-message errors are delivered.
pub type ErrorSink = mpsc::Sender<StreamError>;

/// Create a bounded error sink and its receiver.
pub fn error_channel(capacity: usize) -> (ErrorSink, mpsc::Receiver<StreamError>) {
    mpsc::channel(capacity.max(1))
}

/// Counters for one run of [`StreamManager::listen`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenStats {
    /// Lines read, keep-alives included.
    pub lines: u64,
    /// Entries that routed to a command.
    pub matched: u64,
    /// Handlers actually invoked.
    pub handled: u64,
    /// Per-message errors raised (delivered or dropped).
    pub errors: u64,
}

/// Consumes a stream of entries and routes each to its command handler.
pub struct StreamManager {
    registry: Arc<CommandRegistry>,
    error_tx: Option<ErrorSink>,
    stop_tx: broadcast::Sender<()>,
    stop_rx: broadcast::Receiver<()>,
}

impl StreamManager {
    /// Create a manager over a fully registered, resolved command tree.
    ///
    /// Without an error sink, per-message errors are logged and dropped.
    pub fn new(registry: Arc<CommandRegistry>, error_tx: Option<ErrorSink>) -> Self {
        let (stop_tx, stop_rx) = broadcast::channel(1);
        Self {
            registry,
            error_tx,
            stop_tx,
            stop_rx,
        }
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// Get a clone of the stop signal sender.
    ///
    /// Sending on it ends [`listen`](Self::listen) before its next read.
    pub fn stop_sender(&self) -> broadcast::Sender<()> {
        self.stop_tx.clone()
    }

    /// Ask a running (or the next) `listen` call to return.
    pub fn stop(&self) {
        info!("Sending stop signal to stream listener");
        let _ = self.stop_tx.send(());
    }

    /// Run the loop until the stream ends, a stop signal arrives, or a read fails.
    ///
    /// End of stream and stop both return `Ok`; a read failure returns
    /// [`StreamError::Transport`].
    pub async fn listen<S: EventSource>(&mut self, mut source: S) -> StreamResult<ListenStats> {
        let mut stats = ListenStats::default();
        info!(commands = self.registry.len(), "Stream listener started");

        loop {
            let line = tokio::select! {
                biased;

                _ = self.stop_rx.recv() => {
                    info!(lines = stats.lines, "Stop signal received - stream listener exiting");
                    return Ok(stats);
                }

                line = source.next_line() => line,
            };

            match line {
                Ok(Some(line)) => {
                    stats.lines += 1;
                    self.process_line(&line, &mut stats);
                }
                Ok(None) => {
                    info!(lines = stats.lines, "Stream ended");
                    return Ok(stats);
                }
                Err(e) => {
                    error!(error = %e, "Stream read failed");
                    return Err(StreamError::Transport(e));
                }
            }
        }
    }

    /// Decode, match and handle one line.
    fn process_line(&self, line: &[u8], stats: &mut ListenStats) {
        if line.iter().all(u8::is_ascii_whitespace) {
            return;
        }

        let entry: Entry = match serde_json::from_slice(line) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Failed to decode stream entry");
                self.report(StreamError::Decode(e), stats);
                return;
            }
        };

        let outcome = match self.registry.dispatch(&entry) {
            Ok(outcome) => outcome,
            Err(e) => {
                debug!(flow = %entry.flow, error = %e, "Entry did not match a command");
                self.report(StreamError::Dispatch(e), stats);
                return;
            }
        };

        stats.matched += 1;
        debug!(
            flow = %entry.flow,
            pattern = %outcome.pattern,
            classification = %outcome.classification,
            "Entry matched command"
        );

        if outcome.invoke(&entry) {
            stats.handled += 1;
        } else if let Some(e) = outcome.trailing_error() {
            self.report(StreamError::Dispatch(e), stats);
        }
    }

    /// Hand an error to the sink without ever waiting on it.
    fn report(&self, err: StreamError, stats: &mut ListenStats) {
        stats.errors += 1;
        let Some(tx) = &self.error_tx else {
            debug!(error = %err, "No error sink - dropping stream error");
            return;
        };
        match tx.try_send(err) {
            Ok(()) => {}
            Err(TrySendError::Full(err)) => {
                debug!(error = %err, "Error sink full - dropping stream error");
            }
            Err(TrySendError::Closed(err)) => {
                debug!(error = %err, "Error sink closed - dropping stream error");
            }
        }
    }
}

impl std::fmt::Debug for StreamManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamManager")
            .field("commands", &self.registry.len())
            .field("has_error_sink", &self.error_tx.is_some())
            .finish_non_exhaustive()
    }
}
