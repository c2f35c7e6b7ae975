//! Change-detecting output stream.
//!
//! One polling loop per observer. Each loop owns its last observed snapshot
//! and only emits when a new snapshot differs from it. The loop has no exit
//! condition of its own: it stops when the observer's channel closes.

use std::sync::Arc;
use std::time::Duration;

use scriptmux_tmux::{Multiplexer, PaneTarget, snapshot_text};
use tokio::sync::mpsc;

use crate::config::SupervisorConfig;

/// One event pushed to an observer. Payloads are already escaped and fit on
/// a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Output(String),
    /// Capture failure, only produced when error events are enabled.
    Error(String),
}

impl StreamEvent {
    pub fn payload(&self) -> &str {
        match self {
            StreamEvent::Output(p) | StreamEvent::Error(p) => p,
        }
    }

    /// Event-stream framing: `data: <payload>` followed by a blank line.
    pub fn to_frame(&self) -> String {
        match self {
            StreamEvent::Output(p) => format!("data: {p}\n\n"),
            StreamEvent::Error(p) => format!("event: error\ndata: {p}\n\n"),
        }
    }
}

/// Replace line breaks with their two-character escapes (`\n`, `\r`).
pub fn escape_newlines(text: &str) -> String {
    text.replace('\r', "\\r").replace('\n', "\\n")
}

/// Remembers the last observed snapshot.
#[derive(Debug, Default)]
pub struct ChangeDetector {
    last: String,
}

impl ChangeDetector {
    /// Returns `true` (and remembers `snapshot`) if it differs from the
    /// previous one.
    pub fn observe(&mut self, snapshot: &str) -> bool {
        if self.last == snapshot {
            return false;
        }
        self.last.clear();
        self.last.push_str(snapshot);
        true
    }

    pub fn last(&self) -> &str {
        &self.last
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamOptions {
    pub poll_interval: Duration,
    pub error_events: bool,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self::from(&SupervisorConfig::default())
    }
}

impl From<&SupervisorConfig> for StreamOptions {
    fn from(config: &SupervisorConfig) -> Self {
        Self {
            poll_interval: config.poll_interval,
            error_events: config.error_events,
        }
    }
}

/// Poll `target` until `tx` closes, sending an event on every change.
pub async fn run_output_stream<M>(
    mux: Arc<M>,
    target: PaneTarget,
    options: StreamOptions,
    tx: mpsc::Sender<StreamEvent>,
) where
    M: Multiplexer + ?Sized,
{
    let mut detector = ChangeDetector::default();
    tracing::debug!(pane = %target, "output stream opened");

    loop {
        if tx.is_closed() {
            break;
        }

        let event = match mux.capture(&target).await {
            Ok(text) => detector
                .observe(&text)
                .then(|| StreamEvent::Output(escape_newlines(&text))),
            Err(e) if options.error_events => {
                let reason = e.to_string();
                detector
                    .observe(&reason)
                    .then(|| StreamEvent::Error(escape_newlines(&reason)))
            }
            Err(e) => {
                let text = snapshot_text(Err(e));
                detector
                    .observe(&text)
                    .then(|| StreamEvent::Output(escape_newlines(&text)))
            }
        };

        if let Some(event) = event
            && tx.send(event).await.is_err()
        {
            break;
        }

        tokio::select! {
            () = tokio::time::sleep(options.poll_interval) => {}
            () = tx.closed() => break,
        }
    }

    tracing::debug!(pane = %target, "output stream closed");
}

/// Spawn a stream task and hand back its receiving end. Dropping the
/// receiver stops the task.
pub fn spawn_output_stream<M>(
    mux: Arc<M>,
    target: PaneTarget,
    options: StreamOptions,
) -> mpsc::Receiver<StreamEvent>
where
    M: Multiplexer + ?Sized + 'static,
{
    let (tx, rx) = mpsc::channel(1);
    tokio::spawn(run_output_stream(mux, target, options, tx));
    rx
}
