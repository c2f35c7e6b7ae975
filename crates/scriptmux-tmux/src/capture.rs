//! Pane capture.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TmuxError;
use crate::executor::TmuxCommandRunner;

/// Prefix of the text returned by [`snapshot_text`] when a capture fails.
pub const CAPTURE_ERROR_PREFIX: &str = "Error capturing output";

/// A window/pane coordinate inside a named session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaneTarget {
    pub session: String,
    #[serde(default)]
    pub window: u32,
    #[serde(default)]
    pub pane: u32,
}

impl PaneTarget {
    /// First window, first pane of `session`.
    pub fn session(name: impl Into<String>) -> Self {
        Self {
            session: name.into(),
            window: 0,
            pane: 0,
        }
    }

    #[must_use]
    pub fn with_window(mut self, window: u32) -> Self {
        self.window = window;
        self
    }

    #[must_use]
    pub fn with_pane(mut self, pane: u32) -> Self {
        self.pane = pane;
        self
    }

    /// `-t` argument for tmux. The `=` prefix makes tmux match the session
    /// name exactly instead of falling back to a prefix match.
    pub fn tmux_target(&self) -> String {
        format!("={self}")
    }
}

/// Renders as a tmux target: `session:window.pane`.
impl fmt::Display for PaneTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}.{}", self.session, self.window, self.pane)
    }
}

/// Capture the currently rendered text of a pane.
pub async fn capture_pane(
    runner: &impl TmuxCommandRunner,
    target: &PaneTarget,
) -> Result<String, TmuxError> {
    let target = target.tmux_target();
    runner.run(&["capture-pane", "-p", "-t", &target]).await
}

/// Collapse a capture result into plain text; failures become a
/// human-readable error line instead of an `Err`.
pub fn snapshot_text(result: Result<String, TmuxError>) -> String {
    match result {
        Ok(text) => text,
        Err(e) => format!("{CAPTURE_ERROR_PREFIX}: {e}"),
    }
}
