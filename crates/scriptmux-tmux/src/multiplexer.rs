//! The narrow list/capture/kill/start seam the supervisor talks to.

use async_trait::async_trait;

use crate::capture::{PaneTarget, capture_pane, snapshot_text};
use crate::error::TmuxError;
use crate::executor::{TmuxCommandRunner, TmuxExecutor};
use crate::session::{self, Session};

/// Capability set of the multiplexer runtime.
///
/// Implementations must not cache session state: every call reflects what
/// the runtime reports at that moment.
#[async_trait]
pub trait Multiplexer: Send + Sync {
    /// Live sessions. Query failures are reported as an empty list.
    async fn list_sessions(&self) -> Vec<Session>;

    async fn capture(&self, target: &PaneTarget) -> Result<String, TmuxError>;

    /// Whether the runtime accepted the kill. Does not verify the session
    /// is gone afterwards.
    async fn kill_session(&self, name: &str) -> bool;

    async fn start_session(&self, name: &str, command: &str) -> Result<(), TmuxError>;

    /// Capture as plain text, with failures rendered inline.
    async fn snapshot(&self, target: &PaneTarget) -> String {
        snapshot_text(self.capture(target).await)
    }
}

/// tmux-backed [`Multiplexer`].
pub struct Tmux<R = TmuxExecutor> {
    runner: R,
}

impl<R: TmuxCommandRunner> Tmux<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl Default for Tmux<TmuxExecutor> {
    fn default() -> Self {
        Self::new(TmuxExecutor::default())
    }
}

#[async_trait]
impl<R: TmuxCommandRunner> Multiplexer for Tmux<R> {
    async fn list_sessions(&self) -> Vec<Session> {
        match session::list_sessions(&self.runner).await {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::debug!(error = %e, "list-sessions failed, reporting no sessions");
                Vec::new()
            }
        }
    }

    async fn capture(&self, target: &PaneTarget) -> Result<String, TmuxError> {
        capture_pane(&self.runner, target).await
    }

    async fn kill_session(&self, name: &str) -> bool {
        match session::kill_session(&self.runner, name).await {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(session = %name, error = %e, "kill-session failed");
                false
            }
        }
    }

    async fn start_session(&self, name: &str, command: &str) -> Result<(), TmuxError> {
        session::start_session(&self.runner, name, command).await
    }
}
