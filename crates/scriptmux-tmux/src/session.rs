//! Session records, `list-sessions` parser, and session lifecycle commands.

use serde::{Deserialize, Serialize};

use crate::error::TmuxError;
use crate::executor::TmuxCommandRunner;

/// One live tmux session as reported by `tmux list-sessions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Everything before the first `:` of the listing line.
    pub name: String,
    /// The listing line verbatim, for display.
    pub full_info: String,
}

impl Session {
    /// Parse one `name:rest-of-line` listing line. Blank lines yield `None`.
    pub fn from_line(line: &str) -> Option<Self> {
        if line.trim().is_empty() {
            return None;
        }
        let name = match line.split_once(':') {
            Some((name, _)) => name,
            None => line,
        };
        Some(Self {
            name: name.to_string(),
            full_info: line.to_string(),
        })
    }
}

/// Parse the raw output of `tmux list-sessions`.
pub fn parse_list_sessions_output(output: &str) -> Vec<Session> {
    output.lines().filter_map(Session::from_line).collect()
}

/// Execute `tmux list-sessions` and parse the output.
///
/// tmux exits non-zero when no server is running, so callers that want
/// "no sessions" semantics should treat the error as an empty list.
pub async fn list_sessions(runner: &impl TmuxCommandRunner) -> Result<Vec<Session>, TmuxError> {
    let output = runner.run(&["list-sessions"]).await?;
    Ok(parse_list_sessions_output(&output))
}

/// Kill the session named exactly `name`. The `=` prefix keeps tmux from
/// resolving a missing name to a longer session that starts with it.
pub async fn kill_session(runner: &impl TmuxCommandRunner, name: &str) -> Result<(), TmuxError> {
    let target = format!("={name}");
    runner.run(&["kill-session", "-t", &target]).await?;
    Ok(())
}

/// Start a detached session named `name` running `command`.
pub async fn start_session(
    runner: &impl TmuxCommandRunner,
    name: &str,
    command: &str,
) -> Result<(), TmuxError> {
    runner
        .run(&["new-session", "-d", "-s", name, command])
        .await?;
    Ok(())
}
