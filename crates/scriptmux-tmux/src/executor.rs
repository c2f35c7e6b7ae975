//! TmuxCommandRunner trait and TmuxExecutor (async subprocess wrapper).
//! The trait is the mock-injection point for everything above it.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::TmuxError;

/// Trait for executing tmux commands. Enables mock injection for testing.
#[async_trait]
pub trait TmuxCommandRunner: Send + Sync {
    async fn run(&self, args: &[&str]) -> Result<String, TmuxError>;
}

#[async_trait]
impl<T: TmuxCommandRunner + ?Sized> TmuxCommandRunner for &T {
    async fn run(&self, args: &[&str]) -> Result<String, TmuxError> {
        (**self).run(args).await
    }
}

/// Real tmux executor using `tokio::process::Command`.
///
/// Each call spawns a new `tmux` process, so the executor itself holds no
/// child handle and is `Send + Sync`.
#[derive(Debug, Clone)]
pub struct TmuxExecutor {
    tmux_bin: String,
    socket_path: Option<String>,
    socket_name: Option<String>,
    timeout: Option<Duration>,
}

impl TmuxExecutor {
    pub fn new(tmux_bin: impl Into<String>) -> Self {
        Self {
            tmux_bin: tmux_bin.into(),
            socket_path: None,
            socket_name: None,
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_socket_path(mut self, path: impl Into<String>) -> Self {
        self.socket_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_socket_name(mut self, name: impl Into<String>) -> Self {
        self.socket_name = Some(name.into());
        self
    }

    /// Bound every invocation by `timeout`. The child is killed when the
    /// deadline passes.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.tmux_bin);
        // Socket path takes precedence over socket name
        if let Some(ref path) = self.socket_path {
            cmd.args(["-S", path]);
        } else if let Some(ref name) = self.socket_name {
            cmd.args(["-L", name]);
        }
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

impl Default for TmuxExecutor {
    fn default() -> Self {
        Self::new("tmux")
    }
}

#[async_trait]
impl TmuxCommandRunner for TmuxExecutor {
    async fn run(&self, args: &[&str]) -> Result<String, TmuxError> {
        let output = self.command(args).output();
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, output)
                .await
                .map_err(|_| TmuxError::Timeout(limit))?,
            None => output.await,
        }
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TmuxError::NotFound
            } else {
                TmuxError::Io(e)
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TmuxError::CommandFailed(format!(
                "exit code {}: {}",
                output
                    .status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".into()),
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
