//! Inline script execution: run one executable file to completion.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use serde::Serialize;
use tokio::process::Command;

pub const SCRIPT_NOT_FOUND: &str = "Script file not found";
pub const SCRIPT_SUCCEEDED: &str = "Script executed successfully";

/// Mode bits granted to scripts that are not executable yet.
const EXEC_MODE: u32 = 0o555;

/// Outcome of one script run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub message: String,
    /// Captured standard error of a failed run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}

impl ExecutionResult {
    fn succeeded() -> Self {
        Self {
            success: true,
            message: SCRIPT_SUCCEEDED.to_string(),
            stderr: None,
        }
    }

    fn failed(message: impl Into<String>, stderr: Option<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            stderr,
        }
    }
}

/// Spawns scripts directly (no shell) and waits for them.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run `path` and wait for it to exit. Never returns an error: every
    /// failure is folded into the [`ExecutionResult`].
    pub async fn execute(&self, path: &Path) -> ExecutionResult {
        let metadata = match tokio::fs::metadata(path).await {
            Ok(m) if m.is_file() => m,
            _ => {
                tracing::info!(script = %path.display(), "script not found");
                return ExecutionResult::failed(SCRIPT_NOT_FOUND, None);
            }
        };
        ensure_executable(path, &metadata).await;

        tracing::info!(script = %path.display(), "executing script");
        let output = Command::new(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();
        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, output).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(script = %path.display(), ?limit, "script timed out, killed");
                    return ExecutionResult::failed(
                        format!("Script timed out after {}s", limit.as_secs_f64()),
                        None,
                    );
                }
            },
            None => output.await,
        };

        match output {
            Ok(output) if output.status.success() => {
                tracing::info!(script = %path.display(), "script finished");
                ExecutionResult::succeeded()
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
                tracing::info!(
                    script = %path.display(),
                    code = ?output.status.code(),
                    "script failed"
                );
                ExecutionResult::failed(format!("Script failed: {}", stderr.trim()), Some(stderr))
            }
            Err(e) => {
                tracing::warn!(script = %path.display(), error = %e, "failed to spawn script");
                ExecutionResult::failed(format!("Failed to execute script: {e}"), None)
            }
        }
    }
}

/// Best-effort `chmod +rx`; a failure here surfaces later as a spawn error.
#[cfg(unix)]
async fn ensure_executable(path: &Path, metadata: &std::fs::Metadata) {
    use std::os::unix::fs::PermissionsExt;

    let mode = metadata.permissions().mode();
    if mode & 0o111 != 0 {
        return;
    }
    let permissions = std::fs::Permissions::from_mode(mode | EXEC_MODE);
    if let Err(e) = tokio::fs::set_permissions(path, permissions).await {
        tracing::debug!(script = %path.display(), error = %e, "could not mark script executable");
    }
}

#[cfg(not(unix))]
async fn ensure_executable(_path: &Path, _metadata: &std::fs::Metadata) {}
