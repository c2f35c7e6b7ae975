//! `Supervisor`: the entry point the HTTP server and CLI call into.

use std::path::Path;
use std::sync::Arc;

use scriptmux_tmux::{Multiplexer, PaneTarget, Session, TmuxError};
use tokio::sync::mpsc;

use crate::config::SupervisorConfig;
use crate::error::SupervisorError;
use crate::lists::{self, ListSpec};
use crate::runner::{ExecutionResult, ProcessRunner};
use crate::stream::{StreamEvent, StreamOptions, spawn_output_stream};

/// Owns the configuration and the multiplexer handle. Cheap to clone.
#[derive(Clone)]
pub struct Supervisor {
    config: Arc<SupervisorConfig>,
    mux: Arc<dyn Multiplexer>,
    runner: ProcessRunner,
}

impl Supervisor {
    pub fn new(config: SupervisorConfig, mux: Arc<dyn Multiplexer>) -> Self {
        let runner = ProcessRunner::new().with_timeout(config.exec_timeout);
        Self {
            config: Arc::new(config),
            mux,
            runner,
        }
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    /// Run a script inline. Relative paths resolve against the script dir.
    pub async fn execute(&self, path: impl AsRef<Path>) -> ExecutionResult {
        let path = self.config.resolve_script(path);
        self.runner.execute(&path).await
    }

    pub async fn list_sessions(&self) -> Vec<Session> {
        self.mux.list_sessions().await
    }

    pub async fn kill_session(&self, name: &str) -> bool {
        let killed = self.mux.kill_session(name).await;
        tracing::info!(session = %name, killed, "kill requested");
        killed
    }

    /// Launch `command` in a new detached session. Relative script paths
    /// resolve against the script dir.
    pub async fn start_session(&self, name: &str, command: &str) -> Result<(), TmuxError> {
        let resolved = self.config.resolve_script(command);
        let is_script = tokio::fs::metadata(&resolved)
            .await
            .is_ok_and(|m| m.is_file());
        let command = if is_script {
            resolved.to_string_lossy().into_owned()
        } else {
            command.to_string()
        };
        self.mux.start_session(name, &command).await?;
        tracing::info!(session = %name, command = %command, "session started");
        Ok(())
    }

    /// One-shot pane text. Failures come back as error text.
    pub async fn snapshot(&self, target: &PaneTarget) -> String {
        self.mux.snapshot(target).await
    }

    /// Open a change-only stream of `target`'s output.
    pub fn stream(&self, target: PaneTarget) -> mpsc::Receiver<StreamEvent> {
        spawn_output_stream(
            Arc::clone(&self.mux),
            target,
            StreamOptions::from(self.config.as_ref()),
        )
    }

    fn list_spec(&self, name: &str) -> Result<&ListSpec, SupervisorError> {
        self.config
            .list(name)
            .ok_or_else(|| SupervisorError::ListNotConfigured(name.to_string()))
    }

    pub async fn read_list(&self, name: &str) -> Result<Vec<String>, SupervisorError> {
        let spec = self.list_spec(name)?;
        Ok(lists::read_list(spec).await)
    }

    /// Replace a list's entries. Entries are trimmed and blanks dropped.
    pub async fn write_list(
        &self,
        name: &str,
        entries: &[String],
    ) -> Result<Vec<String>, SupervisorError> {
        let spec = self.list_spec(name)?;
        let entries = lists::clean_entries(entries);
        lists::write_list(spec, &entries).await?;
        Ok(entries)
    }
}
