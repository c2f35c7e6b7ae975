//! `AppConfig`: TOML file settings, overridable from the command line.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use scriptmux_supervisor::lists::default_lists;
use scriptmux_supervisor::{ListSpec, SupervisorConfig};
use scriptmux_tmux::TmuxExecutor;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub bind_addr: String,
    pub script_dir: PathBuf,
    pub tmux_bin: String,
    /// tmux `-L` socket name.
    pub tmux_socket: Option<String>,
    pub poll_interval_ms: u64,
    pub exec_timeout_secs: Option<u64>,
    pub tmux_timeout_secs: Option<u64>,
    pub error_events: bool,
    /// Defaults to the `videos` and `songs` lists under `script_dir`.
    pub lists: Option<Vec<ListSpec>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:4000".to_string(),
            script_dir: PathBuf::from(scriptmux_supervisor::config::DEFAULT_SCRIPT_DIR),
            tmux_bin: "tmux".to_string(),
            tmux_socket: None,
            poll_interval_ms: 1000,
            exec_timeout_secs: None,
            tmux_timeout_secs: None,
            error_events: false,
            lists: None,
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Load from `path`. No path, or a path that does not exist, gives the
    /// defaults; a file that exists but does not parse is an error.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content)
                .with_context(|| format!("invalid config file {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "config file not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => {
                Err(e).with_context(|| format!("failed to read config file {}", path.display()))
            }
        }
    }

    pub fn supervisor_config(&self) -> SupervisorConfig {
        SupervisorConfig {
            script_dir: self.script_dir.clone(),
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            exec_timeout: self.exec_timeout_secs.map(Duration::from_secs),
            error_events: self.error_events,
            lists: self
                .lists
                .clone()
                .unwrap_or_else(|| default_lists(&self.script_dir)),
        }
    }

    pub fn executor(&self) -> TmuxExecutor {
        let executor = TmuxExecutor::new(&self.tmux_bin)
            .with_timeout(self.tmux_timeout_secs.map(Duration::from_secs));
        match self.tmux_socket {
            Some(ref name) => executor.with_socket_name(name),
            None => executor,
        }
    }
}
