//! Supervisor configuration, passed in at construction.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::lists::{ListSpec, default_lists};

/// Default polling cadence of output streams.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default directory relative script paths are resolved against.
pub const DEFAULT_SCRIPT_DIR: &str = "/scripts";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorConfig {
    pub script_dir: PathBuf,
    pub poll_interval: Duration,
    /// Deadline for inline script runs. `None` waits forever.
    pub exec_timeout: Option<Duration>,
    /// Emit capture failures as `error` events instead of output text.
    pub error_events: bool,
    pub lists: Vec<ListSpec>,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        let script_dir = PathBuf::from(DEFAULT_SCRIPT_DIR);
        Self {
            lists: default_lists(&script_dir),
            script_dir,
            poll_interval: DEFAULT_POLL_INTERVAL,
            exec_timeout: None,
            error_events: false,
        }
    }
}

impl SupervisorConfig {
    /// Absolute paths are kept; relative ones are joined onto `script_dir`.
    pub fn resolve_script(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.script_dir.join(path)
        }
    }

    pub fn list(&self, name: &str) -> Option<&ListSpec> {
        self.lists.iter().find(|l| l.name == name)
    }
}
