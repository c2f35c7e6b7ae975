//! CLI definition using clap derive.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use scriptmux_runtime::AppConfig;
use scriptmux_tmux::PaneTarget;

#[derive(Parser)]
#[command(name = "scriptmux", about = "Run scripts in detached tmux sessions and watch them live")]
pub struct Cli {
    /// TOML config file
    #[arg(long, short = 'c', global = true, env = "SCRIPTMUX_CONFIG")]
    pub config: Option<PathBuf>,

    /// tmux socket name (overrides the config file)
    #[arg(long, short = 'L', global = true)]
    pub tmux_socket: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeOpts),
    /// List live tmux sessions
    Ls,
    /// Run a script to completion and report the outcome
    Run {
        /// Script path, relative paths resolve against script_dir
        path: String,
    },
    /// Launch a command in a new detached session
    Start { name: String, command: String },
    /// Kill a session
    Kill { name: String },
    /// Print a session's current pane text
    Capture(PaneOpts),
    /// Follow a session's output, printing one event per change
    Watch(PaneOpts),
}

#[derive(clap::Args)]
pub struct ServeOpts {
    /// Listen address (overrides bind_addr)
    #[arg(long)]
    pub bind: Option<String>,

    /// Stream poll interval in milliseconds
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,
}

#[derive(clap::Args)]
pub struct PaneOpts {
    pub name: String,

    #[arg(long, default_value_t = 0)]
    pub window: u32,

    #[arg(long, default_value_t = 0)]
    pub pane: u32,
}

impl PaneOpts {
    pub fn target(&self) -> PaneTarget {
        PaneTarget::session(self.name.clone())
            .with_window(self.window)
            .with_pane(self.pane)
    }
}

impl Cli {
    /// Command-line flags win over file settings.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(ref socket) = self.tmux_socket {
            config.tmux_socket = Some(socket.clone());
        }
        if let Command::Serve(ref opts) = self.command {
            if let Some(ref bind) = opts.bind {
                config.bind_addr = bind.clone();
            }
            if let Some(ms) = opts.poll_interval_ms {
                config.poll_interval_ms = ms;
            }
        }
    }
}
