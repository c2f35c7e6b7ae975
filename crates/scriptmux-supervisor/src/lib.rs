//! scriptmux-supervisor: the process session supervisor.
//!
//! Runs scripts inline, fronts the tmux session registry, and turns pane
//! snapshots into change-only event streams. The tmux side lives behind
//! [`scriptmux_tmux::Multiplexer`] so tests can swap it out.

pub mod config;
pub mod error;
pub mod lists;
pub mod runner;
pub mod stream;
pub mod supervisor;

pub use config::SupervisorConfig;
pub use error::SupervisorError;
pub use lists::ListSpec;
pub use runner::{ExecutionResult, ProcessRunner};
pub use stream::{
    ChangeDetector, StreamEvent, StreamOptions, escape_newlines, run_output_stream,
    spawn_output_stream,
};
pub use supervisor::Supervisor;
