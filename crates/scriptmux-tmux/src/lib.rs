//! scriptmux-tmux: tmux backend IO boundary.
//! Provides subprocess execution, session listing/kill/start and pane capture.
//! Holds no session state of its own; tmux is re-queried on every call.

pub mod capture;
pub mod error;
pub mod executor;
pub mod multiplexer;
pub mod session;

pub use capture::{CAPTURE_ERROR_PREFIX, PaneTarget, capture_pane, snapshot_text};
pub use error::TmuxError;
pub use executor::{TmuxCommandRunner, TmuxExecutor};
pub use multiplexer::{Multiplexer, Tmux};
pub use session::{Session, kill_session, list_sessions, parse_list_sessions_output, start_session};
