//! scriptmux runtime: configuration loading and the HTTP surface.
//! The `scriptmux` binary in `main.rs` wires these to the CLI.

pub mod config;
pub mod server;

pub use config::AppConfig;
pub use server::{build_router, serve};
