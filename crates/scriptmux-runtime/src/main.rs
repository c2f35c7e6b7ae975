//! scriptmux: run scripts in detached tmux sessions and watch them live.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use scriptmux_runtime::{AppConfig, serve};
use scriptmux_supervisor::Supervisor;
use scriptmux_tmux::Tmux;

mod cli;
mod cmd_sessions;
mod cmd_watch;

/// How long open streams may hold the server up after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();
    init_tracing(matches!(args.command, cli::Command::Serve(_)));

    let mut config = AppConfig::load(args.config.as_deref())?;
    args.apply_overrides(&mut config);

    let supervisor = Supervisor::new(
        config.supervisor_config(),
        Arc::new(Tmux::new(config.executor())),
    );

    match args.command {
        cli::Command::Serve(_) => run_server(&config, supervisor).await?,
        cli::Command::Ls => cmd_sessions::cmd_ls(&supervisor).await,
        cli::Command::Run { path } => {
            let exit_code = cmd_sessions::cmd_run(&supervisor, &path).await;
            if exit_code != 0 {
                std::process::exit(exit_code);
            }
        }
        cli::Command::Start { name, command } => {
            cmd_sessions::cmd_start(&supervisor, &name, &command).await?;
        }
        cli::Command::Kill { name } => {
            let exit_code = cmd_sessions::cmd_kill(&supervisor, &name).await;
            if exit_code != 0 {
                std::process::exit(exit_code);
            }
        }
        cli::Command::Capture(opts) => {
            cmd_sessions::cmd_capture(&supervisor, &opts.target()).await;
        }
        cli::Command::Watch(opts) => cmd_watch::cmd_watch(&supervisor, opts.target()).await?,
    }

    Ok(())
}

/// Filter from `SCRIPTMUX_LOG`, then `RUST_LOG`. Logs go to stderr so
/// one-shot commands keep stdout clean.
fn init_tracing(server: bool) {
    let default = if server { "info" } else { "warn" };
    let filter = std::env::var("SCRIPTMUX_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| default.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
}

async fn run_server(config: &AppConfig, supervisor: Supervisor) -> anyhow::Result<()> {
    tracing::info!(
        script_dir = %config.script_dir.display(),
        poll_interval_ms = config.poll_interval_ms,
        "scriptmux starting"
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let signal = async move {
        shutdown_signal().await;
        let _ = stop_tx.send(());
    };

    tokio::select! {
        result = serve(listener, supervisor, signal) => result?,
        () = async {
            if stop_rx.await.is_ok() {
                tokio::time::sleep(SHUTDOWN_GRACE).await;
            } else {
                std::future::pending::<()>().await;
            }
        } => {
            tracing::info!("streams still open after grace period, closing them");
        }
    }

    tracing::info!("scriptmux stopped");
    Ok(())
}

/// Wait for ctrl-c or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => tracing::info!("received ctrl-c, shutting down"),
                    _ = sigterm.recv() => tracing::info!("received SIGTERM, shutting down"),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to register SIGTERM handler");
                ctrl_c.await.ok();
                tracing::info!("received ctrl-c, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        tracing::info!("received ctrl-c, shutting down");
    }
}
