//! `scriptmux watch`: print a session's stream events until ctrl-c.

use std::io::Write;

use scriptmux_supervisor::Supervisor;
use scriptmux_tmux::PaneTarget;

/// Prints frames exactly as the HTTP stream would send them.
pub async fn cmd_watch(supervisor: &Supervisor, target: PaneTarget) -> anyhow::Result<()> {
    let mut rx = supervisor.stream(target);
    let mut stdout = std::io::stdout();

    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else { break };
                stdout.write_all(event.to_frame().as_bytes())?;
                stdout.flush()?;
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(())
}
