//! One-shot commands: `ls`, `run`, `start`, `kill`, `capture`.

use scriptmux_supervisor::Supervisor;
use scriptmux_tmux::PaneTarget;

pub async fn cmd_ls(supervisor: &Supervisor) {
    let sessions = supervisor.list_sessions().await;
    if sessions.is_empty() {
        println!("(no sessions)");
        return;
    }
    for session in sessions {
        println!("{}", session.full_info);
    }
}

/// Returns the process exit code.
pub async fn cmd_run(supervisor: &Supervisor, path: &str) -> i32 {
    let result = supervisor.execute(path).await;
    if result.success {
        println!("{}", result.message);
        0
    } else {
        eprintln!("{}", result.message);
        1
    }
}

pub async fn cmd_start(supervisor: &Supervisor, name: &str, command: &str) -> anyhow::Result<()> {
    supervisor.start_session(name, command).await?;
    println!("session {name} started");
    Ok(())
}

/// Returns the process exit code.
pub async fn cmd_kill(supervisor: &Supervisor, name: &str) -> i32 {
    if supervisor.kill_session(name).await {
        println!("session {name} killed");
        0
    } else {
        eprintln!("failed to kill session {name}");
        1
    }
}

pub async fn cmd_capture(supervisor: &Supervisor, target: &PaneTarget) {
    print!("{}", supervisor.snapshot(target).await);
}
