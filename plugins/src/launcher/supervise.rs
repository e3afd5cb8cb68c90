use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use tlcrun_core::api::{normalize_exit, ProcessControl, ProcessExit};

use super::exit_codes::describe_tlc_exit;

const STDERR_DRAIN: Duration = Duration::from_millis(500);

/// Sends termination requests to the supervisor that owns the child.
pub(crate) struct ChildControl {
    kill_tx: mpsc::UnboundedSender<()>,
}

impl ProcessControl for ChildControl {
    fn terminate(&self) -> anyhow::Result<()> {
        self.kill_tx
            .send(())
            .map_err(|_| anyhow::anyhow!("process has already exited"))
    }
}

/// Takes ownership of `child`; the returned control and receiver are the only
/// ways to reach it afterwards.
pub(crate) fn supervise(
    child: Child,
    stderr: Option<ChildStderr>,
    tool: String,
) -> (ChildControl, oneshot::Receiver<ProcessExit>) {
    let (kill_tx, kill_rx) = mpsc::unbounded_channel();
    let (exit_tx, exit_rx) = oneshot::channel();

    let stderr_task = stderr.map(|s| pump_stderr(s, tool.clone()));
    tokio::spawn(wait_or_kill(child, kill_rx, exit_tx, stderr_task, tool));

    (ChildControl { kill_tx }, exit_rx)
}

async fn wait_or_kill(
    mut child: Child,
    mut kill_rx: mpsc::UnboundedReceiver<()>,
    exit_tx: oneshot::Sender<ProcessExit>,
    stderr_task: Option<JoinHandle<()>>,
    tool: String,
) {
    let mut terminated = false;
    let mut controls_alive = true;

    let status = loop {
        tokio::select! {
            res = child.wait() => break res,
            req = kill_rx.recv(), if controls_alive => match req {
                Some(()) if !terminated => {
                    terminated = true;
                    tracing::info!(target: "tlcrun.launcher", tool = %tool, pid = ?child.id(), "killing process");
                    if let Err(e) = child.start_kill() {
                        tracing::warn!(target: "tlcrun.launcher", tool = %tool, error = %e, "kill failed");
                    }
                }
                Some(()) => {}
                None => controls_alive = false,
            },
        }
    };

    let code = match status {
        Ok(status) => Some(normalize_exit(status)),
        Err(e) => {
            tracing::error!(target: "tlcrun.launcher", tool = %tool, error = %e, "waiting for process failed");
            None
        }
    };

    if let Some(task) = stderr_task {
        // Grandchildren may keep stderr open after the child is gone.
        let _ = tokio::time::timeout(STDERR_DRAIN, task).await;
    }

    match code {
        Some(0) => {
            tracing::debug!(target: "tlcrun.launcher", tool = %tool, "process exited cleanly")
        }
        Some(c) if !terminated => tracing::info!(
            target: "tlcrun.launcher",
            tool = %tool,
            code = c,
            meaning = describe_tlc_exit(c).unwrap_or("unknown"),
            "process exited with non-zero status"
        ),
        _ => {}
    }

    let _ = exit_tx.send(ProcessExit { code, terminated });
}

fn pump_stderr(stderr: ChildStderr, tool: String) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if !line.trim().is_empty() {
                        tracing::warn!(target: "tlcrun.launcher.stderr", tool = %tool, "{}", line);
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::debug!(target: "tlcrun.launcher.stderr", tool = %tool, error = %e, "stderr read stopped");
                    break;
                }
            }
        }
    })
}
