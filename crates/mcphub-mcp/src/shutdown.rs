//! Graceful shutdown for server processes with SIGTERM → SIGKILL escalation.

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Child;
use tokio::time::timeout;

#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

/// Shut down a child process, escalating to a forced kill.
///
/// # Strategy
/// 1. Ask the process to exit (SIGTERM on Unix) and wait up to `grace`
/// 2. If still running, force kill and wait up to `kill_wait` for reaping
///
/// On Windows step 1 is skipped; there is no SIGTERM equivalent.
///
/// # Returns
/// - `Ok(Some(status))` once the process has been reaped
/// - `Ok(None)` if it was still not reaped after `kill_wait`
pub async fn shutdown_child(
    child: &mut Child,
    grace: Duration,
    kill_wait: Duration,
) -> io::Result<Option<ExitStatus>> {
    if let Some(status) = child.try_wait()? {
        return Ok(Some(status));
    }

    #[cfg(unix)]
    {
        if request_exit(child)? {
            if let Ok(result) = timeout(grace, child.wait()).await {
                return result.map(Some);
            }
            tracing::debug!(pid = ?child.id(), "process ignored SIGTERM, killing");
        } else {
            // Already gone; reap it
            return timeout(kill_wait, child.wait())
                .await
                .map_or(Ok(None), |result| result.map(Some));
        }
    }

    #[cfg(not(unix))]
    let _ = grace;

    // start_kill also succeeds for an already-exited process
    child.start_kill()?;

    timeout(kill_wait, child.wait())
        .await
        .map_or(Ok(None), |result| result.map(Some))
}

/// Send SIGTERM. Returns false if the process no longer exists.
#[cfg(unix)]
fn request_exit(child: &Child) -> io::Result<bool> {
    let Some(pid) = child.id() else {
        return Ok(false);
    };
    let pid = i32::try_from(pid).map_err(io::Error::other)?;

    match signal::kill(Pid::from_raw(pid), Signal::SIGTERM) {
        Ok(()) => Ok(true),
        Err(nix::errno::Errno::ESRCH) => Ok(false),
        Err(e) => Err(io::Error::other(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::process::Command;
    use tokio::time::sleep;

    #[tokio::test]
    #[cfg(unix)]
    async fn shutdown_responds_to_sigterm() {
        let mut child = Command::new("sleep")
            .arg("30")
            .spawn()
            .expect("failed to spawn sleep");

        let status = shutdown_child(
            &mut child,
            Duration::from_millis(1500),
            Duration::from_millis(500),
        )
        .await
        .unwrap();
        assert!(status.is_some());
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn shutdown_escalates_when_sigterm_ignored() {
        let mut child = Command::new("sh")
            .args(["-c", "trap '' TERM; sleep 30"])
            .spawn()
            .expect("failed to spawn sh");
        // Let the shell install its trap
        sleep(Duration::from_millis(200)).await;

        let status = shutdown_child(
            &mut child,
            Duration::from_millis(200),
            Duration::from_millis(2000),
        )
        .await
        .unwrap();
        assert!(status.is_some());
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn shutdown_handles_already_exited() {
        let mut child = Command::new("true").spawn().expect("failed to spawn true");

        sleep(Duration::from_millis(100)).await;

        let result = shutdown_child(
            &mut child,
            Duration::from_millis(100),
            Duration::from_millis(500),
        )
        .await;
        assert!(result.unwrap().is_some());
    }
}
