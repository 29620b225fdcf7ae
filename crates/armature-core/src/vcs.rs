//! Best-effort VCS revision lookup.
//!
//! Checkpoints record the current commit hash when one can be obtained
//! quickly. Any failure — no git binary, not a repository, timeout — degrades
//! to `None`; a checkpoint is never blocked on the VCS.

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Return the current `HEAD` revision of the repository at `root`, or None.
pub fn current_revision(root: &Path, timeout: Duration) -> Option<String> {
    if which::which("git").is_err() {
        debug!("git not found on PATH, skipping revision capture");
        return None;
    }

    let mut child = match Command::new("git")
        .args(["rev-parse", "HEAD"])
        .current_dir(root)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            debug!("failed to spawn git: {e}");
            return None;
        }
    };

    let started = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                if !status.success() {
                    debug!("git rev-parse exited with {status}");
                    return None;
                }
                let mut out = String::new();
                if let Some(mut stdout) = child.stdout.take() {
                    if stdout.read_to_string(&mut out).is_err() {
                        return None;
                    }
                }
                let rev = out.trim();
                return if rev.is_empty() {
                    None
                } else {
                    Some(rev.to_string())
                };
            }
            Ok(None) => {
                if started.elapsed() >= timeout {
                    debug!("git rev-parse timed out after {timeout:?}");
                    let _ = child.kill();
                    let _ = child.wait();
                    return None;
                }
                std::thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                debug!("failed to wait on git: {e}");
                let _ = child.kill();
                let _ = child.wait();
                return None;
            }
        }
    }
}
