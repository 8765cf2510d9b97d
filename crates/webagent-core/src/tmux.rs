//! tmux session management for long-running server processes
//!
//! Each agent run owns one named session. Dropping the handle does not kill
//! the session: the server must stay reachable after the run ends.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

const SESSION_PREFIX: &str = "webagent";

/// Silent command the pane holds until the real program is spawned
const PLACEHOLDER: &str = "cat";

/// Handle to a named, detached tmux session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TmuxSession {
    name: String,
}

impl TmuxSession {
    /// Create a handle for an explicit session name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Session name derived from a run identifier
    pub fn for_run(run_id: &str) -> Self {
        let short: String = run_id
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .take(12)
            .collect();
        Self::new(format!("{}-{}", SESSION_PREFIX, short))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if the session is live
    pub async fn exists(&self) -> bool {
        Command::new("tmux")
            .args(["has-session", "-t", self.name.as_str()])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Kill the session
    pub async fn kill(&self) -> Result<()> {
        debug!(session = %self.name, "Killing tmux session");
        let status = Command::new("tmux")
            .args(["kill-session", "-t", self.name.as_str()])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .context("Failed to run tmux")?;

        if !status.success() {
            anyhow::bail!("tmux kill-session exited with {}", status);
        }
        Ok(())
    }

    /// Start a fresh detached session running `program args...` in `cwd`
    ///
    /// The pane is kept after the program exits so a crash trace can
    /// still be captured.
    pub async fn start(&self, program: &str, args: &[&str], cwd: &Path) -> Result<()> {
        debug!(session = %self.name, program, ?args, cwd = %cwd.display(), "Starting tmux session");

        // remain-on-exit must be set before the program runs, so the pane
        // starts on a silent placeholder and is respawned with the program.
        let cwd = cwd.to_string_lossy();
        let name = self.name.as_str();
        let mut cmd = Command::new("tmux");
        cmd.args(["new-session", "-d", "-s", name, "-c", &*cwd, PLACEHOLDER])
            .args([";", "set-option", "-t", name, "remain-on-exit", "on"])
            .args([";", "respawn-pane", "-k", "-t", name])
            .args(["-c", &*cwd, program])
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let output = cmd.output().await.context("Failed to run tmux")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            anyhow::bail!("tmux new-session failed ({}): {}", output.status, stderr);
        }
        Ok(())
    }

    /// Capture the whole pane history as text
    pub async fn capture(&self) -> Result<String> {
        let output = Command::new("tmux")
            .args(["capture-pane", "-p", "-S", "-", "-E", "-"])
            .args(["-t", self.name.as_str()])
            .stderr(Stdio::null())
            .output()
            .await
            .context("Failed to run tmux")?;

        if !output.status.success() {
            anyhow::bail!("tmux capture-pane exited with {}", output.status);
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
