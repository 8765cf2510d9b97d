//! RUN handler: launch a workspace file as a server inside tmux

use std::time::Duration;
use tracing::{debug, info, warn};
use webagent_core::TmuxSession;

use super::{outside_workspace, ActionKind, ActionOutcome};
use crate::progress::Spinner;
use crate::workspace::Workspace;

/// Launches servers for one run
///
/// The session name is derived from the workspace so runs on the same host
/// do not stop each other's servers.
#[derive(Debug, Clone)]
pub struct ServerRunner {
    session: TmuxSession,
    python: String,
    settle: Duration,
    show_progress: bool,
}

impl ServerRunner {
    pub fn for_workspace(
        workspace: &Workspace,
        python: impl Into<String>,
        settle: Duration,
    ) -> Self {
        Self {
            session: TmuxSession::for_run(workspace.id()),
            python: python.into(),
            settle,
            show_progress: false,
        }
    }

    /// Show a spinner while waiting for the server to settle
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn session(&self) -> &TmuxSession {
        &self.session
    }

    /// Restart the run's server with `target` and report what it printed
    pub async fn run(&self, workspace: &Workspace, target: &str) -> ActionOutcome {
        let Some(path) = workspace.resolve(target) else {
            return outside_workspace(ActionKind::Run, target);
        };

        if which::which("tmux").is_err() {
            warn!(target, "tmux not found on PATH");
            return launch_failed(target, "tmux is not installed");
        }

        if self.session.exists().await {
            if let Err(e) = self.session.kill().await {
                warn!(
                    session = %self.session.name(),
                    error = %e,
                    "Failed to stop previous server"
                );
            }
        }

        let script = path.to_string_lossy();
        if let Err(e) = self
            .session
            .start(&self.python, &[&*script], workspace.path())
            .await
        {
            warn!(target, error = %e, "Failed to launch server");
            return launch_failed(target, &format!("{:#}", e));
        }
        info!(session = %self.session.name(), target, "Server launched");

        self.settle().await;

        let output = match self.session.capture().await {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    session = %self.session.name(),
                    error = %e,
                    "Failed to capture server output"
                );
                String::new()
            }
        };
        debug!(bytes = output.len(), "Captured server output");

        let observation = collapse_blank_lines(output.trim());
        let observation = if observation.is_empty() {
            format!("Running {} {} got no output.", self.python, target)
        } else {
            observation
        };

        ActionOutcome::done(ActionKind::Run, target, observation)
    }

    async fn settle(&self) {
        if !self.show_progress {
            tokio::time::sleep(self.settle).await;
            return;
        }

        let mut spinner = Spinner::new("Waiting for server...");
        spinner.start();
        tokio::time::sleep(self.settle).await;
        spinner.stop().await;
    }
}

/// Squeeze runs of blank lines, such as the padding tmux leaves above
/// `Pane is dead`, down to one
fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_blank = false;
    for line in text.lines() {
        let blank = line.trim().is_empty();
        if blank && previous_blank {
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(if blank { "" } else { line.trim_end() });
        previous_blank = blank;
    }
    out
}

fn launch_failed(target: &str, detail: &str) -> ActionOutcome {
    ActionOutcome::rejected(
        ActionKind::Run,
        target,
        format!("Failed to launch {}: {}", target, detail),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tools_available() -> bool {
        which::which("tmux").is_ok() && which::which("python3").is_ok()
    }

    fn workspace(parent: &TempDir, tag: &str) -> Workspace {
        Workspace::create_with_id(parent.path(), format!("{}{}", tag, std::process::id())).unwrap()
    }

    #[test]
    fn test_session_follows_workspace() {
        let parent = TempDir::new().unwrap();
        let ws = Workspace::create_with_id(parent.path(), "0123456789abcdef").unwrap();
        let runner = ServerRunner::for_workspace(&ws, "python3", Duration::from_secs(5));
        assert_eq!(runner.session().name(), "webagent-0123456789ab");
    }

    #[tokio::test]
    async fn test_escape_is_rejected_before_launch() {
        let parent = TempDir::new().unwrap();
        let ws = workspace(&parent, "esc");
        let runner = ServerRunner::for_workspace(&ws, "python3", Duration::from_millis(10));

        let outcome = runner.run(&ws, "../server.py").await;

        assert!(!outcome.actionable);
        assert_eq!(outcome.kind, ActionKind::Run);
        assert_eq!(
            outcome.observation,
            "Path ../server.py is outside the workspace."
        );
        assert!(!runner.session().exists().await);
    }

    #[tokio::test]
    async fn test_launch_failure_is_reported() {
        let parent = TempDir::new().unwrap();
        let ws = workspace(&parent, "bad");
        std::fs::write(ws.path().join("app.py"), "print('hi')\n").unwrap();
        // No program name may hold a NUL byte, so spawning tmux fails
        let runner = ServerRunner::for_workspace(&ws, "python3\0", Duration::from_millis(10));

        let outcome = runner.run(&ws, "app.py").await;

        assert!(!outcome.actionable);
        assert_eq!(outcome.kind, ActionKind::Run);
        assert_eq!(Some(outcome.target()), Some("app.py"));
        assert!(
            outcome.observation.starts_with("Failed to launch app.py: "),
            "unexpected observation: {}",
            outcome.observation
        );
        assert!(!runner.session().exists().await);
    }

    #[test]
    fn test_collapse_blank_lines() {
        let pane = "Traceback\nboom\n\n\n   \n\nPane is dead (status 1)";
        assert_eq!(
            collapse_blank_lines(pane),
            "Traceback\nboom\n\nPane is dead (status 1)"
        );
        assert_eq!(collapse_blank_lines("one\ntwo"), "one\ntwo");
        assert_eq!(collapse_blank_lines(""), "");
    }

    #[tokio::test]
    async fn test_run_captures_output() {
        if !tools_available() {
            return;
        }
        let parent = TempDir::new().unwrap();
        let ws = workspace(&parent, "out");
        std::fs::write(
            ws.path().join("app.py"),
            "import time\nprint('Running on http://127.0.0.1:5000', flush=True)\ntime.sleep(30)\n",
        )
        .unwrap();
        let runner = ServerRunner::for_workspace(&ws, "python3", Duration::from_millis(800));

        let outcome = runner.run(&ws, "app.py").await;

        assert!(outcome.actionable);
        let banner = "Running on http://127.0.0.1:5000";
        assert!(outcome.observation.contains(banner));
        assert!(runner.session().exists().await);

        // A second RUN replaces the first server
        let again = runner.run(&ws, "app.py").await;
        assert!(again.actionable);

        runner.session().kill().await.unwrap();
    }

    #[tokio::test]
    async fn test_silent_server_reports_no_output() {
        if !tools_available() {
            return;
        }
        let parent = TempDir::new().unwrap();
        let ws = workspace(&parent, "quiet");
        std::fs::write(ws.path().join("quiet.py"), "import time\ntime.sleep(30)\n").unwrap();
        let runner = ServerRunner::for_workspace(&ws, "python3", Duration::from_millis(500));

        let outcome = runner.run(&ws, "quiet.py").await;

        assert!(outcome.actionable);
        assert_eq!(
            outcome.observation,
            "Running python3 quiet.py got no output."
        );

        runner.session().kill().await.unwrap();
    }

    #[tokio::test]
    async fn test_crash_trace_is_kept_without_padding() {
        if !tools_available() {
            return;
        }
        let parent = TempDir::new().unwrap();
        let ws = workspace(&parent, "crash");
        std::fs::write(
            ws.path().join("crash.py"),
            "print('boom crash', flush=True)\nraise SystemExit(1)\n",
        )
        .unwrap();
        let runner = ServerRunner::for_workspace(&ws, "python3", Duration::from_millis(800));

        let outcome = runner.run(&ws, "crash.py").await;

        assert!(outcome.actionable);
        assert!(outcome.observation.starts_with("boom crash"));
        assert!(outcome.observation.contains("Pane is dead"));
        assert!(!outcome.observation.contains("\n\n\n"));

        runner.session().kill().await.unwrap();
    }
}
