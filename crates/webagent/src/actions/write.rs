//! WRITE handler

use std::fs;
use tracing::{debug, warn};

use super::{outside_workspace, ActionKind, ActionOutcome};
use crate::workspace::Workspace;

pub(crate) const MISSING_CODE_BLOCK: &str =
    "You choose to write the file but did not provide the code block";

/// Write `code` to `target` inside the workspace, overwriting any existing file
pub fn write_file(
    workspace: &Workspace,
    target: &str,
    code: &str,
    create_parent_dirs: bool,
) -> ActionOutcome {
    let Some(path) = workspace.resolve(target) else {
        return outside_workspace(ActionKind::Write, target);
    };

    if create_parent_dirs {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!(target, error = %e, "Failed to create parent directories");
                return failed(target, e);
            }
        }
    }

    match fs::write(&path, code) {
        Ok(()) => {
            debug!(path = %path.display(), bytes = code.len(), "Wrote file");
            ActionOutcome::done(
                ActionKind::Write,
                target,
                format!("You have written the code to {}", target),
            )
        }
        Err(e) => {
            warn!(target, error = %e, "Failed to write file");
            failed(target, e)
        }
    }
}

fn failed(target: &str, error: std::io::Error) -> ActionOutcome {
    ActionOutcome::rejected(
        ActionKind::Write,
        target,
        format!("Failed to write {}: {}", target, error),
    )
}
