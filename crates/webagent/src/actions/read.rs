//! READ handler

use tracing::warn;

use super::{outside_workspace, ActionKind, ActionOutcome};
use crate::workspace::Workspace;

/// Read `target` from the workspace
pub fn read_file(workspace: &Workspace, target: &str) -> ActionOutcome {
    let Some(path) = workspace.resolve(target) else {
        return outside_workspace(ActionKind::Read, target);
    };

    if !path.exists() {
        return ActionOutcome::rejected(
            ActionKind::Read,
            target,
            format!("File {} does not exist.", target),
        );
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => ActionOutcome::done(
            ActionKind::Read,
            target,
            format!("Content of the file {} : \n{}", target, content),
        ),
        Err(e) => {
            warn!(target, error = %e, "Failed to read file");
            ActionOutcome::rejected(
                ActionKind::Read,
                target,
                format!("Failed to read {}: {}", target, e),
            )
        }
    }
}
