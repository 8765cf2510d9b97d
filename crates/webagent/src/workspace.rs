//! Per-run workspace directories

use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// A run-scoped directory that action file names resolve against
///
/// Never cleaned up by the agent; the directory outlives the run.
#[derive(Debug, Clone)]
pub struct Workspace {
    id: String,
    root: PathBuf,
}

impl Workspace {
    /// Create `<parent>/<digest>` where the digest hashes the current time
    pub fn create(parent: impl AsRef<Path>) -> Result<Self> {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .context("System clock is before the Unix epoch")?
            .as_nanos();
        let id = format!("{:x}", md5::compute(nanos.to_string()));

        Self::create_with_id(parent, id)
    }

    /// Create a workspace with a known identifier
    pub fn create_with_id(parent: impl AsRef<Path>, id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        let root = parent.as_ref().join(&id);
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create workspace {}", root.display()))?;
        // tmux resolves -c against its own server cwd, so keep the path absolute
        let root = root
            .canonicalize()
            .with_context(|| format!("Failed to resolve workspace {}", root.display()))?;

        Ok(Self { id, root })
    }

    /// Hex digest naming this run
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Resolve a file name from an action against the workspace
    ///
    /// Returns None for names that would leave the workspace.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let relative = Path::new(name.trim());
        if relative.as_os_str().is_empty() {
            return None;
        }

        let escapes = relative.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes {
            return None;
        }

        Some(self.root.join(relative))
    }
}
