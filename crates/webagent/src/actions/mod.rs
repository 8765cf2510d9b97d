//! Action handlers
//!
//! Turn a parsed [`Directive`] into an observation for the next turn.
//! Protocol mistakes, missing files and failed writes or launches are
//! reported back to the model as not-actionable outcomes. Only screenshot
//! failures are returned as errors.

mod read;
mod run;
mod see;
mod write;

pub use read::read_file;
pub use run::ServerRunner;
pub use see::{ChromeCapture, PageCapture};
pub use write::write_file;

use anyhow::Result;
use tracing::debug;
use webagent_core::ImageAttachment;

use crate::protocol::{Directive, ProtocolViolation};
use crate::workspace::Workspace;

/// Fixed acknowledgement for a think turn
pub const THINK_OBSERVATION: &str = "Ok.";

/// Which handler produced an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Think,
    Write,
    Read,
    Run,
    See,
    None,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKind::Think => write!(f, "THINK"),
            ActionKind::Write => write!(f, "WRITE"),
            ActionKind::Read => write!(f, "READ"),
            ActionKind::Run => write!(f, "RUN"),
            ActionKind::See => write!(f, "SEE"),
            ActionKind::None => write!(f, "NONE"),
        }
    }
}

/// Result of handling one reply
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    /// Whether the directive was carried out
    pub actionable: bool,
    pub kind: ActionKind,
    /// File name or URL the directive named
    pub target: Option<String>,
    /// Text fed back to the model
    pub observation: String,
    /// Screenshot attached to the observation
    pub image: Option<ImageAttachment>,
}

impl ActionOutcome {
    /// A directive that was carried out
    pub fn done(
        kind: ActionKind,
        target: impl Into<String>,
        observation: impl Into<String>,
    ) -> Self {
        Self {
            actionable: true,
            kind,
            target: Some(target.into()),
            observation: observation.into(),
            image: None,
        }
    }

    /// A directive that could not be carried out
    pub fn rejected(
        kind: ActionKind,
        target: impl Into<String>,
        observation: impl Into<String>,
    ) -> Self {
        Self {
            actionable: false,
            kind,
            target: Some(target.into()),
            observation: observation.into(),
            image: None,
        }
    }

    pub fn think() -> Self {
        Self {
            actionable: true,
            kind: ActionKind::Think,
            target: None,
            observation: THINK_OBSERVATION.to_string(),
            image: None,
        }
    }

    /// Nothing recognized in the reply
    pub fn none() -> Self {
        Self {
            actionable: false,
            kind: ActionKind::None,
            target: None,
            observation: String::new(),
            image: None,
        }
    }

    pub fn with_image(mut self, image: ImageAttachment) -> Self {
        self.image = Some(image);
        self
    }

    /// Target name, if the directive had one
    pub fn target(&self) -> &str {
        self.target.as_deref().unwrap_or("")
    }
}

/// Observation for a target that resolves outside the workspace
pub(crate) fn outside_workspace(kind: ActionKind, target: &str) -> ActionOutcome {
    ActionOutcome::rejected(
        kind,
        target,
        format!("Path {} is outside the workspace.", target),
    )
}

/// Everything the handlers need for one run
pub struct ActionContext<'a> {
    pub workspace: &'a Workspace,
    pub runner: &'a ServerRunner,
    pub capture: &'a dyn PageCapture,
    /// Create missing parent directories on WRITE
    pub create_parent_dirs: bool,
}

/// Carry out a directive
pub async fn dispatch(directive: &Directive, ctx: &ActionContext<'_>) -> Result<ActionOutcome> {
    debug!(directive = directive.label(), "Dispatching directive");

    let outcome = match directive {
        Directive::Think { .. } => ActionOutcome::think(),
        Directive::Write { target, code } => {
            write_file(ctx.workspace, target, code, ctx.create_parent_dirs)
        }
        Directive::Malformed(ProtocolViolation::MissingCodeBlock { target }) => {
            ActionOutcome::rejected(ActionKind::Write, target, write::MISSING_CODE_BLOCK)
        }
        Directive::Read { target } => read_file(ctx.workspace, target),
        Directive::Run { target } => ctx.runner.run(ctx.workspace, target).await,
        Directive::See { url } => see::see(ctx.capture, url).await?,
        Directive::None => ActionOutcome::none(),
    };

    Ok(outcome)
}
