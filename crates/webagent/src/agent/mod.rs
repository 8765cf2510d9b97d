//! Agents that drive a completion backend
//!
//! `simple` answers once. `react` and `reflect` share one turn loop and
//! differ only by their [`AgentProfile`].

mod agent_loop;
mod simple;
mod state;

pub use agent_loop::AgentLoop;
pub use simple::SimpleAgent;
pub use state::AgentProfile;

use anyhow::{Context, Result};
use tracing::debug;
use webagent_core::{ChatBackend, CompletionRequest, Conversation, GenerationOptions};

use crate::progress::Spinner;

/// Send the whole conversation and wait for the reply
pub(crate) async fn request_reply<B: ChatBackend>(
    backend: &B,
    model: &str,
    conversation: &Conversation,
    options: Option<GenerationOptions>,
    show_progress: bool,
) -> Result<String> {
    let messages = conversation.to_wire()?;
    debug!(model, messages = messages.len(), "Sending conversation");
    let request = CompletionRequest::new(model, messages).with_options(options);

    let mut spinner = show_progress.then(|| Spinner::new("Thinking..."));
    if let Some(s) = spinner.as_mut() {
        s.start();
    }

    let reply = backend.complete(&request).await;

    if let Some(s) = spinner.as_mut() {
        s.stop().await;
    }

    reply.context("Completion request failed")
}
