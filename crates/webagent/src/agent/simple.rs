//! Single-shot agent

use anyhow::Result;
use tracing::info;
use webagent_core::{ChatBackend, Conversation, GenerationOptions, Message};

use super::request_reply;
use crate::prompts;

/// Asks once and returns the answer; no workspace, no actions
pub struct SimpleAgent<B: ChatBackend> {
    backend: B,
    model: String,
    options: Option<GenerationOptions>,
    verbose: bool,
}

impl<B: ChatBackend> SimpleAgent<B> {
    pub fn new(backend: B, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
            options: None,
            verbose: true,
        }
    }

    pub fn with_options(mut self, options: Option<GenerationOptions>) -> Self {
        self.options = options;
        self
    }

    #[cfg(test)]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub async fn run(&self, instruction: &str) -> Result<Vec<String>> {
        info!(model = %self.model, "Running simple agent");
        let conversation = Conversation::text(vec![
            Message::system(prompts::SIMPLE),
            Message::user(instruction),
        ]);

        let reply = request_reply(
            &self.backend,
            &self.model,
            &conversation,
            self.options,
            self.verbose,
        )
        .await?;

        Ok(vec![reply])
    }
}
