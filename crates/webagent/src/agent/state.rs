//! Agent profiles and run state

use std::path::PathBuf;
use webagent_core::ConversationFormat;

use crate::prompts;
use crate::protocol::{CodeHints, ParseOptions};

/// Capabilities and limits of an agent variant
#[derive(Debug, Clone)]
pub struct AgentProfile {
    /// Registry key
    pub name: &'static str,
    /// Maximum turns before the run stops
    pub max_hop: usize,
    pub system_prompt: &'static str,
    /// Whether `# See(url)` is understood
    pub allow_see: bool,
    pub format: ConversationFormat,
    /// WRITE creates missing parent directories
    pub create_parent_dirs: bool,
    pub code_hints: CodeHints,
    /// Prepended to every observation message
    pub observation_prefix: &'static str,
    /// Print the colored transcript
    pub verbose: bool,
}

impl AgentProfile {
    /// Think/act loop over text messages
    pub fn react() -> Self {
        Self {
            name: "react",
            max_hop: 10,
            system_prompt: prompts::REACT,
            allow_see: false,
            format: ConversationFormat::Text,
            create_parent_dirs: false,
            code_hints: CodeHints::Base,
            observation_prefix: "",
            verbose: true,
        }
    }

    /// React plus screenshots fed back as images
    pub fn reflect() -> Self {
        Self {
            name: "reflect",
            max_hop: 15,
            system_prompt: prompts::REFLECT,
            allow_see: true,
            format: ConversationFormat::Multimodal,
            create_parent_dirs: true,
            code_hints: CodeHints::Extended,
            observation_prefix: "# Observation : ",
            verbose: true,
        }
    }

    #[cfg(test)]
    pub fn with_max_hop(mut self, max_hop: usize) -> Self {
        self.max_hop = max_hop;
        self
    }

    #[cfg(test)]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            allow_see: self.allow_see,
            code_hints: self.code_hints,
        }
    }

    /// Text of the user message carrying an observation
    pub fn observation_message(&self, observation: &str) -> String {
        format!("{}{}", self.observation_prefix, observation)
    }
}

/// Loop bookkeeping
#[derive(Debug, Default)]
pub struct AgentState {
    pub iteration: usize,
    /// Set when the model emitted the termination marker
    pub finished: bool,
    pub last_response: Option<String>,
}

impl AgentState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_iteration(&mut self) {
        self.iteration += 1;
    }

    pub fn record_response(&mut self, response: String) {
        self.last_response = Some(response);
    }

    pub fn mark_finished(&mut self, response: String) {
        self.finished = true;
        self.last_response = Some(response);
    }
}

/// What a finished run hands back
#[derive(Debug, Clone)]
pub struct AgentRun {
    /// The final reply, or nothing if no turn ran
    pub responses: Vec<String>,
    pub iterations: usize,
    /// Stopped on the termination marker rather than the hop limit
    pub terminated: bool,
    pub workspace: PathBuf,
}

impl AgentRun {
    pub(crate) fn from_state(state: AgentState, workspace: PathBuf) -> Self {
        Self {
            responses: state.last_response.into_iter().collect(),
            iterations: state.iteration,
            terminated: state.finished,
            workspace,
        }
    }
}
