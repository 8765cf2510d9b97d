//! Turn loop: request, parse, dispatch, observe

use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info, instrument};
use webagent_core::config::AgentSettings;
use webagent_core::{ChatBackend, Conversation, ConversationFormat, GenerationOptions, Message};

use crate::actions::{dispatch, ActionContext, ActionOutcome, PageCapture, ServerRunner};
use crate::protocol::{self, Directive, ProtocolViolation};
use crate::workspace::Workspace;

use super::request_reply;
use super::state::{AgentProfile, AgentRun, AgentState};

// ANSI colors
const BOLD_BLUE: &str = "\x1b[1;94m";
const MAGENTA: &str = "\x1b[95m";
const GREEN: &str = "\x1b[92m";
const GREY: &str = "\x1b[37m";
const YELLOW: &str = "\x1b[93m";
const RED: &str = "\x1b[91m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Drives one agent profile against a completion backend
pub struct AgentLoop<B: ChatBackend, C: PageCapture> {
    backend: B,
    capture: C,
    model: String,
    profile: AgentProfile,
    settings: AgentSettings,
    options: Option<GenerationOptions>,
}

impl<B: ChatBackend, C: PageCapture> AgentLoop<B, C> {
    pub fn new(
        backend: B,
        capture: C,
        model: impl Into<String>,
        profile: AgentProfile,
    ) -> Self {
        Self {
            backend,
            capture,
            model: model.into(),
            profile,
            settings: AgentSettings::default(),
            options: None,
        }
    }

    /// Workspace root, interpreter and settle delay
    pub fn with_settings(mut self, settings: AgentSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_options(mut self, options: Option<GenerationOptions>) -> Self {
        self.options = options;
        self
    }

    /// Run until the model terminates or the hop limit is reached
    #[instrument(
        skip(self, instruction),
        fields(agent = self.profile.name, model = %self.model)
    )]
    pub async fn run(&self, instruction: &str) -> Result<AgentRun> {
        let verbose = self.profile.verbose;
        if verbose {
            println!(
                "{}<{} agent>\n# Instruction: {}{}\n",
                BOLD_BLUE, self.profile.name, instruction, RESET
            );
        }

        let workspace = Workspace::create(&self.settings.workspace_root)?;
        info!(
            workspace = %workspace.path().display(),
            max_hop = self.profile.max_hop,
            "Starting agent loop"
        );

        let runner = ServerRunner::for_workspace(
            &workspace,
            self.settings.python.as_str(),
            Duration::from_secs(self.settings.settle_secs),
        )
        .with_progress(verbose);
        debug!(session = runner.session().name(), "Server session");
        let ctx = ActionContext {
            workspace: &workspace,
            runner: &runner,
            capture: &self.capture,
            create_parent_dirs: self.profile.create_parent_dirs,
        };
        let parse_options = self.profile.parse_options();

        let mut conversation = Conversation::new(
            self.profile.format,
            vec![
                Message::system(self.profile.system_prompt),
                Message::user(instruction),
            ],
        );
        let mut state = AgentState::new();

        while !state.finished && state.iteration < self.profile.max_hop {
            state.increment_iteration();
            debug!(
                iteration = state.iteration,
                messages = conversation.len(),
                "Starting iteration"
            );

            let reply = request_reply(
                &self.backend,
                &self.model,
                &conversation,
                self.options,
                verbose,
            )
            .await?;
            conversation.add_message(Message::assistant(reply.as_str()));

            let directive = protocol::parse(&reply, &parse_options);
            if verbose {
                print_directive(&directive);
            }

            let outcome = dispatch(&directive, &ctx).await?;
            debug!(
                kind = %outcome.kind,
                actionable = outcome.actionable,
                target = outcome.target(),
                "Handled directive"
            );
            if verbose {
                print_outcome(&outcome, &reply);
            }

            conversation.add_message(self.observation(outcome));

            if protocol::is_termination(&reply) {
                info!(iteration = state.iteration, "Agent terminated");
                state.mark_finished(reply);
            } else {
                state.record_response(reply);
            }
        }

        if !state.finished {
            info!(iterations = state.iteration, "Hop limit reached");
        }

        Ok(AgentRun::from_state(state, workspace.path().to_path_buf()))
    }

    fn observation(&self, outcome: ActionOutcome) -> Message {
        let message = Message::user(self.profile.observation_message(&outcome.observation));
        match (self.profile.format, outcome.image) {
            (ConversationFormat::Multimodal, Some(image)) => message.with_image(image),
            _ => message,
        }
    }
}

fn print_directive(directive: &Directive) {
    match directive {
        Directive::Think { reasoning } => {
            println!("{}# Think : \n{}{}\n", MAGENTA, reasoning, RESET);
        }
        Directive::Write { target, code } => {
            println!("{}# Action WRITE({}){}", GREEN, target, RESET);
            println!("{}\n{}\n{}", GREY, code, RESET);
        }
        Directive::Malformed(ProtocolViolation::MissingCodeBlock { target }) => {
            println!("{}# Action WRITE({}){}", GREEN, target, RESET);
        }
        Directive::Read { target } => println!("{}# Action READ({}){}", GREEN, target, RESET),
        Directive::Run { target } => println!("{}# Action RUN({}){}", GREEN, target, RESET),
        Directive::See { url } => println!("{}# See {}{}", GREEN, url, RESET),
        Directive::None => {}
    }
}

fn print_outcome(outcome: &ActionOutcome, reply: &str) {
    println!("{}# Observation: {}{}\n", DIM, outcome.observation, RESET);
    if outcome.observation.is_empty() {
        println!("{}Agent : {}{}", RED, reply, RESET);
    } else if !outcome.actionable {
        println!("{}Agent : {}{}", YELLOW, reply, RESET);
    }
}
