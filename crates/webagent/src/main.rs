//! webagent: LLM web developer agent
//!
//! Sends an instruction to a chat model and carries out the file, run and
//! screenshot actions it asks for inside a fresh workspace.

mod actions;
mod agent;
mod progress;
mod prompts;
mod protocol;
mod workspace;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;
use webagent_core::{Config, OpenAiClient};

use actions::ChromeCapture;
use agent::{AgentLoop, AgentProfile, SimpleAgent};

const DEFAULT_INSTRUCTION: &str = "Please develop a webpage that displays hello world.";

#[derive(Debug, Parser)]
#[command(name = "webagent")]
#[command(about = "Build and serve a webpage with an LLM agent", version)]
struct Cli {
    /// Model to use for the conversation
    #[arg(long, default_value = "gpt-4-turbo")]
    model: String,

    /// Instruction given to the agent
    #[arg(long, default_value = DEFAULT_INSTRUCTION)]
    instruction: String,

    /// Agent to run
    #[arg(long, alias = "agent_type", value_enum, default_value_t)]
    agent_type: AgentType,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum AgentType {
    /// One answer, no actions
    #[default]
    Simple,
    /// Think, write, read and run
    React,
    /// React plus screenshots of the running page
    Reflect,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::load()?;
    let client = OpenAiClient::from_config(&config.backend)?;
    let options = config.generation.options();

    let responses = match cli.agent_type {
        AgentType::Simple => {
            SimpleAgent::new(client, &cli.model)
                .with_options(options)
                .run(&cli.instruction)
                .await?
        }
        AgentType::React | AgentType::Reflect => {
            let profile = if cli.agent_type == AgentType::React {
                AgentProfile::react()
            } else {
                AgentProfile::reflect()
            };
            let run = AgentLoop::new(client, ChromeCapture::new(), &cli.model, profile)
                .with_settings(config.agent.clone())
                .with_options(options)
                .run(&cli.instruction)
                .await?;
            tracing::info!(
                iterations = run.iterations,
                terminated = run.terminated,
                workspace = %run.workspace.display(),
                "Agent finished"
            );
            run.responses
        }
    };

    for response in responses {
        println!("{}", response);
    }

    Ok(())
}
