//! webagent-core: Shared library for the webagent coding loop
//!
//! Provides:
//! - Configuration loading (webagent.toml)
//! - Chat-completion client (OpenAI-compatible)
//! - Conversation container and wire formats
//! - Image encoding for multimodal messages
//! - tmux session management

pub mod config;
pub mod conversation;
pub mod imaging;
pub mod openai;
pub mod tmux;

pub use config::Config;
pub use conversation::{
    ContentPart, Conversation, ConversationFormat, ImageAttachment, ImageUrl, Message, Role,
    WireContent, WireMessage,
};
pub use openai::{ChatBackend, CompletionRequest, GenerationOptions, OpenAiClient};
pub use tmux::TmuxSession;
