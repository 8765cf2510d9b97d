//! Chat-completion client for OpenAI-compatible endpoints

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::BackendConfig;
use crate::conversation::WireMessage;

/// Optional sampling parameters for a completion call
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// A single stateless completion request; carries the full history
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    #[serde(flatten)]
    pub options: Option<GenerationOptions>,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<WireMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: None,
        }
    }

    pub fn with_options(mut self, options: Option<GenerationOptions>) -> Self {
        self.options = options;
        self
    }
}

/// Request/response completion service
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send the serialized conversation and return the reply text
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI chat-completions client
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Create a new client with the given request timeout
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Build a client from config, reading the key from the environment
    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .with_context(|| format!("Environment variable {} is not set", config.api_key_env))?;

        Ok(Self::new(
            config.base_url.clone(),
            api_key,
            Duration::from_secs(config.timeout_secs),
        ))
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ChatBackend for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Requesting completion"
        );

        let resp: ChatCompletionResponse = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .context("Failed to connect to completion backend")?
            .error_for_status()
            .context("Completion request failed")?
            .json()
            .await
            .context("Failed to parse completion response")?;

        let Some(choice) = resp.choices.into_iter().next() else {
            anyhow::bail!("Completion response contained no choices");
        };

        Ok(choice.message.content.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{Conversation, Message};

    #[test]
    fn test_request_omits_missing_options() {
        let conversation = Conversation::text(vec![Message::user("hi")]);
        let request = CompletionRequest::new("gpt-4-turbo", conversation.to_wire().unwrap());

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["model"], "gpt-4-turbo");
        assert_eq!(body["messages"][0]["content"], "hi");
        assert!(body.get("temperature").is_none());
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn test_request_flattens_options() {
        let options = GenerationOptions {
            max_tokens: Some(1024),
            top_p: Some(0.9),
            temperature: Some(0.1),
        };
        let request = CompletionRequest::new("gpt-4o", Vec::new())
            .with_options(Some(options));

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["max_tokens"], 1024);
        assert!((body["top_p"].as_f64().unwrap() - 0.9).abs() < 1e-6);
        assert!((body["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_completions_url_trims_slash() {
        let client = OpenAiClient::new("http://localhost:8080/v1/", "key", Duration::from_secs(1));
        assert_eq!(
            client.completions_url(),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn test_parse_completion_response() {
        let json = r##"{"choices":[{"message":{"role":"assistant","content":"# Think\nok"}}]}"##;
        let resp: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        let content = resp.choices[0].message.content.as_deref();
        assert_eq!(content, Some("# Think\nok"));
    }
}
