//! Conversation container and the wire formats sent to the completion backend
//!
//! A conversation is append-only; every completion call receives the whole
//! history in chronological order.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::imaging::encode_image;

/// Message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// An image carried by a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageAttachment {
    /// Image file on disk
    File(PathBuf),
    /// PNG bytes held in memory (screenshots)
    Png(Vec<u8>),
}

/// A single role-tagged message
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub text: Option<String>,
    pub images: Vec<ImageAttachment>,
}

impl Message {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: Some(text.into()),
            images: Vec::new(),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, text)
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    pub fn with_image(mut self, image: ImageAttachment) -> Self {
        self.images.push(image);
        self
    }

    fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Multi-part content: text block first, then one block per image
    fn content_parts(&self) -> Result<Vec<ContentPart>> {
        let mut parts = Vec::with_capacity(1 + self.images.len());

        if let Some(text) = self.text.as_deref().filter(|t| !t.is_empty()) {
            parts.push(ContentPart::Text {
                text: text.to_string(),
            });
        }

        for image in &self.images {
            let encoded = encode_image(image)?;
            parts.push(ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: format!("data:image/jpeg;base64,{}", encoded),
                },
            });
        }

        Ok(parts)
    }
}

/// Serialization shape a conversation produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationFormat {
    /// `{role, content: "text"}`
    Text,
    /// `{role, content: [text and image_url blocks]}`
    Multimodal,
}

/// Ordered, append-only message log
#[derive(Debug, Clone)]
pub struct Conversation {
    format: ConversationFormat,
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new(format: ConversationFormat, messages: Vec<Message>) -> Self {
        Self { format, messages }
    }

    /// Text-only conversation
    pub fn text(messages: Vec<Message>) -> Self {
        Self::new(ConversationFormat::Text, messages)
    }

    /// Image-capable conversation
    pub fn multimodal(messages: Vec<Message>) -> Self {
        Self::new(ConversationFormat::Multimodal, messages)
    }

    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn format(&self) -> ConversationFormat {
        self.format
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Serialize for the completion backend
    ///
    /// Fails only when an attached image cannot be encoded.
    pub fn to_wire(&self) -> Result<Vec<WireMessage>> {
        self.messages
            .iter()
            .map(|message| {
                let content = match self.format {
                    ConversationFormat::Text => {
                        WireContent::Text(message.text_or_empty().to_string())
                    }
                    ConversationFormat::Multimodal => WireContent::Parts(message.content_parts()?),
                };
                Ok(WireMessage {
                    role: message.role,
                    content,
                })
            })
            .collect()
    }

    /// Render as a single Llama-2 chat prompt string
    pub fn to_llama_prompt(&self) -> String {
        let mut prompt = String::new();
        for message in &self.messages {
            match message.role {
                Role::System => {
                    prompt.push_str(&format!(
                        "<s>[INST] <<SYS>>\n{}\n<</SYS>>\n\n",
                        message.text_or_empty()
                    ));
                }
                _ => prompt.push_str(&format!("{} [/INST]\n", message.text_or_empty())),
            }
        }
        prompt
    }
}

/// Message as sent on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: Role,
    pub content: WireContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_messages() -> Vec<Message> {
        vec![
            Message::system("You are helpful robot."),
            Message::user("Hello, how are you?"),
            Message::assistant("I'm a bot, I'm doing great!"),
            Message::user("What can you do?"),
            Message::assistant("I can process data and respond to queries!"),
        ]
    }

    #[test]
    fn test_text_wire_format() {
        let conv = Conversation::text(sample_messages());
        let json = serde_json::to_value(conv.to_wire().unwrap()).unwrap();

        assert_eq!(json[0]["role"], "system");
        assert_eq!(json[0]["content"], "You are helpful robot.");
        assert_eq!(json[2]["role"], "assistant");
    }

    #[test]
    fn test_wire_round_trip_preserves_order_and_roles() {
        let conv = Conversation::text(sample_messages());
        let wire = conv.to_wire().unwrap();

        let encoded = serde_json::to_string(&wire).unwrap();
        let decoded: Vec<WireMessage> = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded, wire);
        let roles: Vec<Role> = decoded.iter().map(|m| m.role).collect();
        let expected: Vec<Role> = conv.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, expected);
    }

    #[test]
    fn test_multimodal_round_trip_with_image() {
        let conv = Conversation::multimodal(vec![
            Message::system("You have vision capability."),
            Message::user("Describe the pic.").with_image(ImageAttachment::Png(vec![1, 2, 3])),
        ]);
        let wire = conv.to_wire().unwrap();

        let json = serde_json::to_value(&wire).unwrap();
        assert_eq!(json[1]["content"][0]["type"], "text");
        assert_eq!(json[1]["content"][1]["type"], "image_url");
        assert_eq!(
            json[1]["content"][1]["image_url"]["url"],
            "data:image/jpeg;base64,AQID"
        );

        let decoded: Vec<WireMessage> = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, wire);
    }

    #[test]
    fn test_multimodal_skips_empty_text() {
        let conv = Conversation::multimodal(vec![Message::user("")]);
        let wire = conv.to_wire().unwrap();
        assert_eq!(wire[0].content, WireContent::Parts(Vec::new()));
    }

    #[test]
    fn test_missing_image_file_fails_encoding() {
        let missing = ImageAttachment::File(PathBuf::from("/nonexistent/shot.png"));
        let conv = Conversation::multimodal(vec![Message::user("look").with_image(missing)]);
        assert!(conv.to_wire().is_err());
    }

    #[test]
    fn test_add_message_appends() {
        let mut conv = Conversation::text(Vec::new());
        assert!(conv.is_empty());
        conv.add_message(Message::user("first"));
        conv.add_message(Message::assistant("second"));
        assert_eq!(conv.len(), 2);
        assert_eq!(conv.messages()[1].text.as_deref(), Some("second"));
    }

    #[test]
    fn test_llama_prompt() {
        let conv = Conversation::text(vec![
            Message::system("You are helpful robot."),
            Message::user("Hello"),
        ]);
        assert_eq!(
            conv.to_llama_prompt(),
            "<s>[INST] <<SYS>>\nYou are helpful robot.\n<</SYS>>\n\nHello [/INST]\n"
        );
    }
}
