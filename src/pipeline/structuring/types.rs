use serde::{Deserialize, Serialize};

use super::StructuringError;

/// Role of a chat message sent to the reasoning service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// One completion request: model, ordered messages, sampling and output mode.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    /// Ask the service to constrain output to a JSON object.
    pub json_mode: bool,
}

/// Reasoning service client abstraction (allows mocking)
pub trait LlmClient {
    /// Send the request and return the raw text payload.
    fn complete(&self, request: &CompletionRequest) -> Result<String, StructuringError>;
}
