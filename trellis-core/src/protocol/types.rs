//! Core protocol types for chat interactions
//!
//! These are the typed views callers work with. Provider wire formats live
//! next to each adapter and are converted into these types.

use serde::{Deserialize, Serialize};

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions that guide the model's behavior
    System,
    /// User input message
    User,
    /// Assistant (model) response
    Assistant,
}

/// A single chat message.
///
/// Messages are immutable once built; fields are only reachable through
/// accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    content: String,
}

/// Ordered conversation history
pub type Messages = Vec<Message>;

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Token usage information
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCounts {
    /// Tokens in the prompt
    pub prompt_tokens: u32,

    /// Tokens in the completion
    pub completion_tokens: u32,

    /// Total tokens used
    pub total_tokens: u32,
}

/// One generated alternative of a complete response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub index: usize,
    pub message: Message,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Complete (non-streaming) chat response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Unique response ID
    pub id: String,

    /// Object type (usually "chat.completion")
    pub object: String,

    /// Creation timestamp
    pub created: i64,

    /// Model used for generation
    pub model: String,

    /// Response choices
    pub choices: Vec<Choice>,

    /// Token usage information
    #[serde(default)]
    pub usage: TokenCounts,

    /// Provider-specific extras
    #[serde(skip_serializing_if = "serde_json::Map::is_empty", default)]
    pub debug_info: serde_json::Map<String, serde_json::Value>,
}

impl ChatResponse {
    /// Text of the first choice, if any
    pub fn content(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content())
    }
}

/// Incremental message content carried by a streaming chunk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkDelta {
    /// Role (only in first chunk)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    /// Content delta
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Streaming choice with delta
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamChoice {
    pub index: usize,
    pub delta: ChunkDelta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// One streamed piece of a response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamingChatChunk {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<StreamChoice>,
}

impl StreamingChatChunk {
    /// Content delta of the first choice, if present
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.delta.content.as_deref())
    }
}
