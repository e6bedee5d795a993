//! OpenAI API types
//!
//! These types match the OpenAI chat completions format and are used for
//! serialization/deserialization when communicating with the API.

use crate::protocol::{Message, ModelParams};
use serde::{Deserialize, Serialize};

/// Chat completion request body
#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    pub model: String,
    pub messages: Vec<Message>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<OpenAITool>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<OpenAIToolChoice>,

    /// Generation parameters, flattened into the top-level object
    #[serde(flatten)]
    pub params: ModelParams,
}

/// Tool definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAITool {
    #[serde(rename = "type")]
    pub tool_type: String,

    /// Name, description and parameter schema
    pub function: serde_json::Value,
}

/// Forces the named function to be called
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIToolChoice {
    #[serde(rename = "type")]
    pub choice_type: String,

    pub function: OpenAIFunctionName,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIFunctionName {
    pub name: String,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<OpenAIChoice>,
    #[serde(default)]
    pub usage: Option<OpenAIUsage>,
    #[serde(default)]
    pub system_fingerprint: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    #[serde(default)]
    pub index: usize,
    pub message: OpenAIMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Message as returned by the API; content is absent for tool calls
#[derive(Debug, Deserialize)]
pub struct OpenAIMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<OpenAIToolCall>>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIToolCall {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub tool_type: String,
    pub function: OpenAIFunctionCall,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIFunctionCall {
    pub name: String,
    /// JSON-encoded arguments, exactly as generated
    pub arguments: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct OpenAIUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// Streaming chunk
#[derive(Debug, Deserialize)]
pub struct OpenAIStreamChunk {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<OpenAIStreamChoice>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIStreamChoice {
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub delta: OpenAIDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OpenAIDelta {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// `GET /models` response
#[derive(Debug, Deserialize)]
pub struct OpenAIModelList {
    pub data: Vec<OpenAIModel>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIModel {
    pub id: String,
    #[serde(default)]
    pub owned_by: Option<String>,
}
