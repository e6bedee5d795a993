//! The adapter trait and the request-shaping rules every adapter shares

use super::error::LlmResult;
use crate::protocol::{ChatResponse, Context, Function, Message, ModelParams, StreamingChatChunk};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

/// Parameter key carrying the output token limit
pub const MAX_TOKENS_KEY: &str = "max_tokens";

/// Forward-only stream of response chunks, read from the network on demand
pub type ChatStream = Box<dyn Iterator<Item = LlmResult<StreamingChatChunk>> + Send>;

/// Outcome of [`Llm::chat_completion`]
pub enum ChatCompletion {
    Response(ChatResponse),
    Stream(ChatStream),
}

impl ChatCompletion {
    pub fn is_stream(&self) -> bool {
        matches!(self, ChatCompletion::Stream(_))
    }

    pub fn into_response(self) -> Option<ChatResponse> {
        match self {
            ChatCompletion::Response(response) => Some(response),
            ChatCompletion::Stream(_) => None,
        }
    }

    pub fn into_stream(self) -> Option<ChatStream> {
        match self {
            ChatCompletion::Stream(stream) => Some(stream),
            ChatCompletion::Response(_) => None,
        }
    }
}

impl fmt::Debug for ChatCompletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatCompletion::Response(response) => {
                f.debug_tuple("Response").field(response).finish()
            }
            ChatCompletion::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Per-call options of a chat completion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionOptions {
    pub stream: bool,
    /// Wins over `max_tokens` in both defaults and `model_params`
    pub max_tokens: Option<u32>,
    /// Overrides of the client's default parameters
    pub model_params: Option<ModelParams>,
}

impl CompletionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn streaming() -> Self {
        Self {
            stream: true,
            ..Self::default()
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_model_params(mut self, params: ModelParams) -> Self {
        self.model_params = Some(params);
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.model_params
            .get_or_insert_with(ModelParams::new)
            .insert(key.into(), value.into());
        self
    }
}

/// Per-call options of an enforced function call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionCallOptions {
    pub max_tokens: Option<u32>,
    pub model_params: Option<ModelParams>,
}

impl FunctionCallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_model_params(mut self, params: ModelParams) -> Self {
        self.model_params = Some(params);
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.model_params
            .get_or_insert_with(ModelParams::new)
            .insert(key.into(), value.into());
        self
    }
}

/// A hosted chat model behind a uniform interface
#[async_trait]
pub trait Llm: Send + Sync {
    /// Model identifier used when a call does not override it
    fn model_name(&self) -> &str;

    /// Logical provider name, derived from the implementing type's name
    fn provider_name(&self) -> String {
        provider_name_from_type(std::any::type_name::<Self>())
    }

    /// Model identifiers the provider currently offers
    fn available_models(&self) -> LlmResult<Vec<String>>;

    fn chat_completion(
        &self,
        system_prompt: &str,
        chat_history: &[Message],
        context: Option<&Context>,
        options: CompletionOptions,
    ) -> LlmResult<ChatCompletion>;

    /// Force a single call of `function` and return its validated arguments
    fn enforced_function_call(
        &self,
        system_prompt: &str,
        chat_history: &[Message],
        function: &Function,
        options: FunctionCallOptions,
    ) -> LlmResult<serde_json::Map<String, Value>>;

    async fn achat_completion(
        &self,
        system_prompt: &str,
        chat_history: &[Message],
        context: Option<&Context>,
        options: CompletionOptions,
    ) -> LlmResult<ChatCompletion>;

    async fn aenforced_function_call(
        &self,
        system_prompt: &str,
        chat_history: &[Message],
        function: &Function,
        options: FunctionCallOptions,
    ) -> LlmResult<serde_json::Map<String, Value>>;
}

/// `crate::llm::OpenAILLM` becomes `OpenAI`
pub fn provider_name_from_type(type_name: &str) -> String {
    let base = type_name.split('<').next().unwrap_or(type_name);
    let short = base.rsplit("::").next().unwrap_or(base);
    short.strip_suffix("LLM").unwrap_or(short).to_string()
}

/// Effective parameters: defaults, then per-call overrides, then `max_tokens`
pub fn merge_params(
    defaults: &ModelParams,
    overrides: Option<&ModelParams>,
    max_tokens: Option<u32>,
) -> ModelParams {
    let mut merged = defaults.clone();
    if let Some(overrides) = overrides {
        merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    if let Some(max_tokens) = max_tokens {
        merged.insert(MAX_TOKENS_KEY.to_string(), Value::from(max_tokens));
    }
    merged
}

/// Remove a per-call `"model"` override from `params`, falling back to `default_model`
pub fn take_model(params: &mut ModelParams, default_model: &str) -> String {
    match params.remove("model") {
        Some(Value::String(model)) => model,
        Some(other) => other.to_string(),
        None => default_model.to_string(),
    }
}

/// System message made of the prompt and, when present, the rendered context
pub fn system_message(system_prompt: &str, context: Option<&Context>) -> Message {
    match context {
        Some(context) => {
            Message::system(format!("{}\nContext: {}", system_prompt, context.to_text()))
        }
        None => Message::system(system_prompt),
    }
}

/// `system` followed by the history, order preserved
pub fn build_messages(system: Message, chat_history: &[Message]) -> Vec<Message> {
    let mut messages = Vec::with_capacity(chat_history.len() + 1);
    messages.push(system);
    messages.extend_from_slice(chat_history);
    messages
}
