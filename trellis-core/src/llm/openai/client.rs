//! OpenAI adapter implementation

use super::converter::{forced_tool, from_openai_response, tool_call_arguments};
use super::streaming::SseChunkStream;
use super::types::{OpenAIModelList, OpenAIRequest, OpenAIResponse};
use crate::config::{ClientOptions, ConfigValidator, LlmConfig};
use crate::http::{describe_provider_error, Endpoint, HttpClient, HttpTransport, ProviderError};
use crate::llm::base::{
    build_messages, merge_params, system_message, take_model, ChatCompletion, CompletionOptions,
    FunctionCallOptions, Llm,
};
use crate::llm::error::{LlmError, LlmResult};
use crate::llm::retry::StructuredOutputRetry;
use crate::llm::validation::ArgumentValidator;
use crate::protocol::{Context, Function, Message, ModelParams};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

/// Chat model served by the OpenAI API or an OpenAI-compatible endpoint
pub struct OpenAILLM {
    model_name: String,
    default_params: ModelParams,
    transport: Arc<dyn HttpTransport>,
    retry: StructuredOutputRetry,
}

impl OpenAILLM {
    /// Create a client for `model_name`.
    ///
    /// `default_params` are sent with every request and may be overridden per
    /// call. They must not contain `"model"`.
    pub fn new(
        model_name: impl Into<String>,
        options: ClientOptions,
        default_params: ModelParams,
    ) -> LlmResult<Self> {
        let validator = ConfigValidator::new();
        validator
            .validate_params(&default_params)
            .map_err(|e| LlmError::Configuration(e.to_string()))?;
        validator
            .validate_options(&options)
            .map_err(|e| LlmError::Configuration(e.to_string()))?;

        let client = HttpClient::new(&options).map_err(|e| {
            LlmError::Connection(format!(
                "Failed to connect to OpenAI, please make sure that the OPENAI_API_KEY \
                 environment variable is set correctly.\nError: {}",
                describe_provider_error(&e)
            ))
        })?;

        Self::with_transport(model_name, Arc::new(client), default_params)
    }

    /// Create a client whose options come from the process environment
    pub fn from_env(model_name: impl Into<String>, default_params: ModelParams) -> LlmResult<Self> {
        Self::new(model_name, ClientOptions::from_env(), default_params)
    }

    /// Create a client from a loaded config; unset options fall back to the environment
    pub fn from_config(config: &LlmConfig) -> LlmResult<Self> {
        Self::new(
            config.model_name.clone(),
            config.client_options().resolve_with_env(),
            config.params.clone(),
        )
    }

    /// Create a client over an already built transport
    pub fn with_transport(
        model_name: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
        default_params: ModelParams,
    ) -> LlmResult<Self> {
        ConfigValidator::new()
            .validate_params(&default_params)
            .map_err(|e| LlmError::Configuration(e.to_string()))?;

        Ok(Self {
            model_name: model_name.into(),
            default_params,
            transport,
            retry: StructuredOutputRetry::default(),
        })
    }

    /// Replace the structured-output retry policy
    pub fn with_retry_policy(mut self, retry: StructuredOutputRetry) -> Self {
        self.retry = retry;
        self
    }

    pub fn default_params(&self) -> &ModelParams {
        &self.default_params
    }

    fn translate(&self, err: ProviderError) -> LlmError {
        LlmError::request(self.provider_name(), self.model_name.clone(), err)
    }

    fn encode(request: &OpenAIRequest) -> LlmResult<Value> {
        serde_json::to_value(request)
            .map_err(|e| LlmError::Configuration(format!("Failed to serialize request: {}", e)))
    }

    fn decode_response(&self, value: Value) -> LlmResult<OpenAIResponse> {
        OpenAIResponse::deserialize(&value).map_err(|e| {
            self.translate(ProviderError::Decode {
                message: e.to_string(),
                body: value.to_string(),
            })
        })
    }

    /// One request/parse/validate round of an enforced function call
    fn call_function_once(
        &self,
        system_prompt: &str,
        chat_history: &[Message],
        function: &Function,
        validator: &ArgumentValidator,
        options: &FunctionCallOptions,
    ) -> LlmResult<Map<String, Value>> {
        let mut params = merge_params(
            &self.default_params,
            options.model_params.as_ref(),
            options.max_tokens,
        );
        let model = take_model(&mut params, &self.model_name);
        let (tools, tool_choice) = forced_tool(function);

        let request = OpenAIRequest {
            model,
            messages: build_messages(system_message(system_prompt, None), chat_history),
            stream: None,
            tools: Some(tools),
            tool_choice: Some(tool_choice),
            params,
        };
        info!(
            "Dispatching enforced call of '{}' to {}",
            function.name, request.model
        );

        let body = Self::encode(&request)?;
        let raw = self
            .transport
            .post_json(Endpoint::ChatCompletions, &body)
            .map_err(|e| self.translate(e))?;
        let response = self.decode_response(raw)?;

        let arguments: Value =
            serde_json::from_str(tool_call_arguments(&response)?).map_err(LlmError::Json)?;
        validator.validate(arguments)
    }
}

#[async_trait]
impl Llm for OpenAILLM {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn available_models(&self) -> LlmResult<Vec<String>> {
        let raw = self
            .transport
            .get_json(Endpoint::Models)
            .map_err(|e| self.translate(e))?;
        let list = OpenAIModelList::deserialize(&raw).map_err(|e| {
            self.translate(ProviderError::Decode {
                message: e.to_string(),
                body: raw.to_string(),
            })
        })?;
        Ok(list.data.into_iter().map(|m| m.id).collect())
    }

    fn chat_completion(
        &self,
        system_prompt: &str,
        chat_history: &[Message],
        context: Option<&Context>,
        options: CompletionOptions,
    ) -> LlmResult<ChatCompletion> {
        let mut params = merge_params(
            &self.default_params,
            options.model_params.as_ref(),
            options.max_tokens,
        );
        let model = take_model(&mut params, &self.model_name);

        let request = OpenAIRequest {
            model,
            messages: build_messages(system_message(system_prompt, context), chat_history),
            stream: Some(options.stream),
            tools: None,
            tool_choice: None,
            params,
        };
        info!(
            "Dispatching chat completion to {} (stream: {}, messages: {})",
            request.model,
            options.stream,
            request.messages.len()
        );

        let body = Self::encode(&request)?;
        if options.stream {
            let reader = self
                .transport
                .post_stream(Endpoint::ChatCompletions, &body)
                .map_err(|e| self.translate(e))?;
            let stream = SseChunkStream::new(reader, self.provider_name(), self.model_name.clone());
            return Ok(ChatCompletion::Stream(Box::new(stream)));
        }

        let raw = self
            .transport
            .post_json(Endpoint::ChatCompletions, &body)
            .map_err(|e| self.translate(e))?;
        let response = self.decode_response(raw)?;
        debug!("Chat completion {} finished", response.id);
        Ok(ChatCompletion::Response(from_openai_response(response)))
    }

    fn enforced_function_call(
        &self,
        system_prompt: &str,
        chat_history: &[Message],
        function: &Function,
        options: FunctionCallOptions,
    ) -> LlmResult<Map<String, Value>> {
        let validator = ArgumentValidator::new(&function.parameters.to_schema())?;
        self.retry.execute(|attempt| {
            debug!("Enforced function call attempt {}", attempt);
            self.call_function_once(system_prompt, chat_history, function, &validator, &options)
        })
    }

    async fn achat_completion(
        &self,
        _system_prompt: &str,
        _chat_history: &[Message],
        _context: Option<&Context>,
        _options: CompletionOptions,
    ) -> LlmResult<ChatCompletion> {
        Err(LlmError::NotImplemented("achat_completion"))
    }

    async fn aenforced_function_call(
        &self,
        _system_prompt: &str,
        _chat_history: &[Message],
        _function: &Function,
        _options: FunctionCallOptions,
    ) -> LlmResult<Map<String, Value>> {
        Err(LlmError::NotImplemented("aenforced_function_call"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct UnreachableTransport;

    impl HttpTransport for UnreachableTransport {
        fn get_json(&self, _: Endpoint) -> Result<Value, ProviderError> {
            Err(ProviderError::Connection("unreachable".to_string()))
        }

        fn post_json(&self, _: Endpoint, _: &Value) -> Result<Value, ProviderError> {
            Err(ProviderError::Connection("unreachable".to_string()))
        }

        fn post_stream(
            &self,
            _: Endpoint,
            _: &Value,
        ) -> Result<crate::http::StreamBody, ProviderError> {
            Err(ProviderError::Connection("unreachable".to_string()))
        }
    }

    fn params(value: Value) -> ModelParams {
        value.as_object().cloned().unwrap()
    }

    fn unreachable_llm() -> OpenAILLM {
        OpenAILLM::with_transport("gpt-4", Arc::new(UnreachableTransport), ModelParams::new())
            .unwrap()
    }

    #[test]
    fn test_model_in_defaults_rejected() {
        let result = OpenAILLM::new(
            "gpt-4",
            ClientOptions::new().with_api_key("sk-test"),
            params(json!({"model": "gpt-4o"})),
        );
        match result {
            Err(LlmError::Configuration(message)) => assert!(message.contains("model_name")),
            other => panic!("Expected configuration error, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_model_check_precedes_connection() {
        let result = OpenAILLM::new("gpt-4", ClientOptions::new(), params(json!({"model": "x"})));
        assert!(matches!(result, Err(LlmError::Configuration(_))));
    }

    #[test]
    fn test_missing_key_is_connection_error() {
        let result = OpenAILLM::new("gpt-4", ClientOptions::new(), ModelParams::new());
        match result {
            Err(LlmError::Connection(message)) => {
                assert!(message.starts_with("Failed to connect to OpenAI"));
                assert!(message.contains("OPENAI_API_KEY"));
            }
            other => panic!("Expected connection error, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_provider_name() {
        let llm = unreachable_llm();
        assert_eq!(llm.provider_name(), "OpenAI");
        assert_eq!(llm.model_name(), "gpt-4");
    }

    #[test]
    fn test_transport_failure_translated() {
        let llm = unreachable_llm();
        let err = llm
            .chat_completion("sys", &[Message::user("hi")], None, CompletionOptions::new())
            .unwrap_err();
        let text = err.to_string();
        assert!(text.contains("OpenAI's gpt-4 model"));
        assert!(text.contains("unreachable"));
    }
}
