//! Conversion between the protocol types and the OpenAI format

use super::types::*;
use crate::llm::error::{LlmError, LlmResult};
use crate::protocol::{
    ChatResponse, Choice, ChunkDelta, Function, Message, Role, StreamChoice, StreamingChatChunk,
    TokenCounts,
};

fn to_role(role: &str) -> Role {
    match role {
        "system" => Role::System,
        "user" => Role::User,
        _ => Role::Assistant,
    }
}

/// Tool list and choice forcing a single call of `function`
pub fn forced_tool(function: &Function) -> (Vec<OpenAITool>, OpenAIToolChoice) {
    let tool = OpenAITool {
        tool_type: "function".to_string(),
        function: function.declaration(),
    };
    let choice = OpenAIToolChoice {
        choice_type: "function".to_string(),
        function: OpenAIFunctionName {
            name: function.name.clone(),
        },
    };
    (vec![tool], choice)
}

/// Convert an OpenAI response into a [`ChatResponse`]
pub fn from_openai_response(response: OpenAIResponse) -> ChatResponse {
    let mut debug_info = serde_json::Map::new();
    if let Some(fingerprint) = response.system_fingerprint {
        debug_info.insert("system_fingerprint".to_string(), fingerprint.into());
    }

    ChatResponse {
        id: response.id,
        object: response.object,
        created: response.created,
        model: response.model,
        choices: response
            .choices
            .into_iter()
            .map(|choice| Choice {
                index: choice.index,
                message: Message::new(
                    to_role(&choice.message.role),
                    choice.message.content.unwrap_or_default(),
                ),
                finish_reason: choice.finish_reason,
            })
            .collect(),
        usage: response
            .usage
            .map(|u| TokenCounts {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default(),
        debug_info,
    }
}

/// Convert an OpenAI stream chunk
pub fn from_openai_stream_chunk(chunk: OpenAIStreamChunk) -> StreamingChatChunk {
    StreamingChatChunk {
        id: chunk.id,
        object: chunk.object,
        created: chunk.created,
        model: chunk.model,
        choices: chunk
            .choices
            .into_iter()
            .map(|choice| StreamChoice {
                index: choice.index,
                delta: ChunkDelta {
                    role: choice.delta.role.as_deref().map(to_role),
                    content: choice.delta.content,
                },
                finish_reason: choice.finish_reason,
            })
            .collect(),
    }
}

/// Raw arguments of the first tool call in the first choice
pub fn tool_call_arguments(response: &OpenAIResponse) -> LlmResult<&str> {
    let choice = response
        .choices
        .first()
        .ok_or_else(|| LlmError::UnexpectedResponse("response contains no choices".to_string()))?;

    choice
        .message
        .tool_calls
        .as_deref()
        .and_then(|calls| calls.first())
        .map(|call| call.function.arguments.as_str())
        .ok_or_else(|| LlmError::UnexpectedResponse("response contains no tool call".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{FunctionParameters, FunctionProperty};
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_response_conversion() {
        let raw = json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "created": 1234567890,
            "model": "gpt-4",
            "system_fingerprint": "fp_1",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Hello!"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7}
        });
        let response = from_openai_response(OpenAIResponse::deserialize(&raw).unwrap());

        assert_eq!(response.id, "chatcmpl-123");
        assert_eq!(response.content(), Some("Hello!"));
        assert_eq!(response.choices[0].message.role(), Role::Assistant);
        assert_eq!(response.usage.total_tokens, 7);
        assert_eq!(response.debug_info["system_fingerprint"], "fp_1");
    }

    #[test]
    fn test_null_content_becomes_empty() {
        let raw = json!({
            "choices": [{"message": {"role": "assistant", "content": null}}]
        });
        let response = from_openai_response(OpenAIResponse::deserialize(&raw).unwrap());
        assert_eq!(response.content(), Some(""));
        assert_eq!(response.usage, TokenCounts::default());
    }

    #[test]
    fn test_tool_call_arguments() {
        let raw = json!({
            "choices": [{"message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {"name": "f", "arguments": "{\"a\": 1}"}
                }]
            }}]
        });
        let response = OpenAIResponse::deserialize(&raw).unwrap();
        assert_eq!(tool_call_arguments(&response).unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn test_missing_tool_call_is_unexpected() {
        let raw = json!({"choices": [{"message": {"role": "assistant", "content": "hi"}}]});
        let response = OpenAIResponse::deserialize(&raw).unwrap();
        assert!(matches!(
            tool_call_arguments(&response),
            Err(LlmError::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn test_forced_tool_shape() {
        let function = Function::new(
            "lookup",
            "Look something up",
            FunctionParameters::new(vec![FunctionProperty::primitive("term", "string", "Term")]),
        );
        let (tools, choice) = forced_tool(&function);
        let value = serde_json::to_value((&tools, &choice)).unwrap();
        assert_eq!(value[0][0]["type"], "function");
        assert_eq!(value[0][0]["function"]["name"], "lookup");
        assert_eq!(value[1], json!({"type": "function", "function": {"name": "lookup"}}));
    }
}
