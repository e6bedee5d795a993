//! Shared helpers for integration tests

#![allow(dead_code)]

use serde_json::{json, Value};
use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use trellis_core::http::{Endpoint, HttpTransport, ProviderError, StreamBody};
use trellis_core::{ModelParams, OpenAILLM};

/// Install a test subscriber honoring `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Transport that replays queued results and records every request
#[derive(Default)]
pub struct ScriptedTransport {
    json_responses: Mutex<VecDeque<Result<Value, ProviderError>>>,
    stream_bodies: Mutex<VecDeque<Result<String, ProviderError>>>,
    requests: Mutex<Vec<(Endpoint, Value)>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_json(&self, response: Result<Value, ProviderError>) {
        self.json_responses.lock().unwrap().push_back(response);
    }

    pub fn push_stream(&self, body: Result<String, ProviderError>) {
        self.stream_bodies.lock().unwrap().push_back(body);
    }

    pub fn requests(&self) -> Vec<(Endpoint, Value)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Body of the most recent request
    pub fn last_body(&self) -> Value {
        self.requests
            .lock()
            .unwrap()
            .last()
            .map(|(_, body)| body.clone())
            .expect("no request recorded")
    }

    fn record(&self, endpoint: Endpoint, body: &Value) {
        self.requests.lock().unwrap().push((endpoint, body.clone()));
    }

    fn next_json(&self) -> Result<Value, ProviderError> {
        self.json_responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted JSON response left")
    }
}

impl HttpTransport for ScriptedTransport {
    fn get_json(&self, endpoint: Endpoint) -> Result<Value, ProviderError> {
        self.record(endpoint, &Value::Null);
        self.next_json()
    }

    fn post_json(&self, endpoint: Endpoint, body: &Value) -> Result<Value, ProviderError> {
        self.record(endpoint, body);
        self.next_json()
    }

    fn post_stream(&self, endpoint: Endpoint, body: &Value) -> Result<StreamBody, ProviderError> {
        self.record(endpoint, body);
        let body = self
            .stream_bodies
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted stream left")?;
        Ok(Box::new(Cursor::new(body.into_bytes())))
    }
}

pub fn params(value: Value) -> ModelParams {
    value.as_object().cloned().expect("params must be a JSON object")
}

pub fn llm_with(transport: &Arc<ScriptedTransport>, defaults: Value) -> OpenAILLM {
    OpenAILLM::with_transport("gpt-3.5-turbo", transport.clone(), params(defaults))
        .expect("valid test client")
}

/// A complete chat response carrying `content`
pub fn chat_response(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1700000000,
        "model": "gpt-3.5-turbo",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 12, "completion_tokens": 4, "total_tokens": 16}
    })
}

/// A response whose single tool call carries `arguments` verbatim
pub fn tool_call_response(name: &str, arguments: &str) -> Value {
    json!({
        "id": "chatcmpl-tool",
        "object": "chat.completion",
        "created": 1700000000,
        "model": "gpt-3.5-turbo",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_0",
                    "type": "function",
                    "function": {"name": name, "arguments": arguments}
                }]
            },
            "finish_reason": "tool_calls"
        }]
    })
}

/// SSE body streaming `pieces` followed by the terminal marker
pub fn sse_body(pieces: &[&str]) -> String {
    let mut body = String::new();
    for (i, piece) in pieces.iter().enumerate() {
        let chunk = json!({
            "id": "chatcmpl-stream",
            "object": "chat.completion.chunk",
            "created": 1700000000,
            "model": "gpt-3.5-turbo",
            "choices": [{
                "index": 0,
                "delta": if i == 0 {
                    json!({"role": "assistant", "content": piece})
                } else {
                    json!({"content": piece})
                },
                "finish_reason": null
            }]
        });
        body.push_str(&format!("data: {}\n\n", chunk));
    }
    body.push_str("data: [DONE]\n\n");
    body
}

pub fn openai_error(status: u16, message: &str) -> ProviderError {
    ProviderError::Status {
        status,
        body: json!({"error": {"message": message, "type": "invalid_request_error"}}).to_string(),
    }
}
