//! Server-sent events parsing for streamed OpenAI responses

use super::converter::from_openai_stream_chunk;
use super::types::OpenAIStreamChunk;
use crate::http::ProviderError;
use crate::llm::error::{LlmError, LlmResult};
use crate::protocol::StreamingChatChunk;
use eventsource_stream::{Event, EventStreamError, Eventsource};
use futures::executor::{block_on_stream, BlockingStream};
use futures::stream::{self, BoxStream};
use serde_json::Value;
use std::io::{self, BufRead};

/// Terminal event payload
const DONE_MARKER: &str = "[DONE]";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

type EventResult = Result<Event, EventStreamError<io::Error>>;

/// Body bytes in the order the reader hands them out, leading BOM removed
struct BodyChunks<R> {
    reader: R,
    started: bool,
}

impl<R: BufRead> Iterator for BodyChunks<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        let (chunk, consumed) = match self.reader.fill_buf() {
            Ok([]) => return None,
            Ok(buf) => {
                let skip = if !self.started && buf.starts_with(UTF8_BOM) {
                    UTF8_BOM.len()
                } else {
                    0
                };
                (buf[skip..].to_vec(), buf.len())
            }
            Err(e) => return Some(Err(e)),
        };
        self.reader.consume(consumed);
        self.started = true;
        Some(Ok(chunk))
    }
}

/// Lazy iterator over the chunks of one streamed response.
///
/// Each `next()` blocks until the following event arrives. The stream ends at
/// `data: [DONE]` or end of body and is fused after the first error.
pub struct SseChunkStream {
    events: BlockingStream<BoxStream<'static, EventResult>>,
    provider: String,
    model: String,
    finished: bool,
}

impl SseChunkStream {
    /// `provider` and `model` label errors raised while reading
    pub fn new<R>(reader: R, provider: impl Into<String>, model: impl Into<String>) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let bytes = stream::iter(BodyChunks {
            reader,
            started: false,
        });
        let events: BoxStream<'static, EventResult> = Box::pin(bytes.eventsource());

        Self {
            events: block_on_stream(events),
            provider: provider.into(),
            model: model.into(),
            finished: false,
        }
    }

    fn fail(&mut self, source: ProviderError) -> LlmError {
        self.finished = true;
        LlmError::request(self.provider.clone(), self.model.clone(), source)
    }

    /// `None` when the payload is skipped
    fn decode(&mut self, data: String) -> Option<LlmResult<StreamingChatChunk>> {
        match serde_json::from_str::<OpenAIStreamChunk>(&data) {
            Ok(chunk) => Some(Ok(from_openai_stream_chunk(chunk))),
            Err(e) => {
                let is_error_event = serde_json::from_str::<Value>(&data)
                    .map(|v| v.get("error").is_some())
                    .unwrap_or(false);
                if is_error_event {
                    return Some(Err(self.fail(ProviderError::Decode {
                        message: "provider sent an error event".to_string(),
                        body: data,
                    })));
                }
                tracing::warn!("Failed to parse stream chunk: {}", e);
                None
            }
        }
    }
}

impl Iterator for SseChunkStream {
    type Item = LlmResult<StreamingChatChunk>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            match self.events.next() {
                Some(Ok(event)) if event.data == DONE_MARKER => self.finished = true,
                Some(Ok(event)) => {
                    if let Some(item) = self.decode(event.data) {
                        return Some(item);
                    }
                }
                None => self.finished = true,
                Some(Err(e)) => {
                    let err = self.fail(ProviderError::Connection(format!("Stream error: {}", e)));
                    return Some(Err(err));
                }
            }
        }
        None
    }
}
