//! Retrieved context injected into the system prompt

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Pre-assembled retrieved content that can render itself as prompt text
pub trait ContextContent: Debug + Send + Sync {
    fn to_text(&self) -> String;
}

/// Plain text content, rendered verbatim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StringContextContent(pub String);

impl StringContextContent {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }
}

impl ContextContent for StringContextContent {
    fn to_text(&self) -> String {
        self.0.clone()
    }
}

/// A single retrieved snippet and the document it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSnippet {
    pub source: String,
    pub text: String,
}

/// Snippets retrieved for one query, rendered as a JSON object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextQueryResult {
    pub query: String,
    pub snippets: Vec<ContextSnippet>,
}

impl ContextContent for ContextQueryResult {
    fn to_text(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Results for several queries, rendered as a JSON array
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextQueryResults(pub Vec<ContextQueryResult>);

impl ContextContent for ContextQueryResults {
    fn to_text(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_default()
    }
}

/// Context block produced upstream by the retrieval step
#[derive(Debug)]
pub struct Context {
    content: Box<dyn ContextContent>,
    num_tokens: usize,
    pub debug_info: serde_json::Map<String, serde_json::Value>,
}

impl Context {
    pub fn new(content: impl ContextContent + 'static, num_tokens: usize) -> Self {
        Self {
            content: Box::new(content),
            num_tokens,
            debug_info: serde_json::Map::new(),
        }
    }

    pub fn content(&self) -> &dyn ContextContent {
        self.content.as_ref()
    }

    pub fn num_tokens(&self) -> usize {
        self.num_tokens
    }

    /// Rendered text, as appended to the system message
    pub fn to_text(&self) -> String {
        self.content.to_text()
    }
}
