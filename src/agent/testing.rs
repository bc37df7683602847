//! Scripted LLM provider for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::message::{ChatRequest, ChatResponse, TokenUsage};
use super::provider::LlmProvider;
use super::tool::ToolCall;
use crate::error::AgentError;

/// One scripted provider reply.
pub(crate) enum Reply {
    Text(String),
    Tool { name: String, arguments: String },
    Fail(String),
}

impl Reply {
    pub(crate) fn text(s: &str) -> Self {
        Self::Text(s.to_string())
    }

    pub(crate) fn tool(name: &str, arguments: &str) -> Self {
        Self::Tool {
            name: name.to_string(),
            arguments: arguments.to_string(),
        }
    }
}

/// Provider that replays a fixed script, then repeats `fallback` forever.
pub(crate) struct ScriptedProvider {
    script: Mutex<VecDeque<Reply>>,
    fallback: fn() -> Reply,
    calls: AtomicUsize,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    pub(crate) fn new(script: Vec<Reply>) -> Self {
        Self::with_fallback(script, || Reply::text("done"))
    }

    pub(crate) fn with_fallback(script: Vec<Reply>, fallback: fn() -> Reply) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Provider that requests the same tool on every call.
    pub(crate) fn always_tool(name: &'static str) -> Self {
        let provider = Self::with_fallback(Vec::new(), || Reply::Fail(String::new()));
        if let Ok(mut script) = provider.script.lock() {
            for _ in 0..64 {
                script.push_back(Reply::tool(name, r#"{"query":"loop"}"#));
            }
        }
        provider
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut reqs) = self.requests.lock() {
            reqs.push(request.clone());
        }
        let reply = self
            .script
            .lock()
            .ok()
            .and_then(|mut s| s.pop_front())
            .unwrap_or_else(self.fallback);

        match reply {
            Reply::Text(content) => Ok(ChatResponse {
                content,
                usage: TokenUsage {
                    prompt_tokens: 10,
                    completion_tokens: 5,
                    total_tokens: 15,
                },
                tool_calls: Vec::new(),
                finish_reason: Some("stop".to_string()),
            }),
            Reply::Tool { name, arguments } => Ok(ChatResponse {
                content: String::new(),
                usage: TokenUsage::default(),
                tool_calls: vec![ToolCall {
                    id: format!("call_{n}"),
                    name,
                    arguments,
                }],
                finish_reason: Some("tool_calls".to_string()),
            }),
            Reply::Fail(message) => Err(AgentError::ApiRequest {
                message,
                status: Some(500),
            }),
        }
    }
}
