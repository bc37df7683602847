//! Agent trait definition.
//!
//! Both agents (router, SQL) implement this trait, which provides a uniform
//! interface for the orchestrator and the domain tools.

use super::executor::ToolExecutor;
use super::message::{ChatMessage, ChatRequest, ChatResponse, system_message, user_message};
use super::provider::LlmProvider;
use super::tool::ToolDefinition;
use crate::error::AgentError;

/// Response from an agent execution.
#[derive(Debug, Clone)]
pub struct AgentResponse {
    /// The agent's text output.
    pub content: String,
    /// Token usage for this call.
    pub usage: super::message::TokenUsage,
    /// Why the model stopped generating (e.g. `"stop"`, `"length"`).
    pub finish_reason: Option<String>,
}

impl From<ChatResponse> for AgentResponse {
    fn from(response: ChatResponse) -> Self {
        Self {
            content: response.content,
            usage: response.usage,
            finish_reason: response.finish_reason,
        }
    }
}

/// Trait implemented by all agents in the system.
///
/// Agents encapsulate a specific role (routing, SQL answering) with a fixed
/// system prompt and model configuration.
///
/// Agents that support tool-calling override [`Agent::tools`] to return
/// their available tool definitions and use [`execute_with_tools`]
/// for agentic loop execution.
pub trait Agent: Send + Sync {
    /// Agent name for logging and identification.
    fn name(&self) -> &'static str;

    /// Model identifier to use for this agent.
    fn model(&self) -> &str;

    /// System prompt that defines the agent's role and behavior.
    fn system_prompt(&self) -> &str;

    /// Sampling temperature (0.0 = deterministic, higher = more creative).
    fn temperature(&self) -> f32 {
        0.0
    }

    /// Maximum tokens for the response.
    fn max_tokens(&self) -> u32 {
        1000
    }

    /// Tool definitions available to this agent.
    ///
    /// Returns an empty vec by default (no tools).
    fn tools(&self) -> Vec<ToolDefinition> {
        Vec::new()
    }

    /// Maximum tool-calling loop iterations before aborting.
    fn max_tool_iterations(&self) -> usize {
        10
    }
}

/// Executes an agent with tool-calling support.
///
/// `history` is inserted between the system prompt and the user message,
/// letting a chat session carry earlier turns. If the agent has no tools,
/// a single completion is made.
///
/// This is a free function (not on the `Agent` trait) because executors
/// may hold a `rusqlite::Connection`, which is `!Sync`, making futures that
/// capture them `!Send`.
///
/// # Errors
///
/// Returns [`AgentError`] on API failures, or if the tool loop exceeds the
/// agent's max iterations.
#[allow(clippy::future_not_send)]
pub async fn execute_with_tools(
    agent: &dyn Agent,
    provider: &dyn LlmProvider,
    history: &[ChatMessage],
    user_msg: &str,
    executor: &dyn ToolExecutor,
) -> Result<AgentResponse, AgentError> {
    let tools = agent.tools();

    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(system_message(agent.system_prompt()));
    messages.extend(history.iter().cloned());
    messages.push(user_message(user_msg));

    let mut request = ChatRequest {
        model: agent.model().to_string(),
        messages,
        temperature: Some(agent.temperature()),
        max_tokens: Some(agent.max_tokens()),
        tools,
    };

    if request.tools.is_empty() {
        return Ok(provider.chat(&request).await?.into());
    }

    let response = super::agentic_loop::agentic_loop(
        provider,
        &mut request,
        executor,
        agent.max_tool_iterations(),
    )
    .await?;

    Ok(response.into())
}
