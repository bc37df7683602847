//! Agentic tool-calling loop.
//!
//! Drives the LLM ↔ tool execution round-trip: sends a request to the model,
//! executes any tool calls in the response, appends results, and repeats
//! until the model produces a final text response or the iteration limit
//! is reached.

use tracing::debug;

use super::executor::{ToolExecutor, check_argument_size};
use super::message::{
    ChatRequest, ChatResponse, TokenUsage, assistant_tool_calls_message, tool_message,
};
use super::provider::LlmProvider;
use crate::error::AgentError;

/// Runs an agentic loop: model → tool calls → tool results → model → …
///
/// The returned response carries the final text answer with token usage
/// summed over every round-trip.
///
/// # Errors
///
/// Returns [`AgentError::ToolLoopExceeded`] if the model keeps requesting
/// tools for `max_iterations` round-trips. Propagates any provider errors.
#[allow(clippy::future_not_send)]
pub async fn agentic_loop(
    provider: &dyn LlmProvider,
    request: &mut ChatRequest,
    executor: &dyn ToolExecutor,
    max_iterations: usize,
) -> Result<ChatResponse, AgentError> {
    let mut usage = TokenUsage::default();

    for iteration in 0..max_iterations {
        let mut response = provider.chat(request).await?;
        usage.accumulate(response.usage);

        // If no tool calls, we have a final answer
        if response.tool_calls.is_empty() {
            debug!(
                iteration,
                total_tokens = usage.total_tokens,
                "agentic loop completed with final text response"
            );
            response.usage = usage;
            return Ok(response);
        }

        debug!(
            iteration,
            tool_count = response.tool_calls.len(),
            "executing tool calls"
        );

        request
            .messages
            .push(assistant_tool_calls_message(response.tool_calls.clone()));

        for call in &response.tool_calls {
            let result = match check_argument_size(call) {
                Some(rejected) => rejected,
                None => executor.execute(call).await,
            };
            debug!(
                tool = %call.name,
                call_id = %call.id,
                is_error = result.is_error,
                "tool execution complete"
            );
            request
                .messages
                .push(tool_message(&result.tool_call_id, &result.content));
        }
    }

    Err(AgentError::ToolLoopExceeded { max_iterations })
}
