//! Tool execution seam between the agentic loop and concrete tools.
//!
//! The loop only knows [`ToolExecutor`]; the routing tools and the SQL tools
//! each provide an implementation. Futures are `?Send` because the SQL
//! executor holds a `rusqlite::Connection`, which is `!Sync`. The CLI runs
//! every agent on a single-threaded `block_on`, where that is acceptable.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::tool::{ToolCall, ToolResult};
use crate::error::AgentError;

/// Maximum raw byte length of tool argument JSON from the LLM.
pub const MAX_TOOL_ARGS_LEN: usize = 100_000;

/// Dispatches tool calls requested by a model.
#[async_trait(?Send)]
pub trait ToolExecutor {
    /// Executes one tool call. Failures are reported in the result, never
    /// raised, so the model can see them and recover.
    async fn execute(&self, call: &ToolCall) -> ToolResult;
}

/// Rejects oversized argument payloads before dispatch.
///
/// Returns an error result to hand back to the model if the payload is too
/// large, or `None` if the call may proceed.
#[must_use]
pub fn check_argument_size(call: &ToolCall) -> Option<ToolResult> {
    (call.arguments.len() > MAX_TOOL_ARGS_LEN).then(|| {
        ToolResult::error(
            call,
            format!(
                "tool arguments too large ({} bytes, max {MAX_TOOL_ARGS_LEN})",
                call.arguments.len()
            ),
        )
    })
}

/// Parses a tool call's JSON arguments.
///
/// Empty argument strings are treated as `{}`.
///
/// # Errors
///
/// Returns [`AgentError::ToolExecution`] if the arguments do not match `T`.
pub fn parse_arguments<T: DeserializeOwned>(call: &ToolCall) -> Result<T, AgentError> {
    let raw = if call.arguments.trim().is_empty() {
        "{}"
    } else {
        call.arguments.as_str()
    };
    serde_json::from_str(raw).map_err(|e| AgentError::ToolExecution {
        name: call.name.clone(),
        message: format!("invalid arguments: {e}"),
    })
}

/// Arguments shared by every single-string tool.
#[derive(Debug, serde::Deserialize)]
pub struct QueryArgs {
    /// The query string.
    pub query: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(arguments: &str) -> ToolCall {
        ToolCall {
            id: "call_1".to_string(),
            name: "heart_disease_db_tool".to_string(),
            arguments: arguments.to_string(),
        }
    }

    #[test]
    fn test_parse_query_args() {
        let args: QueryArgs =
            parse_arguments(&call(r#"{"query":"average age"}"#)).unwrap_or_else(|_| unreachable!());
        assert_eq!(args.query, "average age");
    }

    #[test]
    fn test_parse_invalid_args() {
        let result = parse_arguments::<QueryArgs>(&call(r#"{"q":1}"#));
        assert!(matches!(result, Err(AgentError::ToolExecution { .. })));
    }

    #[test]
    fn test_empty_arguments_are_empty_object() {
        #[derive(serde::Deserialize)]
        struct NoArgs {}
        assert!(parse_arguments::<NoArgs>(&call("")).is_ok());
    }

    #[test]
    fn test_argument_size_limit() {
        assert!(check_argument_size(&call("{}")).is_none());
        let big = "x".repeat(MAX_TOOL_ARGS_LEN + 1);
        let result = check_argument_size(&call(&big));
        assert!(result.is_some_and(|r| r.is_error));
    }
}
