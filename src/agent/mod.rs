//! LLM agent framework for medagent.
//!
//! Provides the function-calling plumbing behind the orchestrating agent
//! and the per-domain SQL agents. Uses a pluggable provider abstraction
//! backed by OpenAI-compatible APIs (GitHub Models by default).
//!
//! # Architecture
//!
//! ```text
//! User query → MedicalAgent
//!   ├── RouterAgent + MedicalTools (agentic loop)
//!   │   ├── DomainTool → SqlAgent + SqlToolExecutor (agentic loop)
//!   │   └── WebSearchTool → SearchClient or canned answers
//!   └── on failure: keyword router → same tools
//! ```

pub mod agentic_loop;
pub mod client;
pub mod config;
pub mod executor;
pub mod message;
pub mod orchestrator;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod router;
pub mod sql;
pub mod tool;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

// Re-export key types
pub use config::AgentConfig;
pub use executor::ToolExecutor;
pub use message::{ChatMessage, ChatRequest, ChatResponse, Role, TokenUsage};
pub use orchestrator::MedicalAgent;
pub use provider::LlmProvider;
pub use router::RouterAgent;
pub use sql::{SqlAgent, SqlToolExecutor};
pub use tool::{ToolCall, ToolDefinition, ToolResult, ToolSet};
pub use traits::{Agent, AgentResponse, execute_with_tools};
