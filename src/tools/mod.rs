//! Tools offered to the orchestrating agent.
//!
//! [`MedicalTools`] is the registry: five named capabilities, each taking one
//! query string and returning one string. The routing agent reaches them
//! through [`ToolExecutor`]; the fallback router calls [`MedicalTools::invoke`]
//! directly.

pub mod database;
pub mod web;

use std::sync::Arc;

use async_trait::async_trait;

pub use database::{DomainAnswer, DomainTool};
pub use web::{SearchClient, SearchError, SearchHit, SearchRequest, TavilyClient, WebSearchTool};

use crate::agent::config::AgentConfig;
use crate::agent::executor::{QueryArgs, ToolExecutor, parse_arguments};
use crate::agent::provider::LlmProvider;
use crate::agent::tool::{SIMPLE_SEARCH_TOOL, ToolCall, ToolResult, WEB_SEARCH_TOOL};
use crate::config::AppConfig;
use crate::core::Domain;

/// Names of every registered tool, in registration order.
pub const TOOL_NAMES: [&str; 5] = [
    Domain::Heart.tool_name(),
    Domain::Cancer.tool_name(),
    Domain::Diabetes.tool_name(),
    WEB_SEARCH_TOOL,
    SIMPLE_SEARCH_TOOL,
];

/// The medical tool registry.
pub struct MedicalTools {
    domains: [DomainTool; 3],
    web: WebSearchTool,
}

impl MedicalTools {
    /// Builds the registry from configuration.
    #[must_use]
    pub fn new(
        config: &AppConfig,
        provider: &Arc<dyn LlmProvider>,
        agent_config: &AgentConfig,
        web: WebSearchTool,
    ) -> Self {
        Self {
            domains: Domain::ALL.map(|d| {
                DomainTool::new(&config.domain(d), Arc::clone(provider), agent_config.clone())
            }),
            web,
        }
    }

    /// Tool answering questions about a domain.
    #[must_use]
    pub const fn domain(&self, domain: Domain) -> &DomainTool {
        &self.domains[domain as usize]
    }

    /// The web search tool.
    #[must_use]
    pub const fn web(&self) -> &WebSearchTool {
        &self.web
    }

    /// Invokes a tool by name. Returns `None` for unknown names.
    #[allow(clippy::future_not_send)]
    pub async fn invoke(&self, name: &str, query: &str) -> Option<String> {
        if let Some(domain) = Domain::from_tool_name(name) {
            return Some(self.domain(domain).query(query).await);
        }
        match name {
            WEB_SEARCH_TOOL => Some(self.web.search(query).await),
            SIMPLE_SEARCH_TOOL => Some(WebSearchTool::fallback(query)),
            _ => None,
        }
    }
}

#[async_trait(?Send)]
impl ToolExecutor for MedicalTools {
    async fn execute(&self, call: &ToolCall) -> ToolResult {
        let args: QueryArgs = match parse_arguments(call) {
            Ok(args) => args,
            Err(e) => return ToolResult::error(call, format!("Error: {e}")),
        };
        match self.invoke(&call.name, &args.query).await {
            Some(output) => ToolResult::ok(call, output),
            None => ToolResult::error(call, format!("Error: unknown tool '{}'", call.name)),
        }
    }
}
