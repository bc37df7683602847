//! Orchestrating agent.
//!
//! Runs the routing agent over the medical tool registry. When the agent
//! cannot produce an answer (iteration limit, API failure) the question is
//! sent through the keyword router instead, so a user always gets a reply.

use std::sync::Arc;

use tracing::{debug, warn};

use super::client::create_provider;
use super::config::AgentConfig;
use super::message::ChatMessage;
use super::provider::LlmProvider;
use super::router::RouterAgent;
use super::traits::execute_with_tools;
use crate::config::{AppConfig, Credentials};
use crate::core::classify;
use crate::error::Result;
use crate::tools::{MedicalTools, WebSearchTool};

/// Help text describing the tools and example queries.
pub const TOOLS_INFO: &str = r#"🛠️ **Available Medical AI Tools:**

**📊 Database Tools:**
• 🫀 **Heart Disease DB** - Statistics and data about heart disease patients
• 🎗️ **Cancer DB** - Cancer diagnosis and tumor characteristic data
• 🩺 **Diabetes DB** - Diabetes patient health metrics and risk factors

**🌐 Web Search Tools:**
• 🔍 **Medical Web Search** - General medical information, definitions, symptoms, treatments
• 📚 **Simple Medical Search** - Fallback tool for basic medical information

**💡 Example Queries:**

*Database queries (for statistics):*
- "What is the average age of heart disease patients?"
- "How many cancer cases are in the dataset?"
- "Show me diabetes statistics by age group"

*Web search queries (for general knowledge):*
- "What are the symptoms of type 2 diabetes?"
- "How is coronary heart disease treated?"
- "What causes breast cancer?"
"#;

/// The orchestrating medical agent.
pub struct MedicalAgent {
    provider: Arc<dyn LlmProvider>,
    router: RouterAgent,
    tools: MedicalTools,
}

impl MedicalAgent {
    /// Creates an agent from its parts.
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, config: &AgentConfig, tools: MedicalTools) -> Self {
        Self {
            provider,
            router: RouterAgent::new(config),
            tools,
        }
    }

    /// Builds the agent, its provider, and its tools from configuration.
    ///
    /// # Errors
    ///
    /// Returns a config error if the LLM credential is missing, or an agent
    /// error if the provider is unknown.
    pub fn from_app(app: &AppConfig, credentials: &Credentials) -> Result<Self> {
        credentials.require_llm()?;
        let config = AgentConfig::from_app(app, credentials)?;
        debug!(?config, "agent configuration resolved");

        let provider = create_provider(&config)?;
        let web = WebSearchTool::from_config(
            &app.web_search_config,
            credentials.search_api_key.as_deref(),
        );
        let tools = MedicalTools::new(app, &provider, &config, web);
        Ok(Self::new(provider, &config, tools))
    }

    /// The tool registry.
    #[must_use]
    pub const fn tools(&self) -> &MedicalTools {
        &self.tools
    }

    /// Answers a single question.
    #[allow(clippy::future_not_send)]
    pub async fn query(&self, input: &str) -> String {
        self.query_with_history(&[], input).await
    }

    /// Answers a question with earlier conversation turns as context.
    #[allow(clippy::future_not_send)]
    pub async fn query_with_history(&self, history: &[ChatMessage], input: &str) -> String {
        if input.trim().is_empty() {
            return "❌ Error processing query: query cannot be empty".to_string();
        }

        match execute_with_tools(
            &self.router,
            self.provider.as_ref(),
            history,
            input,
            &self.tools,
        )
        .await
        {
            Ok(response) if response.content.trim().is_empty() => {
                "No response generated".to_string()
            }
            Ok(response) => {
                debug!(
                    total_tokens = response.usage.total_tokens,
                    finish_reason = response.finish_reason.as_deref().unwrap_or("none"),
                    "router agent answered"
                );
                response.content
            }
            Err(e) => {
                warn!(error = %e, "router agent failed, using keyword routing");
                self.fallback_route(input).await
            }
        }
    }

    /// Routes by keyword and returns the chosen tool's output verbatim.
    #[allow(clippy::future_not_send)]
    pub async fn fallback_route(&self, input: &str) -> String {
        let route = classify(input);
        debug!(%route, "fallback route");
        match self.tools.invoke(route.tool_name(), input).await {
            Some(output) => output,
            None => WebSearchTool::fallback(input),
        }
    }

    /// Help text describing the tools.
    #[must_use]
    pub const fn tools_info() -> &'static str {
        TOOLS_INFO
    }
}
