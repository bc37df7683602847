//! Routing agent: picks a medical tool for each question.

use super::config::AgentConfig;
use super::prompt::build_router_system_prompt;
use super::tool::{ToolDefinition, ToolSet};
use super::traits::Agent;

/// Agent offered the five medical tools.
///
/// The model decides between the domain databases and web search, then
/// writes the final answer from the tool output.
pub struct RouterAgent {
    model: String,
    system_prompt: String,
    temperature: f32,
    max_tokens: u32,
    max_iterations: usize,
}

impl RouterAgent {
    /// Creates a routing agent.
    #[must_use]
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            model: config.model.clone(),
            system_prompt: build_router_system_prompt(&config.agent_system_role),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            max_iterations: config.max_agent_iterations,
        }
    }
}

impl Agent for RouterAgent {
    fn name(&self) -> &'static str {
        "router"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn temperature(&self) -> f32 {
        self.temperature
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    fn tools(&self) -> Vec<ToolDefinition> {
        ToolSet::medical_tools().definitions().to_vec()
    }

    fn max_tool_iterations(&self) -> usize {
        self.max_iterations
    }
}
