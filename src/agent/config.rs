//! Agent configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → application config
//! → environment variables → defaults.

use crate::config::{AppConfig, Credentials, DEFAULT_BASE_URL};
use crate::error::AgentError;

/// Default model identifier.
const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Default maximum tokens per completion.
const DEFAULT_MAX_TOKENS: u32 = 1000;
/// Default routing-agent tool-calling round-trips.
const DEFAULT_MAX_AGENT_ITERATIONS: usize = 5;
/// Default SQL-agent tool-calling round-trips.
const DEFAULT_MAX_SQL_ITERATIONS: usize = 10;

/// Configuration for the agent system.
#[derive(Clone)]
pub struct AgentConfig {
    /// LLM provider name (e.g., "openai").
    pub provider: String,
    /// API key for the provider.
    pub api_key: String,
    /// Optional base URL override (for proxies or compatible APIs).
    pub base_url: Option<String>,
    /// Model used by every agent.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum tokens per response.
    pub max_tokens: u32,
    /// Round-trips allowed to the routing agent before fallback routing.
    pub max_agent_iterations: usize,
    /// Round-trips allowed to a SQL agent before it gives up.
    pub max_sql_iterations: usize,
    /// Role text for the routing agent's system prompt.
    pub agent_system_role: String,
    /// Role text for the SQL agent's system prompt.
    pub db_agent_system_role: String,
}

impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_agent_iterations", &self.max_agent_iterations)
            .field("max_sql_iterations", &self.max_sql_iterations)
            .finish_non_exhaustive()
    }
}

impl AgentConfig {
    /// Creates a new builder for `AgentConfig`.
    #[must_use]
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::default()
    }

    /// Creates configuration from the application config and credentials.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no LLM credential is set.
    pub fn from_app(app: &AppConfig, credentials: &Credentials) -> Result<Self, AgentError> {
        let llm = &app.llm_config;
        let mut builder = Self::builder()
            .base_url(&llm.base_url)
            .model(&llm.model_name)
            .temperature(llm.temperature)
            .max_tokens(llm.max_tokens)
            .max_agent_iterations(llm.max_agent_iterations)
            .max_sql_iterations(llm.max_sql_iterations)
            .agent_system_role(&llm.agent_system_role)
            .db_agent_system_role(&llm.db_agent_system_role);
        if let Some(key) = &credentials.llm_api_key {
            builder = builder.api_key(key);
        }
        builder.from_env().build()
    }
}

/// Builder for [`AgentConfig`].
#[derive(Debug, Clone, Default)]
pub struct AgentConfigBuilder {
    provider: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    max_agent_iterations: Option<usize>,
    max_sql_iterations: Option<usize>,
    agent_system_role: Option<String>,
    db_agent_system_role: Option<String>,
}

impl AgentConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.provider.is_none() {
            self.provider = std::env::var("MEDAGENT_PROVIDER").ok();
        }
        if self.api_key.is_none() {
            self.api_key = std::env::var("GITHUB_TOKEN")
                .or_else(|_| std::env::var("OPENAI_API_KEY"))
                .ok()
                .filter(|k| !k.trim().is_empty());
        }
        if self.base_url.is_none() {
            self.base_url = std::env::var("OPENAI_BASE_URL").ok();
        }
        if self.model.is_none() {
            self.model = std::env::var("MEDAGENT_MODEL").ok();
        }
        self
    }

    /// Sets the LLM provider name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL override.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub const fn temperature(mut self, t: f32) -> Self {
        self.temperature = Some(t);
        self
    }

    /// Sets the maximum tokens per response.
    #[must_use]
    pub const fn max_tokens(mut self, n: u32) -> Self {
        self.max_tokens = Some(n);
        self
    }

    /// Sets the routing agent's iteration cap.
    #[must_use]
    pub const fn max_agent_iterations(mut self, n: usize) -> Self {
        self.max_agent_iterations = Some(n);
        self
    }

    /// Sets the SQL agent's iteration cap.
    #[must_use]
    pub const fn max_sql_iterations(mut self, n: usize) -> Self {
        self.max_sql_iterations = Some(n);
        self
    }

    /// Sets the routing agent's role text.
    #[must_use]
    pub fn agent_system_role(mut self, role: impl Into<String>) -> Self {
        self.agent_system_role = Some(role.into());
        self
    }

    /// Sets the SQL agent's role text.
    #[must_use]
    pub fn db_agent_system_role(mut self, role: impl Into<String>) -> Self {
        self.db_agent_system_role = Some(role.into());
        self
    }

    /// Builds the [`AgentConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key was set.
    pub fn build(self) -> Result<AgentConfig, AgentError> {
        let api_key = self.api_key.ok_or(AgentError::ApiKeyMissing)?;

        Ok(AgentConfig {
            provider: self.provider.unwrap_or_else(|| "openai".to_string()),
            api_key,
            base_url: Some(self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string())),
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: self.temperature.unwrap_or(0.0),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            max_agent_iterations: self
                .max_agent_iterations
                .unwrap_or(DEFAULT_MAX_AGENT_ITERATIONS)
                .max(1),
            max_sql_iterations: self
                .max_sql_iterations
                .unwrap_or(DEFAULT_MAX_SQL_ITERATIONS)
                .max(1),
            agent_system_role: self.agent_system_role.unwrap_or_else(|| {
                "You are a medical AI assistant that answers questions about medical \
                 datasets and general medical knowledge."
                    .to_string()
            }),
            db_agent_system_role: self.db_agent_system_role.unwrap_or_else(|| {
                "You are a SQL expert that answers questions about a medical dataset.".to_string()
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::sample_config;
    use std::path::Path;

    #[test]
    fn test_builder_defaults() {
        let config = AgentConfig::builder()
            .api_key("test-key")
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.provider, "openai");
        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.base_url.as_deref(), Some(DEFAULT_BASE_URL));
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_agent_iterations, DEFAULT_MAX_AGENT_ITERATIONS);
        assert_eq!(config.max_sql_iterations, DEFAULT_MAX_SQL_ITERATIONS);
    }

    #[test]
    fn test_builder_missing_api_key() {
        let result = AgentConfig::builder().build();
        assert!(matches!(result, Err(AgentError::ApiKeyMissing)));
    }

    #[test]
    fn test_builder_custom_values() {
        let config = AgentConfig::builder()
            .api_key("key")
            .provider("custom")
            .model("gpt-4o")
            .temperature(0.2)
            .max_tokens(500)
            .max_agent_iterations(0)
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.provider, "custom");
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.max_tokens, 500);
        // a zero cap would never let the model answer
        assert_eq!(config.max_agent_iterations, 1);
    }

    #[test]
    fn test_from_app_uses_yaml_values() {
        let app = sample_config(Path::new("csv"), Path::new("sql"));
        let creds = Credentials::new(Some("tok".to_string()), None);
        let config = AgentConfig::from_app(&app, &creds).unwrap_or_else(|_| unreachable!());
        assert_eq!(config.api_key, "tok");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.agent_system_role, "You are a medical assistant.");
        assert_eq!(config.db_agent_system_role, "You are a SQL expert.");
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = AgentConfig::builder()
            .api_key("super-secret")
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
