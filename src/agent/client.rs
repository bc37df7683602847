//! Provider factory.
//!
//! One provider instance is built per process and shared through an
//! [`Arc`] by the routing agent and the three domain tools.

use std::sync::Arc;

use tracing::debug;

use crate::agent::config::AgentConfig;
use crate::agent::provider::LlmProvider;
use crate::agent::providers::OpenAiProvider;
use crate::error::AgentError;

/// Provider names accepted in configuration.
///
/// `github` is GitHub Models, which speaks the `OpenAI` wire format.
pub const SUPPORTED_PROVIDERS: [&str; 2] = ["openai", "github"];

/// Builds the shared [`LlmProvider`] named by `config.provider`.
///
/// Names are matched case-insensitively.
///
/// # Errors
///
/// Returns [`AgentError::UnsupportedProvider`] for names not in
/// [`SUPPORTED_PROVIDERS`].
pub fn create_provider(config: &AgentConfig) -> Result<Arc<dyn LlmProvider>, AgentError> {
    let name = config.provider.to_ascii_lowercase();
    if !SUPPORTED_PROVIDERS.contains(&name.as_str()) {
        return Err(AgentError::UnsupportedProvider {
            name: config.provider.clone(),
        });
    }

    debug!(
        provider = %name,
        model = %config.model,
        base_url = config.base_url.as_deref().unwrap_or("default"),
        "creating LLM provider"
    );
    Ok(Arc::new(OpenAiProvider::new(config)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn config(provider: &str) -> AgentConfig {
        AgentConfig::builder()
            .api_key("test")
            .provider(provider)
            .build()
            .unwrap_or_else(|_| unreachable!())
    }

    #[test_case("openai" ; "openai")]
    #[test_case("github" ; "github models")]
    #[test_case("GitHub" ; "mixed case")]
    fn test_supported_providers(name: &str) {
        let provider = create_provider(&config(name)).unwrap_or_else(|_| unreachable!());
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_unknown_provider_rejected() {
        match create_provider(&config("anthropic")) {
            Err(AgentError::UnsupportedProvider { name }) => assert_eq!(name, "anthropic"),
            Err(other) => unreachable!("unexpected error: {other}"),
            Ok(_) => unreachable!("unknown provider accepted"),
        }
    }
}
