//! Domain database tools.
//!
//! A [`DomainTool`] answers a natural-language question about one dataset by
//! running a [`SqlAgent`] against that domain's SQLite file. Failures are
//! never raised: they come back as a [`DomainAnswer`] variant and are
//! rendered as a user-visible message.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::agent::config::AgentConfig;
use crate::agent::prompt::build_domain_question;
use crate::agent::provider::LlmProvider;
use crate::agent::sql::{SqlAgent, SqlToolExecutor};
use crate::agent::traits::execute_with_tools;
use crate::config::ResolvedDomain;
use crate::core::Domain;

/// Outcome of asking a domain database a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainAnswer {
    /// The SQL agent produced an answer.
    Answer(String),
    /// The database file does not exist.
    NotFound {
        /// Missing database file.
        resource: PathBuf,
    },
    /// The database or the SQL agent failed.
    UpstreamFailure {
        /// Failure details.
        detail: String,
    },
}

impl DomainAnswer {
    /// Renders the answer as shown to the user.
    #[must_use]
    pub fn render(&self, domain: Domain) -> String {
        match self {
            Self::Answer(text) => format!("{} **{} Data**: {text}", domain.emoji(), domain.title()),
            Self::NotFound { resource } => format!(
                "❌ {} database not found at {}. Please run database setup first.",
                domain.label(),
                resource.display()
            ),
            Self::UpstreamFailure { detail } => format!(
                "❌ Error querying {} database: {detail}",
                domain.label().to_lowercase()
            ),
        }
    }
}

/// Question-answering tool bound to one domain database.
pub struct DomainTool {
    domain: Domain,
    database: PathBuf,
    table: String,
    provider: Arc<dyn LlmProvider>,
    config: AgentConfig,
}

impl DomainTool {
    /// Creates a tool for a resolved domain.
    ///
    /// The database file may not exist yet; it is checked on every question.
    #[must_use]
    pub fn new(
        resolved: &ResolvedDomain,
        provider: Arc<dyn LlmProvider>,
        config: AgentConfig,
    ) -> Self {
        Self {
            domain: resolved.domain,
            database: resolved.database.clone(),
            table: resolved.table.clone(),
            provider,
            config,
        }
    }

    /// Domain this tool answers for.
    #[must_use]
    pub const fn domain(&self) -> Domain {
        self.domain
    }

    /// Answers a question.
    #[allow(clippy::future_not_send)]
    pub async fn answer(&self, question: &str) -> DomainAnswer {
        if !self.database.is_file() {
            debug!(domain = %self.domain, path = %self.database.display(), "database missing");
            return DomainAnswer::NotFound {
                resource: self.database.clone(),
            };
        }

        let executor = match SqlToolExecutor::open(&self.database) {
            Ok(executor) => executor,
            Err(e) => {
                warn!(domain = %self.domain, error = %e, "failed to open database");
                return DomainAnswer::UpstreamFailure {
                    detail: e.to_string(),
                };
            }
        };

        let agent = SqlAgent::new(&self.config, self.domain, &self.table);
        let prompt = build_domain_question(self.domain, question);
        match execute_with_tools(&agent, self.provider.as_ref(), &[], &prompt, &executor).await {
            Ok(response) if response.content.trim().is_empty() => {
                DomainAnswer::Answer("No response generated".to_string())
            }
            Ok(response) => {
                debug!(
                    domain = %self.domain,
                    total_tokens = response.usage.total_tokens,
                    "domain question answered"
                );
                DomainAnswer::Answer(response.content)
            }
            Err(e) => {
                warn!(domain = %self.domain, error = %e, "sql agent failed");
                DomainAnswer::UpstreamFailure {
                    detail: e.to_string(),
                }
            }
        }
    }

    /// Answers a question and renders the result.
    #[allow(clippy::future_not_send)]
    pub async fn query(&self, question: &str) -> String {
        self.answer(question).await.render(self.domain)
    }
}
