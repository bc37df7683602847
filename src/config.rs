//! Application configuration.
//!
//! [`AppConfig`] is read once from a YAML file and passed by reference to
//! every component that needs it. Secrets never live in the file: the file
//! names the environment variables that hold them, and [`Credentials`]
//! resolves those at startup.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::Domain;
use crate::error::ConfigError;

/// Default configuration file path, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "configs/app_config.yml";

/// Default OpenAI-compatible endpoint (GitHub Models).
pub const DEFAULT_BASE_URL: &str = "https://models.inference.ai.azure.com";

static IDENTIFIER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").ok());

/// Top-level configuration read from `app_config.yml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base directories for datasets and databases.
    pub directories: Directories,
    /// Per-domain source, database, and table settings.
    pub database_config: DatabaseConfig,
    /// LLM model and prompt settings.
    pub llm_config: LlmConfig,
    /// Web search settings.
    #[serde(default)]
    pub web_search_config: WebSearchConfig,
}

/// Directory layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Directories {
    /// Where the source CSV files live.
    pub datasets_directory: PathBuf,
    /// Where the SQLite database files are written.
    pub data_directory: PathBuf,
}

/// Domain configuration triples.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Heart disease dataset.
    pub heart_disease: DomainConfig,
    /// Cancer dataset.
    pub cancer: DomainConfig,
    /// Diabetes dataset.
    pub diabetes: DomainConfig,
}

/// Source CSV, target database, and target table for one domain.
///
/// Relative `source` paths resolve against `datasets_directory`, relative
/// `database` paths against `data_directory`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainConfig {
    /// CSV file.
    pub source: PathBuf,
    /// SQLite database file.
    pub database: PathBuf,
    /// Table name inside the database.
    pub table_name: String,
}

/// LLM settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model identifier.
    pub model_name: String,
    /// Sampling temperature.
    #[serde(default)]
    pub temperature: f32,
    /// Maximum tokens per completion.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// OpenAI-compatible endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Environment variable holding the LLM credential.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Role text prepended to the routing rules.
    pub agent_system_role: String,
    /// Role text prepended to the SQL agent rules.
    pub db_agent_system_role: String,
    /// Tool-calling round-trips allowed to the routing agent.
    #[serde(default = "default_agent_iterations")]
    pub max_agent_iterations: usize,
    /// Tool-calling round-trips allowed to each SQL agent.
    #[serde(default = "default_sql_iterations")]
    pub max_sql_iterations: usize,
}

/// Web search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSearchConfig {
    /// Environment variable holding the search API key.
    #[serde(default = "default_search_key_env")]
    pub tavily_api_key_env: String,
    /// Result cap per search.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Topic filter sent to the search API.
    #[serde(default = "default_topic")]
    pub topic: String,
    /// Search depth sent to the search API.
    #[serde(default = "default_search_depth")]
    pub search_depth: String,
    /// HTTP timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            tavily_api_key_env: default_search_key_env(),
            max_results: default_max_results(),
            topic: default_topic(),
            search_depth: default_search_depth(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_max_tokens() -> u32 {
    1000
}
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_api_key_env() -> String {
    "GITHUB_TOKEN".to_string()
}
const fn default_agent_iterations() -> usize {
    5
}
const fn default_sql_iterations() -> usize {
    10
}
fn default_search_key_env() -> String {
    "TAVILY_API_KEY".to_string()
}
const fn default_max_results() -> usize {
    5
}
fn default_topic() -> String {
    "health".to_string()
}
fn default_search_depth() -> String {
    "advanced".to_string()
}
const fn default_timeout_secs() -> u64 {
    30
}

/// A domain's configuration with paths resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDomain {
    /// Which domain.
    pub domain: Domain,
    /// CSV source file.
    pub source: PathBuf,
    /// SQLite database file.
    pub database: PathBuf,
    /// Table name.
    pub table: String,
}

impl AppConfig {
    /// Loads and validates configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read,
    /// [`ConfigError::Parse`] for malformed YAML, and
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Parses and validates configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] or [`ConfigError::Invalid`].
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for domain in Domain::ALL {
            let table = &self.domain_config(domain).table_name;
            let valid = IDENTIFIER.as_ref().is_some_and(|re| re.is_match(table));
            if !valid {
                return Err(ConfigError::Invalid {
                    field: format!("database_config.{}.table_name", domain.key()),
                    message: format!("`{table}` is not a valid SQL identifier"),
                });
            }
        }
        if self.web_search_config.max_results == 0 {
            return Err(ConfigError::Invalid {
                field: "web_search_config.max_results".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.llm_config.max_agent_iterations == 0 || self.llm_config.max_sql_iterations == 0 {
            return Err(ConfigError::Invalid {
                field: "llm_config.max_*_iterations".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Raw configuration for a domain.
    #[must_use]
    pub const fn domain_config(&self, domain: Domain) -> &DomainConfig {
        match domain {
            Domain::Heart => &self.database_config.heart_disease,
            Domain::Cancer => &self.database_config.cancer,
            Domain::Diabetes => &self.database_config.diabetes,
        }
    }

    /// Configuration for a domain with relative paths resolved.
    #[must_use]
    pub fn domain(&self, domain: Domain) -> ResolvedDomain {
        let cfg = self.domain_config(domain);
        ResolvedDomain {
            domain,
            source: self.directories.datasets_directory.join(&cfg.source),
            database: self.directories.data_directory.join(&cfg.database),
            table: cfg.table_name.clone(),
        }
    }
}

/// Secrets resolved from the environment.
#[derive(Clone, Default)]
pub struct Credentials {
    /// LLM endpoint credential (required for agent commands).
    pub llm_api_key: Option<String>,
    /// Search API credential (optional).
    pub search_api_key: Option<String>,
    llm_var: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("llm_api_key", &self.llm_api_key.as_ref().map(|_| "<set>"))
            .field("search_api_key", &self.search_api_key.as_ref().map(|_| "<set>"))
            .finish()
    }
}

impl Credentials {
    /// Reads the credentials named in the configuration from the environment.
    ///
    /// Empty values count as unset.
    #[must_use]
    pub fn from_env(config: &AppConfig) -> Self {
        let read = |var: &str| std::env::var(var).ok().filter(|v| !v.trim().is_empty());
        Self {
            llm_api_key: read(&config.llm_config.api_key_env),
            search_api_key: read(&config.web_search_config.tavily_api_key_env),
            llm_var: config.llm_config.api_key_env.clone(),
        }
    }

    /// Builds credentials from explicit values.
    #[must_use]
    pub fn new(llm_api_key: Option<String>, search_api_key: Option<String>) -> Self {
        Self {
            llm_api_key,
            search_api_key,
            llm_var: default_api_key_env(),
        }
    }

    /// Returns the LLM credential.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::CredentialMissing`] if it is not set.
    pub fn require_llm(&self) -> Result<&str, ConfigError> {
        self.llm_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::CredentialMissing {
                var: self.llm_var.clone(),
            })
    }
}
