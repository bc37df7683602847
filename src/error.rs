//! Error types for medagent.
//!
//! Each layer has its own error enum; [`Error`] unifies them for the CLI.
//! Failures that the user should see inline in a conversation (missing
//! database, upstream agent or search failure) never reach this module as
//! hard errors: the tools convert them to formatted strings.

use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded or is incomplete.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Agent pipeline failure.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// CLI command failure.
    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Errors raised while loading configuration or credentials.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for [`crate::config::AppConfig`].
    #[error("failed to parse config: {message}")]
    Parse {
        /// Parser message.
        message: String,
    },

    /// A configuration value failed validation.
    #[error("invalid config value `{field}`: {message}")]
    Invalid {
        /// Dotted path of the offending field.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// A required credential is not set in the environment.
    #[error("{var} environment variable not set. Please provide a valid token.")]
    CredentialMissing {
        /// Environment variable name.
        var: String,
    },
}

/// Errors raised while materializing a CSV file into SQLite.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The CSV source file does not exist.
    #[error("{path} not found. Please ensure the file exists in the datasets directory.")]
    SourceMissing {
        /// Expected CSV path.
        path: PathBuf,
    },

    /// The CSV file could not be parsed.
    #[error("failed to read CSV {path}: {source}")]
    Csv {
        /// CSV path.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: csv::Error,
    },

    /// The CSV file has no header row.
    #[error("CSV {path} has no columns")]
    NoColumns {
        /// CSV path.
        path: PathBuf,
    },

    /// The output directory could not be created.
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        /// Directory path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A SQLite operation failed.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Errors from the agent framework.
#[derive(Debug, Error)]
pub enum AgentError {
    /// No API key was configured.
    #[error("API key missing: set GITHUB_TOKEN or configure llm_config.api_key_env")]
    ApiKeyMissing,

    /// The provider returned an error.
    #[error("API request failed: {message}")]
    ApiRequest {
        /// Provider error message.
        message: String,
        /// HTTP status when known.
        status: Option<u16>,
    },

    /// A tool call could not be executed.
    #[error("tool `{name}` failed: {message}")]
    ToolExecution {
        /// Tool name.
        name: String,
        /// Failure details.
        message: String,
    },

    /// The tool-calling loop hit its iteration limit.
    #[error("agent stopped due to max iterations ({max_iterations})")]
    ToolLoopExceeded {
        /// Configured limit.
        max_iterations: usize,
    },

    /// The configured provider name is unknown.
    #[error("unsupported provider: {name}")]
    UnsupportedProvider {
        /// Provider name.
        name: String,
    },
}

/// Errors from CLI command execution.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command could not complete.
    #[error("{0}")]
    ExecutionFailed(String),
}
