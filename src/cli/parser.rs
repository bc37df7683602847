//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_PATH;

/// medagent: medical multi-tool AI agent.
///
/// Answers statistical questions from the heart disease, cancer, and
/// diabetes datasets, and general medical questions from web search.
#[derive(Parser, Debug)]
#[command(name = "medagent")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the YAML configuration file.
    ///
    /// Defaults to `configs/app_config.yml` in the current directory.
    #[arg(short, long, env = "MEDAGENT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the SQLite databases from the CSV datasets.
    ///
    /// Existing tables are replaced. One domain failing does not stop the others.
    #[command(after_help = r#"Examples:
  medagent setup                          # Provision all three databases
  medagent --config ./my.yml setup        # Use a different configuration
  medagent --format json setup | jq '.domains'
"#)]
    Setup,

    /// Ask a single question.
    #[command(after_help = r#"Examples:
  medagent ask "What is the average age of heart disease patients?"
  medagent ask "What are the symptoms of type 2 diabetes?"
  medagent ask --direct "How many cancer cases are in the dataset?"
"#)]
    Ask {
        /// The question.
        query: String,

        /// Skip the routing agent and use keyword routing.
        #[arg(short, long)]
        direct: bool,
    },

    /// Start an interactive chat session.
    Chat,

    /// Show where keyword routing would send a question.
    #[command(after_help = r#"Examples:
  medagent route "average glucose of diabetes patients"   # database:diabetes
  medagent route "what causes migraines?"                 # web
"#)]
    Route {
        /// The question.
        query: String,
    },

    /// Run the medical web search tool directly.
    #[command(after_help = r#"Examples:
  medagent search "treatment options for hypertension"
  TAVILY_API_KEY= medagent search "diabetes"             # canned answer
"#)]
    Search {
        /// The search query.
        query: String,
    },

    /// List the available tools and example queries.
    Tools,

    /// Show configuration, credential, and database status.
    Status,
}

impl Cli {
    /// Returns the config path, using the default if not specified.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_config_path() {
        let cli = Cli {
            config: None,
            verbose: false,
            format: "text".to_string(),
            command: Commands::Status,
        };
        assert_eq!(cli.config_path(), PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn test_custom_config_path() {
        let cli = Cli {
            config: Some(PathBuf::from("/custom/app.yml")),
            verbose: false,
            format: "text".to_string(),
            command: Commands::Status,
        };
        assert_eq!(cli.config_path(), PathBuf::from("/custom/app.yml"));
    }

    #[test]
    fn test_ask_direct_flag() {
        let cli = Cli::try_parse_from(["medagent", "ask", "--direct", "how many patients"])
            .unwrap_or_else(|e| unreachable!("{e}"));
        match cli.command {
            Commands::Ask { query, direct } => {
                assert_eq!(query, "how many patients");
                assert!(direct);
            }
            other => unreachable!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_format_after_subcommand() {
        let cli = Cli::try_parse_from(["medagent", "route", "q", "--format", "json"])
            .unwrap_or_else(|e| unreachable!("{e}"));
        assert_eq!(cli.format, "json");
    }

    #[test]
    fn test_missing_query_rejected() {
        assert!(Cli::try_parse_from(["medagent", "ask"]).is_err());
    }
}
