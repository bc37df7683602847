//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

use std::fmt::Write as FmtWrite;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::agent::orchestrator::{MedicalAgent, TOOLS_INFO};
use crate::chat::{ChatSession, run_repl};
use crate::cli::output::OutputFormat;
use crate::cli::parser::{Cli, Commands};
use crate::config::{AppConfig, Credentials};
use crate::core::{Domain, classify, detect_domain, is_statistical};
use crate::error::{CommandError, Result};
use crate::provision::Provisioner;
use crate::tools::{TOOL_NAMES, WebSearchTool};

/// Executes the CLI command.
///
/// # Arguments
///
/// * `cli` - Parsed CLI arguments.
///
/// # Returns
///
/// Result with output string on success.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded, a required
/// credential is missing, or the command fails to execute.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);
    let config_path = cli.config_path();

    match &cli.command {
        Commands::Setup => cmd_setup(&config_path, format),
        Commands::Ask { query, direct } => cmd_ask(&config_path, query, *direct, format),
        Commands::Chat => cmd_chat(&config_path),
        Commands::Route { query } => Ok(cmd_route(query, format)),
        Commands::Search { query } => cmd_search(&config_path, query, format),
        Commands::Tools => Ok(cmd_tools(format)),
        Commands::Status => cmd_status(&config_path, format),
    }
}

fn load_config(path: &Path) -> Result<AppConfig> {
    let config = AppConfig::load(path)?;
    debug!(path = %path.display(), "configuration loaded");
    Ok(config)
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to create async runtime: {e}")).into()
    })
}

fn cmd_setup(config_path: &Path, format: OutputFormat) -> Result<String> {
    let config = load_config(config_path)?;
    let report = Provisioner::new(&config).provision_all();

    match format {
        OutputFormat::Text => Ok(format!("Setting up medical databases...\n{report}\n")),
        OutputFormat::Json => {
            let domains: Vec<_> = report
                .outcomes()
                .map(|(domain, outcome)| match outcome {
                    Ok(summary) => serde_json::json!({
                        "domain": domain.key(),
                        "success": true,
                        "table": summary.table,
                        "database": summary.database.to_string_lossy(),
                        "rows": summary.rows,
                        "columns": summary.columns.len(),
                    }),
                    Err(e) => serde_json::json!({
                        "domain": domain.key(),
                        "success": false,
                        "error": e.to_string(),
                    }),
                })
                .collect();
            let json = serde_json::json!({
                "domains": domains,
                "succeeded": report.succeeded(),
                "total": report.total(),
            });
            Ok(format.to_json(&json))
        }
    }
}

fn cmd_ask(config_path: &Path, query: &str, direct: bool, format: OutputFormat) -> Result<String> {
    let config = load_config(config_path)?;
    let credentials = Credentials::from_env(&config);
    let agent = MedicalAgent::from_app(&config, &credentials)?;

    let rt = runtime()?;
    let answer = rt.block_on(async {
        if direct {
            agent.fallback_route(query).await
        } else {
            agent.query(query).await
        }
    });

    match format {
        OutputFormat::Text => Ok(format!("{answer}\n")),
        OutputFormat::Json => {
            let json = serde_json::json!({
                "query": query,
                "direct": direct,
                "answer": answer,
            });
            Ok(format.to_json(&json))
        }
    }
}

fn cmd_chat(config_path: &Path) -> Result<String> {
    let config = load_config(config_path)?;
    let credentials = Credentials::from_env(&config);
    let agent = MedicalAgent::from_app(&config, &credentials)?;
    let provisioner = Provisioner::new(&config);
    let mut session = ChatSession::new();

    let rt = runtime()?;
    rt.block_on(run_repl(
        &mut session,
        &agent,
        &provisioner,
        io::stdin().lock(),
        io::stdout().lock(),
    ))
    .map_err(|e| CommandError::ExecutionFailed(format!("Chat session error: {e}")))?;

    Ok(String::new())
}

fn cmd_route(query: &str, format: OutputFormat) -> String {
    let route = classify(query);
    let statistical = is_statistical(query);
    let matched = detect_domain(query);
    let defaulted = statistical && matched.is_none();

    match format {
        OutputFormat::Text => {
            let reason = match (statistical, matched) {
                (false, _) => "no statistical keyword".to_string(),
                (true, Some(domain)) => format!("statistical, matched {} keyword", domain.key()),
                (true, None) => "statistical, no domain keyword (default)".to_string(),
            };
            format!("{route} -> {} ({reason})\n", route.tool_name())
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "query": query,
                "route": route.to_string(),
                "tool": route.tool_name(),
                "statistical": statistical,
                "matched_domain": matched.map(Domain::key),
                "defaulted": defaulted,
            });
            format.to_json(&json)
        }
    }
}

fn cmd_search(config_path: &Path, query: &str, format: OutputFormat) -> Result<String> {
    let config = load_config(config_path)?;
    let credentials = Credentials::from_env(&config);
    let tool = WebSearchTool::from_config(
        &config.web_search_config,
        credentials.search_api_key.as_deref(),
    );
    let live = tool.is_live();

    let rt = runtime()?;
    let answer = rt.block_on(tool.search(query));

    match format {
        OutputFormat::Text => Ok(format!("{answer}\n")),
        OutputFormat::Json => {
            let json = serde_json::json!({
                "query": query,
                "live": live,
                "answer": answer,
            });
            Ok(format.to_json(&json))
        }
    }
}

fn cmd_tools(format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => TOOLS_INFO.to_string(),
        OutputFormat::Json => {
            let json = serde_json::json!({
                "tools": TOOL_NAMES,
                "info": TOOLS_INFO,
            });
            format.to_json(&json)
        }
    }
}

fn cmd_status(config_path: &Path, format: OutputFormat) -> Result<String> {
    let config = load_config(config_path)?;
    let credentials = Credentials::from_env(&config);
    let llm_var = &config.llm_config.api_key_env;
    let search_var = &config.web_search_config.tavily_api_key_env;

    match format {
        OutputFormat::Text => {
            let mark = |present: bool| if present { "✅" } else { "❌" };
            let mut out = String::new();
            let _ = writeln!(out, "Config: {}", config_path.display());
            let _ = writeln!(out, "Model: {}", config.llm_config.model_name);
            out.push_str("\nCredentials:\n");
            let _ = writeln!(
                out,
                "  {} {llm_var} (required for ask and chat)",
                mark(credentials.llm_api_key.is_some())
            );
            let _ = writeln!(
                out,
                "  {} {search_var} (optional, enables live web search)",
                mark(credentials.search_api_key.is_some())
            );
            out.push_str("\nDatasets:\n");
            for domain in Domain::ALL {
                let resolved = config.domain(domain);
                let _ = writeln!(out, "  {} {}", domain.emoji(), domain.title());
                let _ = writeln!(
                    out,
                    "    {} source:   {}",
                    mark(resolved.source.is_file()),
                    resolved.source.display()
                );
                let _ = writeln!(
                    out,
                    "    {} database: {}",
                    mark(resolved.database.is_file()),
                    resolved.database.display()
                );
            }
            Ok(out)
        }
        OutputFormat::Json => {
            let domains: Vec<_> = Domain::ALL
                .into_iter()
                .map(|domain| {
                    let resolved = config.domain(domain);
                    serde_json::json!({
                        "domain": domain.key(),
                        "table": resolved.table,
                        "source": resolved.source.to_string_lossy(),
                        "source_exists": resolved.source.is_file(),
                        "database": resolved.database.to_string_lossy(),
                        "database_exists": resolved.database.is_file(),
                    })
                })
                .collect();
            let json = serde_json::json!({
                "config": config_path.to_string_lossy(),
                "model": config.llm_config.model_name,
                "credentials": {
                    llm_var.as_str(): credentials.llm_api_key.is_some(),
                    search_var.as_str(): credentials.search_api_key.is_some(),
                },
                "domains": domains,
            });
            Ok(format.to_json(&json))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::sample_yaml;
    use crate::error::{ConfigError, Error};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn cli(config: Option<PathBuf>, format: &str, command: Commands) -> Cli {
        Cli {
            config,
            verbose: false,
            format: format.to_string(),
            command,
        }
    }

    fn write_config(dir: &TempDir) -> PathBuf {
        let csv = dir.path().join("csv");
        std::fs::create_dir_all(&csv).unwrap_or_else(|e| unreachable!("{e}"));
        std::fs::write(csv.join("heart.csv"), "age,sex\n63,1\n41,0\n")
            .unwrap_or_else(|e| unreachable!("{e}"));
        let path = dir.path().join("app_config.yml");
        std::fs::write(&path, sample_yaml(&csv, &dir.path().join("sql")))
            .unwrap_or_else(|e| unreachable!("{e}"));
        path
    }

    #[test]
    fn test_route_text() {
        let out = execute(&cli(
            None,
            "text",
            Commands::Route {
                query: "average glucose of diabetes patients".to_string(),
            },
        ))
        .unwrap_or_else(|e| unreachable!("{e}"));
        assert_eq!(
            out,
            "database:diabetes -> diabetes_db_tool (statistical, matched diabetes keyword)\n"
        );
    }

    #[test]
    fn test_route_explains_default() {
        let out = execute(&cli(
            None,
            "json",
            Commands::Route {
                query: "how many records are there".to_string(),
            },
        ))
        .unwrap_or_else(|e| unreachable!("{e}"));
        let value: serde_json::Value =
            serde_json::from_str(&out).unwrap_or_else(|_| unreachable!());
        assert_eq!(value["route"], "database:heart_disease");
        assert_eq!(value["statistical"], true);
        assert!(value["matched_domain"].is_null());
        assert_eq!(value["defaulted"], true);
    }

    #[test]
    fn test_route_json() {
        let out = execute(&cli(
            None,
            "json",
            Commands::Route {
                query: "what causes migraines?".to_string(),
            },
        ))
        .unwrap_or_else(|e| unreachable!("{e}"));
        let value: serde_json::Value =
            serde_json::from_str(&out).unwrap_or_else(|_| unreachable!());
        assert_eq!(value["route"], "web");
        assert_eq!(value["tool"], "medical_web_search_tool");
        assert_eq!(value["statistical"], false);
        assert_eq!(value["defaulted"], false);
    }

    #[test]
    fn test_tools_json_lists_names() {
        let out = execute(&cli(None, "json", Commands::Tools)).unwrap_or_else(|e| unreachable!("{e}"));
        let value: serde_json::Value =
            serde_json::from_str(&out).unwrap_or_else(|_| unreachable!());
        assert_eq!(value["tools"].as_array().map(Vec::len), Some(5));
    }

    #[test]
    fn test_setup_reports_partial_success() {
        let dir = TempDir::new().unwrap_or_else(|e| unreachable!("{e}"));
        let path = write_config(&dir);
        let out = execute(&cli(Some(path), "text", Commands::Setup))
            .unwrap_or_else(|e| unreachable!("{e}"));
        assert!(out.contains("✅ Heart Disease DB ready (2 rows, 2 columns)"));
        assert!(out.contains("❌ Diabetes DB failed"));
        assert!(out.ends_with("1/3 successful\n"));
        assert!(dir.path().join("sql/heart_disease.db").is_file());
    }

    #[test]
    fn test_setup_json() {
        let dir = TempDir::new().unwrap_or_else(|e| unreachable!("{e}"));
        let path = write_config(&dir);
        let out = execute(&cli(Some(path), "json", Commands::Setup))
            .unwrap_or_else(|e| unreachable!("{e}"));
        let value: serde_json::Value =
            serde_json::from_str(&out).unwrap_or_else(|_| unreachable!());
        assert_eq!(value["succeeded"], 1);
        assert_eq!(value["total"], 3);
        assert_eq!(value["domains"][0]["rows"], 2);
        assert_eq!(value["domains"][1]["success"], false);
    }

    #[test]
    fn test_missing_config_is_an_error() {
        let result = execute(&cli(
            Some(PathBuf::from("/nonexistent/app_config.yml")),
            "text",
            Commands::Status,
        ));
        assert!(matches!(result, Err(Error::Config(ConfigError::Read { .. }))));
    }

    #[test]
    fn test_status_lists_domains() {
        let dir = TempDir::new().unwrap_or_else(|e| unreachable!("{e}"));
        let path = write_config(&dir);
        let out = execute(&cli(Some(path), "json", Commands::Status))
            .unwrap_or_else(|e| unreachable!("{e}"));
        let value: serde_json::Value =
            serde_json::from_str(&out).unwrap_or_else(|_| unreachable!());
        assert_eq!(value["domains"][0]["source_exists"], true);
        assert_eq!(value["domains"][0]["database_exists"], false);
        assert_eq!(value["domains"][2]["domain"], "diabetes");
        assert!(value["credentials"].get("TAVILY_API_KEY").is_some());
    }
}
