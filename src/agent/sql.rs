//! SQL agent: answers one domain question from its SQLite database.
//!
//! The agent sees three tools (list tables, describe schema, run query)
//! backed by a connection opened with `SQLITE_OPEN_READ_ONLY`. A fresh
//! connection is opened for every question.

use std::fmt::Write;
use std::path::Path;

use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::config::AgentConfig;
use super::executor::{QueryArgs, ToolExecutor, parse_arguments};
use super::prompt::build_sql_system_prompt;
use super::tool::{
    SQL_LIST_TABLES_TOOL, SQL_QUERY_TOOL, SQL_SCHEMA_TOOL, ToolCall, ToolDefinition, ToolResult,
    ToolSet,
};
use super::traits::Agent;
use crate::core::Domain;
use crate::error::AgentError;
use crate::provision::quote_ident;

/// Maximum rows returned by one `sql_db_query` call.
pub const MAX_QUERY_ROWS: usize = 100;
/// Sample rows shown by `sql_db_schema`.
const SAMPLE_ROWS: usize = 3;

/// Agent that writes and runs SQL to answer a domain question.
pub struct SqlAgent {
    model: String,
    system_prompt: String,
    temperature: f32,
    max_tokens: u32,
    max_iterations: usize,
}

impl SqlAgent {
    /// Creates a SQL agent for one domain table.
    #[must_use]
    pub fn new(config: &AgentConfig, domain: Domain, table: &str) -> Self {
        Self {
            model: config.model.clone(),
            system_prompt: build_sql_system_prompt(&config.db_agent_system_role, domain, table),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            max_iterations: config.max_sql_iterations,
        }
    }
}

impl Agent for SqlAgent {
    fn name(&self) -> &'static str {
        "sql"
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
        ToolSet::sql_tools().definitions().to_vec()
    }

    fn max_tool_iterations(&self) -> usize {
        self.max_iterations
    }
}

#[derive(Debug, Deserialize)]
struct SchemaArgs {
    table_names: Vec<String>,
}

/// Executes the SQL tools against a read-only connection.
pub struct SqlToolExecutor {
    conn: Connection,
}

impl SqlToolExecutor {
    /// Opens the database read-only.
    ///
    /// # Errors
    ///
    /// Returns a rusqlite error if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    /// Comma-separated list of user tables.
    ///
    /// # Errors
    ///
    /// Returns a rusqlite error if the catalog cannot be read.
    pub fn list_tables(&self) -> Result<String, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names.join(", "))
    }

    /// CREATE statement and sample rows for each named table.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ToolExecution`] if a table does not exist or
    /// cannot be read.
    pub fn schema(&self, tables: &[String]) -> Result<String, AgentError> {
        let err = |message: String| AgentError::ToolExecution {
            name: SQL_SCHEMA_TOOL.to_string(),
            message,
        };
        if tables.is_empty() {
            return Err(err("no table names given".to_string()));
        }

        let mut out = String::new();
        for table in tables {
            let create: Option<String> = self
                .conn
                .query_row(
                    "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [table],
                    |row| row.get(0),
                )
                .map_err(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => {
                        err(format!("table_names {{{table}}} not found in database"))
                    }
                    other => err(other.to_string()),
                })?;

            let _ = writeln!(out, "{}\n", create.unwrap_or_default().trim());

            let mut stmt = self
                .conn
                .prepare(&format!(
                    "SELECT * FROM {} LIMIT {SAMPLE_ROWS}",
                    quote_ident(table)
                ))
                .map_err(|e| err(e.to_string()))?;
            let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
            let width = columns.len();
            let mut rows = stmt.query([]).map_err(|e| err(e.to_string()))?;

            let _ = writeln!(out, "/*\n{SAMPLE_ROWS} rows from {table} table:");
            let _ = writeln!(out, "{}", columns.join("\t"));
            while let Some(row) = rows.next().map_err(|e| err(e.to_string()))? {
                let cells = (0..width)
                    .map(|i| row.get_ref(i).map(display_value))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| err(e.to_string()))?;
                let _ = writeln!(out, "{}", cells.join("\t"));
            }
            out.push_str("*/\n\n");
        }
        Ok(out.trim_end().to_string())
    }

    /// Runs one read-only statement and returns the rows as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ToolExecution`] for invalid SQL, more than one
    /// statement, or a statement that would write.
    pub fn query(&self, sql: &str) -> Result<String, AgentError> {
        let err = |message: String| AgentError::ToolExecution {
            name: SQL_QUERY_TOOL.to_string(),
            message,
        };

        let sql =
            single_statement(sql).ok_or_else(|| err("only one statement is allowed".to_string()))?;
        let mut stmt = self.conn.prepare(sql).map_err(|e| err(e.to_string()))?;
        if !stmt.readonly() {
            return Err(err("only read-only SELECT statements are allowed".to_string()));
        }

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();
        let mut rows = stmt.query([]).map_err(|e| err(e.to_string()))?;

        let mut out = Vec::new();
        let mut truncated = false;
        while let Some(row) = rows.next().map_err(|e| err(e.to_string()))? {
            if out.len() == MAX_QUERY_ROWS {
                truncated = true;
                break;
            }
            let values = (0..width)
                .map(|i| row.get_ref(i).map(json_value))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| err(e.to_string()))?;
            out.push(values);
        }

        debug!(rows = out.len(), truncated, "sql query executed");

        let body = json!({
            "columns": columns,
            "rows": out,
            "truncated": truncated,
        });
        serde_json::to_string(&body).map_err(|e| err(e.to_string()))
    }

    fn dispatch(&self, call: &ToolCall) -> Result<String, AgentError> {
        match call.name.as_str() {
            SQL_LIST_TABLES_TOOL => self.list_tables().map_err(|e| AgentError::ToolExecution {
                name: call.name.clone(),
                message: e.to_string(),
            }),
            SQL_SCHEMA_TOOL => {
                let args: SchemaArgs = parse_arguments(call)?;
                self.schema(&args.table_names)
            }
            SQL_QUERY_TOOL => {
                let args: QueryArgs = parse_arguments(call)?;
                self.query(&args.query)
            }
            other => Err(AgentError::ToolExecution {
                name: other.to_string(),
                message: "unknown tool".to_string(),
            }),
        }
    }
}

#[async_trait(?Send)]
impl ToolExecutor for SqlToolExecutor {
    async fn execute(&self, call: &ToolCall) -> ToolResult {
        match self.dispatch(call) {
            Ok(content) => ToolResult::ok(call, content),
            Err(e) => ToolResult::error(call, format!("Error: {e}")),
        }
    }
}

/// Strips trailing semicolons; `None` if another statement follows.
fn single_statement(sql: &str) -> Option<&str> {
    let sql = sql.trim().trim_end_matches(';').trim_end();
    let mut quote: Option<char> = None;
    for c in sql.chars() {
        match (quote, c) {
            (None, '\'' | '"' | '`') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            (None, ';') => return None,
            _ => {}
        }
    }
    Some(sql)
}

fn json_value(value: ValueRef<'_>) -> serde_json::Value {
    match value {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(i) => json!(i),
        ValueRef::Real(f) => json!(f),
        ValueRef::Text(t) => json!(String::from_utf8_lossy(t)),
        ValueRef::Blob(b) => json!(format!("<blob {} bytes>", b.len())),
    }
}

fn display_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "None".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => format!("<blob {} bytes>", b.len()),
    }
}
