//! Tool type definitions for function-calling.
//!
//! Every tool in medagent takes exactly one string argument and returns a
//! string, so the schemas are small. Two sets exist: the five routing tools
//! offered to the orchestrating agent, and the three read-only SQL tools
//! offered to each domain's SQL agent.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::Domain;

/// Name of the web search tool.
pub const WEB_SEARCH_TOOL: &str = "medical_web_search_tool";
/// Name of the canned-answer search tool.
pub const SIMPLE_SEARCH_TOOL: &str = "simple_medical_search_tool";
/// Name of the SQL table listing tool.
pub const SQL_LIST_TABLES_TOOL: &str = "sql_db_list_tables";
/// Name of the SQL schema tool.
pub const SQL_SCHEMA_TOOL: &str = "sql_db_schema";
/// Name of the SQL query tool.
pub const SQL_QUERY_TOOL: &str = "sql_db_query";

/// A tool definition that can be sent to an LLM for function-calling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (must match a dispatch arm in an executor).
    pub name: String,
    /// Natural-language description the model uses to pick the tool.
    pub description: String,
    /// JSON Schema object describing the tool's parameters.
    pub parameters: serde_json::Value,
}

/// A tool call requested by the LLM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this call (assigned by the provider).
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// JSON-encoded arguments for the tool.
    pub arguments: String,
}

/// The result of executing a tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// ID of the tool call this result corresponds to.
    pub tool_call_id: String,
    /// Result content.
    pub content: String,
    /// Whether this result represents an error.
    pub is_error: bool,
}

impl ToolResult {
    /// Successful result.
    #[must_use]
    pub fn ok(call: &ToolCall, content: String) -> Self {
        Self {
            tool_call_id: call.id.clone(),
            content,
            is_error: false,
        }
    }

    /// Error result.
    #[must_use]
    pub fn error(call: &ToolCall, content: String) -> Self {
        Self {
            tool_call_id: call.id.clone(),
            content,
            is_error: true,
        }
    }
}

/// A set of tool definitions scoped to an agent role.
#[derive(Debug, Clone, Default)]
pub struct ToolSet {
    definitions: Vec<ToolDefinition>,
}

impl ToolSet {
    /// Returns the tool definitions in this set.
    #[must_use]
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Returns `true` if this set contains no tools.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Returns the number of tools in this set.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Routing tools: three domain databases plus two search tools.
    #[must_use]
    pub fn medical_tools() -> Self {
        let mut definitions: Vec<ToolDefinition> = Domain::ALL.into_iter().map(def_domain).collect();
        definitions.push(def_web_search());
        definitions.push(def_simple_search());
        Self { definitions }
    }

    /// Read-only SQL tools for one domain database.
    #[must_use]
    pub fn sql_tools() -> Self {
        Self {
            definitions: vec![def_list_tables(), def_schema(), def_query()],
        }
    }

    /// Empty tool set (no tools available).
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// Tool schema definitions
// ---------------------------------------------------------------------------

fn query_parameter(description: &str) -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": description
            }
        },
        "required": ["query"],
        "additionalProperties": false
    })
}

fn def_domain(domain: Domain) -> ToolDefinition {
    let topics = match domain {
        Domain::Heart => {
            "heart disease statistics, patient demographics with heart conditions, \
             risk factors for heart disease, heart disease prediction data"
        }
        Domain::Cancer => {
            "cancer statistics and prevalence, tumor characteristics and features, \
             cancer diagnosis data, patient demographics with cancer"
        }
        Domain::Diabetes => {
            "diabetes statistics and prevalence, patient health metrics related to diabetes, \
             diabetes risk factors and indicators, blood sugar and health measurements"
        }
    };
    ToolDefinition {
        name: domain.tool_name().to_string(),
        description: format!(
            "Query the {} database for statistics and information about {} patients. \
             Use this tool for questions about: {topics}.",
            domain.label().to_lowercase(),
            domain.label().to_lowercase(),
        ),
        parameters: query_parameter(&format!(
            "Natural language question about {} data.",
            domain.label().to_lowercase()
        )),
    }
}

fn def_web_search() -> ToolDefinition {
    ToolDefinition {
        name: WEB_SEARCH_TOOL.to_string(),
        description: "Search the web for general medical information: definitions and \
                      terminology, disease symptoms and signs, treatment options and \
                      medications, medical procedures and tests, prevention strategies. \
                      Do NOT use this tool for statistics from the datasets."
            .to_string(),
        parameters: query_parameter("Natural language question about a general medical topic."),
    }
}

fn def_simple_search() -> ToolDefinition {
    ToolDefinition {
        name: SIMPLE_SEARCH_TOOL.to_string(),
        description: "Simple medical information lookup. Fallback when web search is \
                      unavailable."
            .to_string(),
        parameters: query_parameter("Medical question or topic to look up."),
    }
}

fn def_list_tables() -> ToolDefinition {
    ToolDefinition {
        name: SQL_LIST_TABLES_TOOL.to_string(),
        description: "List the tables in the database. Call this first.".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {},
            "additionalProperties": false
        }),
    }
}

fn def_schema() -> ToolDefinition {
    ToolDefinition {
        name: SQL_SCHEMA_TOOL.to_string(),
        description: "Return the CREATE TABLE statement and three sample rows for each \
                      of the given tables."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "table_names": {
                    "type": "array",
                    "items": { "type": "string" },
                    "minItems": 1,
                    "description": "Tables to describe."
                }
            },
            "required": ["table_names"],
            "additionalProperties": false
        }),
    }
}

fn def_query() -> ToolDefinition {
    ToolDefinition {
        name: SQL_QUERY_TOOL.to_string(),
        description: "Execute a single read-only SQLite SELECT statement and return the \
                      rows as JSON. Results are capped at 100 rows. On error, rewrite \
                      the query and try again."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "A single SQLite SELECT statement."
                }
            },
            "required": ["query"],
            "additionalProperties": false
        }),
    }
}
