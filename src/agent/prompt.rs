//! System prompts and template builders for agents.
//!
//! The configured role text comes first. The fixed rules below are appended
//! so operators can tune the persona without losing the tool contract.

use std::fmt::Write;

use crate::core::Domain;

/// Routing rules appended to the orchestrating agent's role.
pub const ROUTING_RULES: &str = r#"INTELLIGENT ROUTING RULES:

🧠 Use DATABASE TOOLS when questions are about STATISTICS, DATA, or NUMBERS:
- "What is the average age..."
- "How many patients..."
- "Show me statistics..."
- "Count of cases..."
- "Percentage of..."
- Any numerical analysis of patient data

Database Selection:
- Heart disease queries → heart_disease_db_tool
- Cancer queries → cancer_db_tool
- Diabetes queries → diabetes_db_tool

🌐 Use WEB SEARCH TOOLS when questions are about DEFINITIONS, SYMPTOMS, or CURES:
- "What is [medical condition]..."
- "What are the symptoms of..."
- "How is [condition] treated..."
- "What causes..."
- "How to prevent..."
- General medical knowledge

Use simple_medical_search_tool only when medical_web_search_tool fails.

CRITICAL: Analyze the question type first, then route accordingly. Pass the
user's question to the chosen tool unchanged, and base your answer on the
tool output."#;

/// Instructions appended to the SQL agent's role.
pub const SQL_AGENT_RULES: &str = r"## Instructions

1. Call sql_db_list_tables to see which tables exist.
2. Call sql_db_schema for the relevant table before writing a query.
3. Write one syntactically correct SQLite SELECT statement and run it with
   sql_db_query. Select only the columns you need and add LIMIT 100 unless
   the question asks for an aggregate.
4. If a query fails, read the error, rewrite the query and try again.
5. Answer the question in plain language using the query results. State the
   numbers you found.

## Rules

- The database is read-only. Never issue INSERT, UPDATE, DELETE, DROP,
  ALTER or CREATE statements.
- Never invent column names. Use the schema.
- If the data cannot answer the question, say so.";

/// Builds the orchestrating agent's system prompt.
#[must_use]
pub fn build_router_system_prompt(role: &str) -> String {
    format!("{}\n\n{ROUTING_RULES}", role.trim_end())
}

/// Builds a SQL agent's system prompt for one domain table.
#[must_use]
pub fn build_sql_system_prompt(role: &str, domain: Domain, table: &str) -> String {
    let mut prompt = role.trim_end().to_string();
    let _ = write!(
        prompt,
        "\n\nYou are connected to a SQLite database of {} records. \
         The data lives in the table `{table}`.\n\n{SQL_AGENT_RULES}",
        domain.label().to_lowercase()
    );
    prompt
}

/// Builds the question handed to a domain's SQL agent.
#[must_use]
pub fn build_domain_question(domain: Domain, question: &str) -> String {
    format!(
        "Answer this question about {} data: {question}",
        domain.label().to_lowercase()
    )
}
