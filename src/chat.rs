//! Chat session and interactive terminal REPL.
//!
//! A [`ChatSession`] holds the conversation for one session only; nothing
//! is persisted. [`run_repl`] reads lines from any reader and writes to any
//! writer, so the same loop serves stdin/stdout and tests.

use std::io::{self, BufRead, Write};

use crate::agent::message::{ChatMessage, assistant_message, user_message};
use crate::agent::orchestrator::{MedicalAgent, TOOLS_INFO};
use crate::provision::Provisioner;

/// First assistant message of every session.
pub const WELCOME_MESSAGE: &str = "👋 Hello! I'm your Medical AI Assistant. I can help you with:\n\n\
    📊 **Medical dataset statistics** (heart disease, cancer, diabetes)\n\
    🌐 **General medical information** (symptoms, treatments, definitions)\n\n\
    What would you like to know?";

const HELP: &str = "Commands:\n  \
    /setup   Setup/refresh the medical databases\n  \
    /clear   Clear chat history\n  \
    /tools   Show available tools and example queries\n  \
    /help    Show this help\n  \
    /quit    Leave the chat (also /exit)";

/// Conversation history for one session.
#[derive(Debug, Clone)]
pub struct ChatSession {
    history: Vec<ChatMessage>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    /// Starts a session with the welcome message.
    #[must_use]
    pub fn new() -> Self {
        Self {
            history: vec![assistant_message(WELCOME_MESSAGE)],
        }
    }

    /// Asks the agent a question, recording both turns.
    #[allow(clippy::future_not_send)]
    pub async fn ask(&mut self, agent: &MedicalAgent, input: &str) -> String {
        let reply = agent.query_with_history(&self.history, input).await;
        self.history.push(user_message(input));
        self.history.push(assistant_message(&reply));
        reply
    }

    /// Empties the history.
    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Messages so far, oldest first.
    #[must_use]
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }
}

/// Runs the interactive chat loop until `/quit`, `/exit`, or end of input.
///
/// # Errors
///
/// Returns an I/O error if reading or writing fails.
#[allow(clippy::future_not_send)]
pub async fn run_repl<R: BufRead, W: Write>(
    session: &mut ChatSession,
    agent: &MedicalAgent,
    provisioner: &Provisioner,
    mut reader: R,
    mut writer: W,
) -> io::Result<()> {
    writeln!(writer, "🧑‍⚕️ Medical Multi-Tool AI Agent (type /help for commands)\n")?;
    for message in session.history() {
        writeln!(writer, "{}\n", message.content)?;
    }

    let mut line = String::new();
    loop {
        write!(writer, "> ")?;
        writer.flush()?;

        line.clear();
        if reader.read_line(&mut line)? == 0 {
            writeln!(writer)?;
            break;
        }

        let input = line.trim();
        match input {
            "" => {}
            "/quit" | "/exit" => break,
            "/help" => writeln!(writer, "{HELP}\n")?,
            "/tools" => writeln!(writer, "{TOOLS_INFO}")?,
            "/clear" => {
                session.clear();
                writeln!(writer, "🗑️ Chat history cleared.\n")?;
            }
            "/setup" => {
                writeln!(writer, "Setting up medical databases...")?;
                let report = provisioner.provision_all();
                writeln!(writer, "{report}\n")?;
            }
            query => {
                let reply = session.ask(agent, query).await;
                writeln!(writer, "{reply}\n")?;
            }
        }
    }

    writeln!(writer, "Goodbye!")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::config::AgentConfig;
    use crate::agent::message::Role;
    use crate::agent::provider::LlmProvider;
    use crate::agent::testing::{Reply, ScriptedProvider};
    use crate::config::AppConfig;
    use crate::config::tests::sample_config;
    use crate::tools::{MedicalTools, WebSearchTool};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn fixture(script: Vec<Reply>) -> (TempDir, AppConfig, MedicalAgent) {
        let dir = TempDir::new().unwrap_or_else(|e| unreachable!("{e}"));
        let csv = dir.path().join("csv");
        std::fs::create_dir_all(&csv).unwrap_or_else(|e| unreachable!("{e}"));
        let app = sample_config(&csv, &dir.path().join("sql"));

        let config = AgentConfig::builder()
            .api_key("k")
            .build()
            .unwrap_or_else(|_| unreachable!());
        let provider: Arc<dyn LlmProvider> = Arc::new(ScriptedProvider::new(script));
        let web = WebSearchTool::from_config(&app.web_search_config, None);
        let tools = MedicalTools::new(&app, &provider, &config, web);
        let agent = MedicalAgent::new(provider, &config, tools);
        (dir, app, agent)
    }

    fn run(agent: &MedicalAgent, app: &AppConfig, session: &mut ChatSession, input: &str) -> String {
        let mut out = Vec::new();
        let provisioner = Provisioner::new(app);
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap_or_else(|e| unreachable!("{e}"));
        rt.block_on(run_repl(session, agent, &provisioner, input.as_bytes(), &mut out))
            .unwrap_or_else(|e| unreachable!("{e}"));
        String::from_utf8(out).unwrap_or_default()
    }

    #[test]
    fn test_session_starts_with_welcome() {
        let session = ChatSession::new();
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history()[0].role, Role::Assistant);
        assert_eq!(session.history()[0].content, WELCOME_MESSAGE);
    }

    #[tokio::test]
    async fn test_ask_appends_both_turns() {
        let (_dir, _app, agent) = fixture(vec![Reply::text("Hi there.")]);
        let mut session = ChatSession::new();
        let reply = session.ask(&agent, "hello").await;
        assert_eq!(reply, "Hi there.");

        let history = session.history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[1].role, Role::User);
        assert_eq!(history[1].content, "hello");
        assert_eq!(history[2].content, "Hi there.");
    }

    #[test]
    fn test_repl_query_and_quit() {
        let (_dir, app, agent) = fixture(vec![Reply::text("An answer.")]);
        let mut session = ChatSession::new();
        let out = run(&agent, &app, &mut session, "what is a cough?\n/quit\nignored\n");
        assert!(out.contains(WELCOME_MESSAGE));
        assert!(out.contains("An answer."));
        assert!(out.ends_with("Goodbye!\n"));
        assert_eq!(session.history().len(), 3);
    }

    #[test]
    fn test_repl_clear_empties_history() {
        let (_dir, app, agent) = fixture(vec![Reply::text("one")]);
        let mut session = ChatSession::new();
        let out = run(&agent, &app, &mut session, "q\n/clear\n");
        assert!(out.contains("Chat history cleared."));
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_repl_tools_and_eof() {
        let (_dir, app, agent) = fixture(vec![]);
        let mut session = ChatSession::new();
        let out = run(&agent, &app, &mut session, "/tools");
        assert!(out.contains("Available Medical AI Tools"));
        assert!(out.ends_with("Goodbye!\n"));
    }

    #[test]
    fn test_repl_setup_reports_each_domain() {
        let (_dir, app, agent) = fixture(vec![]);
        std::fs::write(app.domain(crate::core::Domain::Heart).source, "age\n50\n")
            .unwrap_or_else(|e| unreachable!("{e}"));
        let mut session = ChatSession::new();
        let out = run(&agent, &app, &mut session, "/setup\n/exit\n");
        assert!(out.contains("✅ Heart Disease DB ready"));
        assert!(out.contains("❌ Cancer DB failed"));
        assert!(out.contains("1/3 successful"));
    }
}
