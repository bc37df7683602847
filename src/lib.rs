//! # medagent
//!
//! Medical multi-tool AI agent. Natural-language questions are routed
//! either to SQL statistics over three CSV-derived SQLite databases (heart
//! disease, cancer, diabetes) or to a medical web search. An LLM
//! function-calling agent picks the route and writes the answer. When it
//! fails, a deterministic keyword router takes over.
//!
//! ## Example
//!
//! ```
//! use medagent::core::{Domain, Route, classify};
//!
//! assert_eq!(
//!     classify("What is the average age of heart disease patients?"),
//!     Route::Database(Domain::Heart)
//! );
//! assert_eq!(classify("What are the symptoms of flu?"), Route::Web);
//! ```

pub mod agent;
pub mod chat;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod provision;
pub mod tools;

pub use agent::MedicalAgent;
pub use chat::ChatSession;
pub use config::{AppConfig, Credentials};
pub use crate::core::{Domain, Route, classify};
pub use error::{Error, Result};
pub use provision::{ProvisionReport, Provisioner};
