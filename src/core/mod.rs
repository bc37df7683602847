//! Core domain types and the deterministic fallback router.
//!
//! Nothing in here touches the network, the filesystem, or an LLM, so it
//! is the part of the crate that can be reasoned about exhaustively.

pub mod domain;
pub mod router;

pub use domain::{Domain, Route};
pub use router::{STATISTICAL_KEYWORDS, classify, detect_domain, is_statistical};
