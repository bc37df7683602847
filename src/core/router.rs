//! Keyword-based fallback router.
//!
//! Used when the LLM router cannot produce an answer within its iteration
//! budget. Classification is a pure function of the query string: lower-case
//! it, look for statistical keywords, then pick the first domain whose
//! keywords appear. All matching is plain substring matching.

use super::domain::{Domain, Route};

/// Keywords that mark a query as a request for dataset statistics.
pub const STATISTICAL_KEYWORDS: [&str; 8] = [
    "average",
    "mean",
    "count",
    "how many",
    "statistics",
    "data",
    "records",
    "patients",
];

/// Returns `true` if the query asks for dataset statistics.
#[must_use]
pub fn is_statistical(query: &str) -> bool {
    let lower = query.to_lowercase();
    contains_any(&lower, &STATISTICAL_KEYWORDS)
}

/// Returns the first domain, in [`Domain::ALL`] order, whose keywords
/// appear in the query.
#[must_use]
pub fn detect_domain(query: &str) -> Option<Domain> {
    let lower = query.to_lowercase();
    Domain::ALL
        .into_iter()
        .find(|d| contains_any(&lower, d.keywords()))
}

/// Classifies a query for fallback dispatch.
///
/// Statistical queries naming no domain go to [`Domain::Heart`].
#[must_use]
pub fn classify(query: &str) -> Route {
    if !is_statistical(query) {
        return Route::Web;
    }
    Route::Database(detect_domain(query).unwrap_or(Domain::Heart))
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}
