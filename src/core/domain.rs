//! Medical domains and the routing outcome.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the three medical subject areas backed by a dataset.
///
/// Variant order is the router's tie-break order: when a query names
/// several domains, the one listed first here wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    /// Heart disease.
    #[serde(rename = "heart_disease")]
    Heart,
    /// Cancer.
    Cancer,
    /// Diabetes.
    Diabetes,
}

impl Domain {
    /// All domains in router check order.
    pub const ALL: [Self; 3] = [Self::Heart, Self::Cancer, Self::Diabetes];

    /// Stable key used in configuration and reports.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Heart => "heart_disease",
            Self::Cancer => "cancer",
            Self::Diabetes => "diabetes",
        }
    }

    /// Human-readable name, capitalized.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Heart => "Heart disease",
            Self::Cancer => "Cancer",
            Self::Diabetes => "Diabetes",
        }
    }

    /// Title used in answer headers.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Heart => "Heart Disease",
            Self::Cancer => "Cancer",
            Self::Diabetes => "Diabetes",
        }
    }

    /// Emoji prefix for answers from this domain.
    #[must_use]
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Heart => "🫀",
            Self::Cancer => "🎗️",
            Self::Diabetes => "🩺",
        }
    }

    /// Name of the agent tool that answers questions about this domain.
    #[must_use]
    pub const fn tool_name(self) -> &'static str {
        match self {
            Self::Heart => "heart_disease_db_tool",
            Self::Cancer => "cancer_db_tool",
            Self::Diabetes => "diabetes_db_tool",
        }
    }

    /// Lower-case keywords that select this domain for a statistical query.
    #[must_use]
    pub const fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Heart => &["heart", "cardiac", "coronary"],
            Self::Cancer => &["cancer", "tumor", "malignant", "benign"],
            Self::Diabetes => &["diabetes", "glucose", "insulin", "blood sugar"],
        }
    }

    /// Looks a domain up by its tool name.
    #[must_use]
    pub fn from_tool_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.tool_name() == name)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Where the fallback router sends a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "route", content = "domain")]
pub enum Route {
    /// Statistical question answered from a domain database.
    Database(Domain),
    /// General medical knowledge answered by web search.
    Web,
}

impl Route {
    /// Name of the tool this route dispatches to.
    #[must_use]
    pub const fn tool_name(self) -> &'static str {
        match self {
            Self::Database(d) => d.tool_name(),
            Self::Web => "medical_web_search_tool",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Database(d) => write!(f, "database:{d}"),
            Self::Web => f.write_str("web"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_in_check_order() {
        assert_eq!(Domain::ALL, [Domain::Heart, Domain::Cancer, Domain::Diabetes]);
        let mut sorted = Domain::ALL;
        sorted.sort();
        assert_eq!(sorted, Domain::ALL);
    }

    #[test]
    fn test_tool_name_round_trip() {
        for d in Domain::ALL {
            assert_eq!(Domain::from_tool_name(d.tool_name()), Some(d));
        }
        assert_eq!(Domain::from_tool_name("medical_web_search_tool"), None);
    }

    #[test]
    fn test_keywords_are_lowercase() {
        for d in Domain::ALL {
            for kw in d.keywords() {
                assert_eq!(*kw, kw.to_lowercase());
            }
        }
    }

    #[test]
    fn test_route_serialization() {
        let json = serde_json::to_string(&Route::Database(Domain::Heart)).unwrap_or_default();
        assert_eq!(json, r#"{"route":"database","domain":"heart_disease"}"#);
        let json = serde_json::to_string(&Route::Web).unwrap_or_default();
        assert_eq!(json, r#"{"route":"web"}"#);
    }

    #[test]
    fn test_route_display() {
        assert_eq!(Route::Database(Domain::Cancer).to_string(), "database:cancer");
        assert_eq!(Route::Web.to_string(), "web");
    }
}
