//! Medical web search tool.
//!
//! Queries a hosted search API through [`SearchClient`]. Without a client,
//! or when the search fails or finds nothing, answers come from a small
//! canned table instead.

use std::fmt::Write;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::WebSearchConfig;

/// Tavily search endpoint.
pub const TAVILY_ENDPOINT: &str = "https://api.tavily.com/search";

/// Disclaimer appended to live search results.
pub const SEARCH_DISCLAIMER: &str = "⚠️ **Medical Disclaimer**: This information is for \
    educational purposes only. Always consult healthcare professionals for medical advice.";

/// Disclaimer appended to canned answers.
pub const FALLBACK_DISCLAIMER: &str = "⚠️ **Disclaimer**: This is general information only. \
    Consult healthcare professionals for specific medical advice.";

/// Disclaimer appended to the generic response.
pub const GENERIC_DISCLAIMER: &str =
    "⚠️ **Disclaimer**: Always seek professional medical advice for health concerns.";

/// Canned answers, checked in order. First key found in the query wins.
const CANNED_ANSWERS: [(&str, &str); 5] = [
    (
        "heart disease",
        "Heart disease refers to several types of heart conditions including coronary artery \
         disease, arrhythmias, and heart defects. Common symptoms include chest pain, shortness \
         of breath, and fatigue.",
    ),
    (
        "diabetes",
        "Diabetes is a group of metabolic disorders characterized by high blood sugar levels. \
         Type 1 and Type 2 are the most common forms. Symptoms include increased thirst, \
         frequent urination, and fatigue.",
    ),
    (
        "cancer",
        "Cancer is a group of diseases involving abnormal cell growth with potential to invade \
         other parts of the body. Early detection and treatment are crucial for better outcomes.",
    ),
    (
        "symptoms",
        "Medical symptoms are subjective experiences that indicate the presence of disease or \
         injury. Always consult healthcare professionals for proper diagnosis.",
    ),
    (
        "treatment",
        "Medical treatments vary depending on the condition and should always be prescribed \
         and supervised by qualified healthcare professionals.",
    ),
];

/// Errors from a search backend.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The request could not be sent or timed out.
    #[error("search request failed: {0}")]
    Request(String),

    /// The API answered with a non-success status.
    #[error("search API returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// The response body was not the expected JSON.
    #[error("failed to decode search response: {0}")]
    Decode(String),
}

/// A search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    /// Query text.
    pub query: String,
    /// Result cap.
    pub max_results: usize,
    /// Topic filter.
    pub topic: String,
    /// Search depth (`basic` or `advanced`).
    pub search_depth: String,
}

/// One search result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchHit {
    /// Page title.
    #[serde(default = "default_title")]
    pub title: String,
    /// Snippet.
    #[serde(default = "default_content")]
    pub content: String,
    /// Source URL, empty when not provided.
    #[serde(default)]
    pub url: String,
}

fn default_title() -> String {
    "No title".to_string()
}

fn default_content() -> String {
    "No content available".to_string()
}

/// A hosted search backend.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Runs a search.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] on transport, status, or decode failures.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>, SearchError>;
}

/// Tavily search API client.
pub struct TavilyClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl std::fmt::Debug for TavilyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TavilyClient")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
    topic: &'a str,
    search_depth: &'a str,
}

#[derive(Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

impl TavilyClient {
    /// Creates a client with the given key and request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Request`] if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::Request(e.to_string()))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: TAVILY_ENDPOINT.to_string(),
        })
    }

    /// Overrides the endpoint URL.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl SearchClient for TavilyClient {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>, SearchError> {
        let body = TavilyRequest {
            api_key: &self.api_key,
            query: &request.query,
            max_results: request.max_results,
            topic: &request.topic,
            search_depth: &request.search_depth,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SearchError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                status: status.as_u16(),
                body: text.chars().take(200).collect(),
            });
        }

        let parsed: TavilyResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Decode(e.to_string()))?;
        Ok(parsed.results)
    }
}

/// Web search tool with a canned fallback.
pub struct WebSearchTool {
    client: Option<Box<dyn SearchClient>>,
    max_results: usize,
    topic: String,
    search_depth: String,
}

impl WebSearchTool {
    /// Creates a tool from configuration.
    ///
    /// A missing key, or a client that cannot be built, leaves the tool in
    /// fallback-only mode.
    #[must_use]
    pub fn from_config(config: &WebSearchConfig, api_key: Option<&str>) -> Self {
        let client = api_key.and_then(|key| {
            TavilyClient::new(key, Duration::from_secs(config.timeout_secs))
                .map_err(|e| warn!(error = %e, "failed to initialize search client"))
                .ok()
        });
        Self::new(
            client.map(|c| Box::new(c) as Box<dyn SearchClient>),
            config,
        )
    }

    /// Creates a tool with an explicit client.
    #[must_use]
    pub fn new(client: Option<Box<dyn SearchClient>>, config: &WebSearchConfig) -> Self {
        Self {
            client,
            max_results: config.max_results.max(1),
            topic: config.topic.clone(),
            search_depth: config.search_depth.clone(),
        }
    }

    /// `true` if a live search backend is configured.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.client.is_some()
    }

    /// Searches for general medical information.
    pub async fn search(&self, query: &str) -> String {
        let Some(client) = &self.client else {
            debug!("no search client configured, using canned answers");
            return Self::fallback(query);
        };

        let request = SearchRequest {
            query: format!("medical health {query}"),
            max_results: self.max_results,
            topic: self.topic.clone(),
            search_depth: self.search_depth.clone(),
        };

        match client.search(&request).await {
            Ok(hits) if hits.is_empty() => {
                debug!(query, "search returned no results, using canned answers");
                Self::fallback(query)
            }
            Ok(hits) => self.format_hits(&hits),
            Err(e) => {
                warn!(error = %e, "web search failed, using canned answers");
                Self::fallback(query)
            }
        }
    }

    fn format_hits(&self, hits: &[SearchHit]) -> String {
        let mut out = String::from("🌐 **Medical Web Search Results**:\n\n");
        for (i, hit) in hits.iter().take(self.max_results).enumerate() {
            let _ = writeln!(out, "**{}. {}**", i + 1, hit.title);
            let _ = writeln!(out, "{}", hit.content);
            if !hit.url.is_empty() {
                let _ = writeln!(out, "*Source: {}*", hit.url);
            }
            out.push('\n');
        }
        out.push_str(SEARCH_DISCLAIMER);
        out
    }

    /// Answers from the canned table.
    #[must_use]
    pub fn fallback(query: &str) -> String {
        let lower = query.to_lowercase();
        CANNED_ANSWERS
            .iter()
            .find(|(key, _)| lower.contains(key))
            .map_or_else(
                || {
                    format!(
                        "🔍 For detailed information about '{query}', please consult medical \
                         literature or healthcare professionals. This tool provides general \
                         information only.\n\n{GENERIC_DISCLAIMER}"
                    )
                },
                |(_, text)| format!("🩺 **Medical Information**: {text}\n\n{FALLBACK_DISCLAIMER}"),
            )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use test_case::test_case;

    /// Search client returning a fixed outcome and recording requests.
    pub(crate) struct MockSearch {
        outcome: fn() -> Result<Vec<SearchHit>, SearchError>,
        pub(crate) seen: Arc<Mutex<Vec<SearchRequest>>>,
    }

    impl MockSearch {
        pub(crate) fn new(outcome: fn() -> Result<Vec<SearchHit>, SearchError>) -> Self {
            Self {
                outcome,
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl SearchClient for MockSearch {
        async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>, SearchError> {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(request.clone());
            }
            (self.outcome)()
        }
    }

    pub(crate) fn hit(title: &str, url: &str) -> SearchHit {
        SearchHit {
            title: title.to_string(),
            content: format!("About {title}."),
            url: url.to_string(),
        }
    }

    fn config(max_results: usize) -> WebSearchConfig {
        WebSearchConfig {
            max_results,
            ..WebSearchConfig::default()
        }
    }

    #[test_case("What is diabetes?", "Diabetes is a group of metabolic disorders" ; "diabetes")]
    #[test_case("Tell me about HEART DISEASE", "Heart disease refers to" ; "heart case insensitive")]
    #[test_case("cancer screening", "Cancer is a group of diseases" ; "cancer")]
    #[test_case("common symptoms of flu", "Medical symptoms are subjective" ; "symptoms")]
    #[test_case("best treatment for a cold", "Medical treatments vary" ; "treatment")]
    #[test_case("heart disease and diabetes", "Heart disease refers to" ; "first key wins")]
    fn test_fallback_canned(query: &str, expected: &str) {
        let out = WebSearchTool::fallback(query);
        assert!(out.starts_with("🩺 **Medical Information**: "));
        assert!(out.contains(expected));
        assert!(out.ends_with(FALLBACK_DISCLAIMER));
    }

    #[test]
    fn test_fallback_generic() {
        let out = WebSearchTool::fallback("what is a migraine");
        assert!(out.starts_with("🔍 For detailed information about 'what is a migraine'"));
        assert!(out.ends_with(GENERIC_DISCLAIMER));
    }

    #[tokio::test]
    async fn test_no_client_uses_canned_answer() {
        let tool = WebSearchTool::from_config(&config(5), None);
        assert!(!tool.is_live());
        let out = tool.search("diabetes").await;
        assert!(out.contains("Diabetes is a group of metabolic disorders"));
    }

    #[tokio::test]
    async fn test_live_results_formatted() {
        let mock = MockSearch::new(|| {
            Ok(vec![
                hit("Diabetes overview", "https://example.org/a"),
                hit("Type 2", ""),
                hit("Extra", "https://example.org/c"),
            ])
        });
        let seen = Arc::clone(&mock.seen);
        let tool = WebSearchTool::new(Some(Box::new(mock)), &config(2));

        let out = tool.search("diabetes symptoms").await;
        assert!(out.starts_with("🌐 **Medical Web Search Results**:\n\n"));
        assert!(out.contains("**1. Diabetes overview**\nAbout Diabetes overview.\n*Source: https://example.org/a*\n"));
        assert!(out.contains("**2. Type 2**\nAbout Type 2.\n\n"));
        assert!(!out.contains("Extra"));
        assert!(out.ends_with(SEARCH_DISCLAIMER));

        let requests = seen.lock().map(|r| r.clone()).unwrap_or_default();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].query, "medical health diabetes symptoms");
        assert_eq!(requests[0].max_results, 2);
        assert_eq!(requests[0].topic, "health");
        assert_eq!(requests[0].search_depth, "advanced");
    }

    #[tokio::test]
    async fn test_client_error_falls_back() {
        let mock = MockSearch::new(|| Err(SearchError::Request("offline".to_string())));
        let tool = WebSearchTool::new(Some(Box::new(mock)), &config(5));
        let out = tool.search("cancer treatment").await;
        assert!(out.contains("Cancer is a group of diseases"));
    }

    #[tokio::test]
    async fn test_empty_results_fall_back() {
        let mock = MockSearch::new(|| Ok(Vec::new()));
        let tool = WebSearchTool::new(Some(Box::new(mock)), &config(5));
        let out = tool.search("symptoms").await;
        assert!(out.starts_with("🩺 **Medical Information**"));
    }

    #[test]
    fn test_hit_defaults() {
        let hit: SearchHit = serde_json::from_str("{}").unwrap_or_else(|e| unreachable!("{e}"));
        assert_eq!(hit.title, "No title");
        assert_eq!(hit.content, "No content available");
        assert!(hit.url.is_empty());
    }

    /// Answers one HTTP request on a local port with a canned response.
    /// The handle yields the raw request text.
    fn serve_once(status: &'static str, body: String) -> (String, std::thread::JoinHandle<String>) {
        use std::io::{BufRead as _, Read as _, Write as _};

        let listener =
            std::net::TcpListener::bind("127.0.0.1:0").unwrap_or_else(|e| unreachable!("{e}"));
        let addr = listener.local_addr().unwrap_or_else(|e| unreachable!("{e}"));
        let handle = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap_or_else(|e| unreachable!("{e}"));
            let mut reader = std::io::BufReader::new(stream);
            let mut raw = String::new();
            let mut content_length = 0;
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap_or(0) == 0 {
                    break;
                }
                if let Some((name, value)) = line.split_once(':')
                    && name.eq_ignore_ascii_case("content-length")
                {
                    content_length = value.trim().parse().unwrap_or(0);
                }
                let end_of_head = line == "\r\n";
                raw.push_str(&line);
                if end_of_head {
                    break;
                }
            }
            let mut payload = vec![0; content_length];
            let _ = reader.read_exact(&mut payload);
            raw.push_str(&String::from_utf8_lossy(&payload));

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let mut stream = reader.into_inner();
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.flush();
            raw
        });
        (format!("http://{addr}/search"), handle)
    }

    fn tavily(endpoint: &str) -> TavilyClient {
        TavilyClient::new("tvly-key", Duration::from_secs(5))
            .unwrap_or_else(|e| unreachable!("{e}"))
            .with_endpoint(endpoint)
    }

    fn request() -> SearchRequest {
        SearchRequest {
            query: "medical health diabetes".to_string(),
            max_results: 3,
            topic: "health".to_string(),
            search_depth: "advanced".to_string(),
        }
    }

    #[tokio::test]
    async fn test_tavily_results_through_tool() {
        let body = r#"{"results":[
            {"title":"Diabetes","content":"High blood sugar.","url":"https://example.org/d"},
            {"url":"https://example.org/e"}
        ]}"#;
        let (endpoint, server) = serve_once("200 OK", body.to_string());
        let tool = WebSearchTool::new(Some(Box::new(tavily(&endpoint))), &config(3));

        let out = tool.search("diabetes").await;
        assert!(out.contains("**1. Diabetes**\nHigh blood sugar.\n*Source: https://example.org/d*"));
        assert!(out.contains("**2. No title**\nNo content available\n"));

        let raw = server.join().unwrap_or_default();
        let lower = raw.to_lowercase();
        assert!(lower.starts_with("post /search "));
        assert!(lower.contains("authorization: bearer tvly-key"));
        assert!(raw.contains(r#""query":"medical health diabetes""#));
        assert!(raw.contains(r#""max_results":3"#));
        assert!(raw.contains(r#""topic":"health""#));
    }

    #[tokio::test]
    async fn test_tavily_error_status_truncates_body() {
        let (endpoint, server) = serve_once("500 Internal Server Error", "e".repeat(500));
        let result = tavily(&endpoint).search(&request()).await;
        let _ = server.join();
        match result {
            Err(SearchError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body.len(), 200);
            }
            other => unreachable!("expected status error, got {:?}", other.map(|h| h.len())),
        }
    }

    #[tokio::test]
    async fn test_tavily_bad_body_is_decode_error() {
        let (endpoint, server) = serve_once("200 OK", "not json".to_string());
        let result = tavily(&endpoint).search(&request()).await;
        let _ = server.join();
        assert!(matches!(result, Err(SearchError::Decode(_))));
    }

    #[tokio::test]
    async fn test_tavily_unauthorized_falls_back() {
        let (endpoint, server) = serve_once("401 Unauthorized", r#"{"detail":"bad key"}"#.to_string());
        let tool = WebSearchTool::new(Some(Box::new(tavily(&endpoint))), &config(3));
        let out = tool.search("cancer").await;
        let _ = server.join();
        assert!(out.starts_with("🩺 **Medical Information**: Cancer is a group of diseases"));
    }

    #[test]
    fn test_tavily_debug_redacts_key() {
        let client = TavilyClient::new("tvly-secret", Duration::from_secs(1))
            .unwrap_or_else(|e| unreachable!("{e}"));
        assert!(!format!("{client:?}").contains("tvly-secret"));
    }
}
