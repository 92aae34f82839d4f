//! MediaWiki search/extract client.
//!
//! Two primitives: a keyword search returning ranked article titles, and a
//! per-title fetch of the introductory section (plain text before the first
//! heading). Requests are strictly sequential; pacing is the caller's job.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use corpusmill_shared::{CorpusMillError, Result};

/// User-Agent string for API requests.
const USER_AGENT: &str = concat!("CorpusMill/", env!("CARGO_PKG_VERSION"));

/// Request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// An article title paired with its non-empty introductory extract.
#[derive(Debug, Clone)]
pub struct Article {
    pub title: String,
    pub extract: String,
}

// ---------------------------------------------------------------------------
// API response shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    #[serde(default)]
    query: Option<ExtractQuery>,
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: serde_json::Map<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// WikiClient
// ---------------------------------------------------------------------------

/// HTTP client for a MediaWiki-style `api.php` endpoint.
#[derive(Debug)]
pub struct WikiClient {
    client: Client,
    endpoint: Url,
}

impl WikiClient {
    /// Create a client for the given `api.php` endpoint URL.
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| CorpusMillError::config(format!("invalid endpoint '{endpoint}': {e}")))?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| CorpusMillError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, endpoint })
    }

    /// Search for up to `limit` article titles matching `keyword`, in
    /// search-ranked order.
    pub async fn search_titles(&self, keyword: &str, limit: u32) -> Result<Vec<String>> {
        debug!(keyword, limit, "searching articles");

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("list", "search"),
                ("srsearch", keyword),
                ("srlimit", &limit.to_string()),
                ("srprop", "title|snippet"),
            ])
            .send()
            .await
            .map_err(|e| CorpusMillError::Network(format!("search '{keyword}': {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CorpusMillError::Network(format!(
                "search '{keyword}': HTTP {status}"
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| CorpusMillError::parse(format!("search '{keyword}': {e}")))?;

        let titles = body
            .query
            .map(|q| q.search.into_iter().map(|hit| hit.title).collect())
            .unwrap_or_default();

        Ok(titles)
    }

    /// Fetch the introductory section of an article as plain text.
    ///
    /// Returns the first non-empty extract in the response, or `None` when
    /// the article has none (or the server answered with a non-success
    /// status, which is not treated as an error).
    pub async fn fetch_intro(&self, title: &str) -> Result<Option<String>> {
        debug!(title, "fetching intro extract");

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("titles", title),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("exsectionformat", "plain"),
            ])
            .send()
            .await
            .map_err(|e| CorpusMillError::Network(format!("extract '{title}': {e}")))?;

        if !response.status().is_success() {
            return Ok(None);
        }

        let body: ExtractResponse = response
            .json()
            .await
            .map_err(|e| CorpusMillError::parse(format!("extract '{title}': {e}")))?;

        let Some(query) = body.query else {
            return Ok(None);
        };

        for page in query.pages.values() {
            if let Some(extract) = page.get("extract").and_then(|v| v.as_str()) {
                if !extract.is_empty() {
                    return Ok(Some(extract.to_string()));
                }
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn search_returns_ranked_titles() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("list", "search"))
            .and(query_param("srsearch", "rust"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "query": {
                    "search": [
                        {"title": "Rust (programming language)"},
                        {"title": "Rust"},
                    ]
                }
            })))
            .mount(&server)
            .await;

        let client = WikiClient::new(&format!("{}/w/api.php", server.uri())).unwrap();
        let titles = client.search_titles("rust", 10).await.unwrap();
        assert_eq!(titles, ["Rust (programming language)", "Rust"]);
    }

    #[tokio::test]
    async fn search_with_no_results_is_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("list", "search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = WikiClient::new(&format!("{}/w/api.php", server.uri())).unwrap();
        let titles = client.search_titles("nothing", 10).await.unwrap();
        assert!(titles.is_empty());
    }

    #[tokio::test]
    async fn search_http_error_is_a_network_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = WikiClient::new(&format!("{}/w/api.php", server.uri())).unwrap();
        let err = client.search_titles("rust", 10).await.unwrap_err();
        assert!(err.to_string().contains("network error"));
    }

    #[tokio::test]
    async fn fetch_intro_returns_first_nonempty_extract() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("prop", "extracts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "query": {
                    "pages": {
                        "123": {"title": "Rust", "extract": ""},
                        "456": {"title": "Rust", "extract": "Rust is a language."},
                    }
                }
            })))
            .mount(&server)
            .await;

        let client = WikiClient::new(&format!("{}/w/api.php", server.uri())).unwrap();
        let extract = client.fetch_intro("Rust").await.unwrap();
        assert_eq!(extract.as_deref(), Some("Rust is a language."));
    }

    #[tokio::test]
    async fn fetch_intro_http_error_is_not_fatal() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = WikiClient::new(&format!("{}/w/api.php", server.uri())).unwrap();
        let extract = client.fetch_intro("Rust").await.unwrap();
        assert!(extract.is_none());
    }
}
