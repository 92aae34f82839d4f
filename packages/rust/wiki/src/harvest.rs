//! The harvest loop: pick a keyword, search, clean, accept or reject, append.
//!
//! The loop runs until a cooperative stop flag is set (by Ctrl-C in the app).
//! The flag is checked once per iteration boundary; the current keyword is
//! always carried to completion. No keyword-level error is fatal.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info, warn};

use corpusmill_shared::{CorpusMillError, Record, Result, SearchConfig};

use crate::clean::{clean_extract, meets_min_length};
use crate::client::{Article, WikiClient};

// ---------------------------------------------------------------------------
// Stats & reporting
// ---------------------------------------------------------------------------

/// Running tally of keyword attempts.
#[derive(Debug, Clone, Copy, Default)]
pub struct HarvestStats {
    /// Keywords that produced an accepted record.
    pub processed: usize,
    /// Failed attempts: search errors, empty results, short extracts.
    pub errors: usize,
}

impl HarvestStats {
    /// Fraction of attempts that succeeded, or `None` before any attempt.
    pub fn success_rate(&self) -> Option<f64> {
        let total = self.processed + self.errors;
        if total == 0 {
            None
        } else {
            Some(self.processed as f64 / total as f64)
        }
    }
}

/// Progress callbacks for the harvest loop.
pub trait HarvestReporter {
    /// A keyword attempt is starting.
    fn keyword_started(&self, keyword: &str);
    /// A keyword attempt finished; `accepted` is whether a record was written.
    fn keyword_finished(&self, keyword: &str, accepted: bool, stats: &HarvestStats);
}

/// Reporter that does nothing.
pub struct NoopReporter;

impl HarvestReporter for NoopReporter {
    fn keyword_started(&self, _keyword: &str) {}
    fn keyword_finished(&self, _keyword: &str, _accepted: bool, _stats: &HarvestStats) {}
}

// ---------------------------------------------------------------------------
// Input loading
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct KeywordsFile {
    #[serde(rename = "KEYWORDS", default)]
    keywords: Vec<String>,
}

/// Load the keyword list from a YAML file (`KEYWORDS` key).
pub fn load_keywords(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| CorpusMillError::io(path, e))?;
    let parsed: KeywordsFile = serde_yaml::from_str(&content)
        .map_err(|e| CorpusMillError::parse(format!("{}: {e}", path.display())))?;
    Ok(parsed.keywords)
}

/// Load the output record template: the first line of a JSONL file.
pub fn load_template(path: &Path) -> Result<Record> {
    let content = std::fs::read_to_string(path).map_err(|e| CorpusMillError::io(path, e))?;
    let first_line = content
        .lines()
        .next()
        .ok_or_else(|| CorpusMillError::parse(format!("{}: template file is empty", path.display())))?;
    serde_json::from_str(first_line.trim())
        .map_err(|e| CorpusMillError::parse(format!("{}: {e}", path.display())))
}

// ---------------------------------------------------------------------------
// Harvester
// ---------------------------------------------------------------------------

/// Long-running keyword harvester.
#[derive(Debug)]
pub struct Harvester {
    client: WikiClient,
    keywords: Vec<String>,
    template: Record,
    search: SearchConfig,
    output_path: PathBuf,
}

impl Harvester {
    /// Create a harvester. The keyword list must be non-empty.
    pub fn new(
        client: WikiClient,
        keywords: Vec<String>,
        template: Record,
        search: SearchConfig,
        output_path: impl Into<PathBuf>,
    ) -> Result<Self> {
        if keywords.is_empty() {
            return Err(CorpusMillError::config("keyword list is empty"));
        }
        Ok(Self {
            client,
            keywords,
            template,
            search,
            output_path: output_path.into(),
        })
    }

    /// Run until `stop` is set. The flag is observed once per iteration;
    /// an iteration in flight always completes.
    pub async fn run(&self, stop: &AtomicBool, reporter: &dyn HarvestReporter) -> HarvestStats {
        let mut stats = HarvestStats::default();

        info!(
            keywords = self.keywords.len(),
            output = %self.output_path.display(),
            "harvest loop started"
        );

        while !stop.load(Ordering::Relaxed) {
            let keyword = &self.keywords[fastrand::usize(..self.keywords.len())];
            reporter.keyword_started(keyword);

            let accepted = match self.process_keyword(keyword).await {
                Ok(true) => {
                    stats.processed += 1;
                    true
                }
                Ok(false) => {
                    stats.errors += 1;
                    debug!(keyword, "keyword rejected: no usable extract");
                    false
                }
                Err(e) => {
                    stats.errors += 1;
                    warn!(keyword, error = %e, "keyword failed");
                    false
                }
            };
            reporter.keyword_finished(keyword, accepted, &stats);

            tokio::time::sleep(Duration::from_millis(self.search.keyword_delay_ms)).await;
        }

        info!(
            processed = stats.processed,
            errors = stats.errors,
            "harvest loop stopped"
        );
        stats
    }

    /// Process one keyword end to end.
    ///
    /// Returns `Ok(true)` when a record was appended, `Ok(false)` for a
    /// non-error rejection (no extracts, or the cleaned extract fell short
    /// of the minimum length).
    pub async fn process_keyword(&self, keyword: &str) -> Result<bool> {
        let titles = self
            .client
            .search_titles(keyword, self.search.search_limit)
            .await?;

        let mut articles: Vec<Article> = Vec::new();
        for title in titles {
            if let Some(extract) = self.client.fetch_intro(&title).await? {
                articles.push(Article { title, extract });
            }
            tokio::time::sleep(Duration::from_millis(self.search.article_delay_ms)).await;
        }

        if articles.is_empty() {
            return Ok(false);
        }

        // One article per keyword attempt, chosen uniformly at random.
        let chosen = &articles[fastrand::usize(..articles.len())];
        let cleaned = clean_extract(&chosen.extract);

        if !meets_min_length(&cleaned, self.search.min_extract_chars) {
            debug!(
                keyword,
                title = %chosen.title,
                chars = cleaned.chars().count(),
                "cleaned extract below minimum length"
            );
            return Ok(false);
        }

        self.append_record(keyword, &chosen.title, &cleaned)?;
        info!(keyword, title = %chosen.title, "record accepted");
        Ok(true)
    }

    /// Append one record: the template merged with topic/keyword/description.
    /// The file is reopened for each append.
    fn append_record(&self, topic: &str, title: &str, description: &str) -> Result<()> {
        use std::io::Write;

        let mut record = self.template.clone();
        record.insert("topic".into(), topic.into());
        record.insert("keyword".into(), title.into());
        record.insert("description".into(), description.into());

        let line = serde_json::to_string(&record)
            .map_err(|e| CorpusMillError::parse(format!("serialize record: {e}")))?;

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.output_path)
            .map_err(|e| CorpusMillError::io(&self.output_path, e))?;
        writeln!(file, "{line}").map_err(|e| CorpusMillError::io(&self.output_path, e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn zero_delay_config() -> SearchConfig {
        SearchConfig {
            article_delay_ms: 0,
            keyword_delay_ms: 0,
            ..Default::default()
        }
    }

    fn temp_output(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("corpusmill-harvest-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(format!("{name}.jsonl"))
    }

    async fn mock_search_and_extract(server: &MockServer, extract: &str) {
        Mock::given(method("GET"))
            .and(query_param("list", "search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "query": {"search": [{"title": "Test Article"}]}
            })))
            .mount(server)
            .await;

        Mock::given(method("GET"))
            .and(query_param("prop", "extracts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "query": {"pages": {"1": {"title": "Test Article", "extract": extract}}}
            })))
            .mount(server)
            .await;
    }

    fn harvester(server: &MockServer, output: &Path) -> Harvester {
        let client = WikiClient::new(&format!("{}/w/api.php", server.uri())).unwrap();
        let template: Record =
            serde_json::from_str(r#"{"source": "wiki", "license": "CC BY-SA"}"#).unwrap();
        Harvester::new(
            client,
            vec!["testing".into()],
            template,
            zero_delay_config(),
            output,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn process_keyword_appends_merged_record() {
        let server = MockServer::start().await;
        let long_extract =
            "Testing is the practice of verifying that software behaves as intended, \
             across many inputs and conditions.[1]";
        mock_search_and_extract(&server, long_extract).await;

        let output = temp_output("accepts");
        let _ = std::fs::remove_file(&output);
        let h = harvester(&server, &output);

        let accepted = h.process_keyword("testing").await.unwrap();
        assert!(accepted);

        let content = std::fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 1);

        let record: Record = serde_json::from_str(lines[0]).unwrap();
        // Template fields come first, computed fields after.
        let keys: Vec<&String> = record.keys().collect();
        assert_eq!(keys, ["source", "license", "topic", "keyword", "description"]);
        assert_eq!(record["topic"], "testing");
        assert_eq!(record["keyword"], "Test Article");
        assert!(record["description"].as_str().unwrap().starts_with("Testing is"));
        // Citation marker cleaned out
        assert!(!record["description"].as_str().unwrap().contains("[1]"));
    }

    #[tokio::test]
    async fn short_extract_is_rejected_without_error() {
        let server = MockServer::start().await;
        mock_search_and_extract(&server, "Too short to accept.").await;

        let output = temp_output("rejects");
        let _ = std::fs::remove_file(&output);
        let h = harvester(&server, &output);

        let accepted = h.process_keyword("testing").await.unwrap();
        assert!(!accepted);
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn no_search_results_is_a_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let output = temp_output("noresults");
        let h = harvester(&server, &output);
        assert!(!h.process_keyword("testing").await.unwrap());
    }

    #[tokio::test]
    async fn search_error_does_not_kill_the_loop() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let output = temp_output("loop-error");
        let h = harvester(&server, &output);

        // Stop after two iterations via the reporter callback.
        struct StopAfter {
            stop: Arc<AtomicBool>,
            seen: AtomicUsize,
        }
        impl HarvestReporter for StopAfter {
            fn keyword_started(&self, _keyword: &str) {}
            fn keyword_finished(&self, _keyword: &str, _accepted: bool, _stats: &HarvestStats) {
                if self.seen.fetch_add(1, Ordering::Relaxed) + 1 >= 2 {
                    self.stop.store(true, Ordering::Relaxed);
                }
            }
        }

        let stop = Arc::new(AtomicBool::new(false));
        let reporter = StopAfter {
            stop: stop.clone(),
            seen: AtomicUsize::new(0),
        };

        let stats = h.run(&stop, &reporter).await;
        assert_eq!(stats.processed, 0);
        assert_eq!(stats.errors, 2);
        assert_eq!(stats.success_rate(), Some(0.0));
    }

    #[tokio::test]
    async fn empty_keyword_list_is_rejected_up_front() {
        let client = WikiClient::new("http://localhost:1/w/api.php").unwrap();
        let err = Harvester::new(
            client,
            Vec::new(),
            Record::new(),
            zero_delay_config(),
            temp_output("empty"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("keyword list is empty"));
    }

    #[test]
    fn success_rate_before_any_attempt_is_none() {
        assert!(HarvestStats::default().success_rate().is_none());
        let stats = HarvestStats {
            processed: 3,
            errors: 1,
        };
        assert_eq!(stats.success_rate(), Some(0.75));
    }

    #[test]
    fn keywords_and_template_load_from_disk() {
        let dir = std::env::temp_dir().join(format!("corpusmill-inputs-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let kw_path = dir.join("keywords.yaml");
        std::fs::write(&kw_path, "KEYWORDS:\n  - rust\n  - testing\n").unwrap();
        assert_eq!(load_keywords(&kw_path).unwrap(), ["rust", "testing"]);

        let tpl_path = dir.join("template.jsonl");
        std::fs::write(&tpl_path, "{\"source\": \"wiki\"}\n{\"ignored\": true}\n").unwrap();
        let template = load_template(&tpl_path).unwrap();
        assert_eq!(template.len(), 1);
        assert_eq!(template["source"], "wiki");
    }

    #[test]
    fn missing_keywords_key_yields_empty_list() {
        let dir = std::env::temp_dir().join(format!("corpusmill-inputs2-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let kw_path = dir.join("other.yaml");
        std::fs::write(&kw_path, "OTHER: [1, 2]\n").unwrap();
        assert!(load_keywords(&kw_path).unwrap().is_empty());
    }
}
