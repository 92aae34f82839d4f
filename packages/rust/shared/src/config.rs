//! Harvester configuration.
//!
//! Settings live in a local `harvest.toml`. A missing file means defaults,
//! which reproduce the fixed-path behavior of running with no configuration
//! at all: `keywords.yaml` in, `harvest.jsonl` out.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CorpusMillError, Result};

/// Default configuration file name, resolved against the working directory.
pub const CONFIG_FILE_NAME: &str = "harvest.toml";

// ---------------------------------------------------------------------------
// Config structs (matching harvest.toml schema)
// ---------------------------------------------------------------------------

/// Top-level harvester config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Input/output file locations.
    #[serde(default)]
    pub inputs: InputsConfig,

    /// Search API behavior.
    #[serde(default)]
    pub search: SearchConfig,
}

/// `[inputs]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputsConfig {
    /// YAML file holding the keyword list under the `KEYWORDS` key.
    #[serde(default = "default_keywords_path")]
    pub keywords_path: PathBuf,

    /// JSONL file whose first line is the output record template.
    #[serde(default = "default_template_path")]
    pub template_path: PathBuf,

    /// JSONL file accepted records are appended to.
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
}

impl Default for InputsConfig {
    fn default() -> Self {
        Self {
            keywords_path: default_keywords_path(),
            template_path: default_template_path(),
            output_path: default_output_path(),
        }
    }
}

fn default_keywords_path() -> PathBuf {
    "keywords.yaml".into()
}
fn default_template_path() -> PathBuf {
    "template.jsonl".into()
}
fn default_output_path() -> PathBuf {
    "harvest.jsonl".into()
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// MediaWiki-style API endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Maximum number of article titles fetched per keyword search.
    #[serde(default = "default_search_limit")]
    pub search_limit: u32,

    /// Fixed delay after each per-article extract request.
    #[serde(default = "default_delay_ms")]
    pub article_delay_ms: u64,

    /// Fixed delay after each keyword attempt.
    #[serde(default = "default_delay_ms")]
    pub keyword_delay_ms: u64,

    /// Minimum accepted length of a cleaned extract, in characters.
    #[serde(default = "default_min_extract_chars")]
    pub min_extract_chars: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            search_limit: default_search_limit(),
            article_delay_ms: default_delay_ms(),
            keyword_delay_ms: default_delay_ms(),
            min_extract_chars: default_min_extract_chars(),
        }
    }
}

fn default_endpoint() -> String {
    "https://en.wikipedia.org/w/api.php".into()
}
fn default_search_limit() -> u32 {
    10
}
fn default_delay_ms() -> u64 {
    100
}
fn default_min_extract_chars() -> usize {
    70
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the harvester config from `harvest.toml` in the working directory.
/// Returns defaults if the file does not exist.
pub fn load_config() -> Result<HarvestConfig> {
    let path = Path::new(CONFIG_FILE_NAME);

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(HarvestConfig::default());
    }

    load_config_from(path)
}

/// Load the harvester config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<HarvestConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| CorpusMillError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        CorpusMillError::config(format!("failed to parse {}: {e}", path.display()))
    })
}
