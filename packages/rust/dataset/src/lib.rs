//! Local JSONL dataset loader.
//!
//! A dataset name resolves to either a `.jsonl`/`.json` file directly, or a
//! directory containing one file per split (`<split>.jsonl`), optionally
//! under a `<config>/` subdirectory. Records are one JSON object per line;
//! blank lines are skipped and malformed lines are a fatal load error.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use corpusmill_shared::{CorpusMillError, FieldKind, Record, Result};
use tracing::debug;

/// Options controlling how a dataset is opened.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Split name, e.g. `train`, `validation`, `test`.
    pub split: String,
    /// Optional config name, mapped to a subdirectory of the dataset dir.
    pub config: Option<String>,
    /// Iterate without peeking the schema first.
    pub streaming: bool,
    /// Accepted for interface parity with hub-style loaders; local JSONL
    /// sources never execute code, so this is ignored.
    pub trust_remote_code: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            split: "train".into(),
            config: None,
            streaming: false,
            trust_remote_code: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// An opened dataset split.
#[derive(Debug)]
pub struct Dataset {
    path: PathBuf,
    features: Option<Vec<(String, FieldKind)>>,
}

impl Dataset {
    /// Resolve `dataset` to a split file and open it.
    ///
    /// In non-streaming mode the first record is peeked to expose
    /// [`Dataset::features`] for column auto-detection.
    pub fn load(dataset: &str, opts: &LoadOptions) -> Result<Self> {
        let path = resolve_split_path(dataset, opts)?;

        let features = if opts.streaming {
            None
        } else {
            peek_features(&path)?
        };

        debug!(path = %path.display(), streaming = opts.streaming, "opened dataset split");
        Ok(Self { path, features })
    }

    /// The ordered field-name/kind listing, when known ahead of time.
    /// `None` in streaming mode (or for an empty split file).
    pub fn features(&self) -> Option<&[(String, FieldKind)]> {
        self.features.as_deref()
    }

    /// Iterate over the split's records from the beginning.
    pub fn records(&self) -> Result<RecordIter> {
        let file = File::open(&self.path).map_err(|e| CorpusMillError::io(&self.path, e))?;
        Ok(RecordIter {
            lines: BufReader::new(file).lines(),
            path: self.path.clone(),
            line_no: 0,
        })
    }
}

/// Iterator over the records of one split file.
pub struct RecordIter {
    lines: Lines<BufReader<File>>,
    path: PathBuf,
    line_no: usize,
}

impl Iterator for RecordIter {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line_no += 1;
            match self.lines.next()? {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    return Some(serde_json::from_str(&line).map_err(|e| {
                        CorpusMillError::parse(format!(
                            "{}:{}: {e}",
                            self.path.display(),
                            self.line_no
                        ))
                    }));
                }
                Err(e) => return Some(Err(CorpusMillError::io(&self.path, e))),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Path resolution & schema peek
// ---------------------------------------------------------------------------

/// Map a dataset name + options to the split file on disk.
fn resolve_split_path(dataset: &str, opts: &LoadOptions) -> Result<PathBuf> {
    let base = Path::new(dataset);

    if base.is_file() {
        return Ok(base.to_path_buf());
    }

    if base.is_dir() {
        let dir = match &opts.config {
            Some(config) => base.join(config),
            None => base.to_path_buf(),
        };
        for ext in ["jsonl", "json"] {
            let candidate = dir.join(format!("{}.{ext}", opts.split));
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
        return Err(CorpusMillError::config(format!(
            "no '{}' split found under {}",
            opts.split,
            dir.display()
        )));
    }

    Err(CorpusMillError::config(format!(
        "dataset '{dataset}' is neither a file nor a directory"
    )))
}

/// Read the first record of a split file and classify its fields.
fn peek_features(path: &Path) -> Result<Option<Vec<(String, FieldKind)>>> {
    let file = File::open(path).map_err(|e| CorpusMillError::io(path, e))?;
    let reader = BufReader::new(file);

    for line in reader.lines() {
        let line = line.map_err(|e| CorpusMillError::io(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let record: Record = serde_json::from_str(&line)
            .map_err(|e| CorpusMillError::parse(format!("{}:1: {e}", path.display())))?;
        let features = record
            .iter()
            .map(|(name, value)| (name.clone(), FieldKind::of(value)))
            .collect();
        return Ok(Some(features));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_dataset(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("corpusmill-dataset-{}-{name}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("train.jsonl");
        let mut f = File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_file_path_directly() {
        let path = temp_dataset("direct", "{\"text\": \"hello\", \"id\": 1}\n");
        let ds = Dataset::load(path.to_str().unwrap(), &LoadOptions::default()).unwrap();

        let features = ds.features().expect("schema peeked");
        assert_eq!(features[0], ("text".to_string(), FieldKind::Text));
        assert_eq!(features[1], ("id".to_string(), FieldKind::Number));

        let records: Vec<Record> = ds.records().unwrap().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["text"], "hello");
    }

    #[test]
    fn resolves_split_inside_directory() {
        let path = temp_dataset("dir", "{\"text\": \"a\"}\n{\"text\": \"b\"}\n");
        let dir = path.parent().unwrap();
        let ds = Dataset::load(dir.to_str().unwrap(), &LoadOptions::default()).unwrap();
        assert_eq!(ds.records().unwrap().count(), 2);
    }

    #[test]
    fn missing_split_is_a_config_error() {
        let path = temp_dataset("nosplit", "{}\n");
        let dir = path.parent().unwrap();
        let opts = LoadOptions {
            split: "validation".into(),
            ..Default::default()
        };
        let err = Dataset::load(dir.to_str().unwrap(), &opts).unwrap_err();
        assert!(err.to_string().contains("validation"));
    }

    #[test]
    fn streaming_skips_schema_peek() {
        let path = temp_dataset("streaming", "{\"text\": \"hello\"}\n");
        let opts = LoadOptions {
            streaming: true,
            ..Default::default()
        };
        let ds = Dataset::load(path.to_str().unwrap(), &opts).unwrap();
        assert!(ds.features().is_none());
        assert_eq!(ds.records().unwrap().count(), 1);
    }

    #[test]
    fn blank_lines_are_skipped_and_bad_json_is_fatal() {
        let path = temp_dataset("badline", "{\"a\": 1}\n\nnot json\n");
        let ds = Dataset::load(path.to_str().unwrap(), &LoadOptions::default()).unwrap();
        let results: Vec<Result<Record>> = ds.records().unwrap().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        let err = results[1].as_ref().unwrap_err();
        assert!(err.to_string().contains(":3:"));
    }

    #[test]
    fn empty_file_has_no_features() {
        let path = temp_dataset("empty", "");
        let ds = Dataset::load(path.to_str().unwrap(), &LoadOptions::default()).unwrap();
        assert!(ds.features().is_none());
        assert_eq!(ds.records().unwrap().count(), 0);
    }
}
