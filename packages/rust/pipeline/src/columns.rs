//! Column selection for the extractor.
//!
//! An explicit `--cols` list is used verbatim. Otherwise, when the dataset's
//! schema is known, columns are auto-detected: first matches from a fixed
//! priority list, falling back to every textual field. Without a schema
//! (streaming mode) the priority list is used unvalidated, accepting the risk
//! of empty text when none of those fields exist.

use corpusmill_shared::{CorpusMillError, FieldKind, Result};
use tracing::debug;

/// Common text column names, tried in order during auto-detection.
pub const COMMON_TEXT_COLUMNS: [&str; 7] = [
    "text",
    "content",
    "sentence",
    "prompt",
    "instruction",
    "question",
    "input",
];

/// Parse an explicit comma-separated column list. Entries are trimmed and
/// empties dropped.
pub fn parse_columns(spec: &str) -> Vec<String> {
    spec.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect()
}

/// Resolve the columns to extract.
///
/// `schema` is the dataset's ordered field-name/kind listing, or `None` when
/// field names are not knowable in advance. Fails with a usage error when a
/// known schema contains neither a priority-list match nor any textual field.
pub fn select_columns(
    explicit: Option<&str>,
    schema: Option<&[(String, FieldKind)]>,
) -> Result<Vec<String>> {
    if let Some(spec) = explicit {
        let cols = parse_columns(spec);
        if !cols.is_empty() {
            return Ok(cols);
        }
    }

    let Some(schema) = schema else {
        // Streaming mode: no schema to validate against.
        debug!(columns = ?COMMON_TEXT_COLUMNS, "no schema available, defaulting to common text columns");
        return Ok(COMMON_TEXT_COLUMNS.iter().map(|c| c.to_string()).collect());
    };

    let mut cols: Vec<String> = COMMON_TEXT_COLUMNS
        .iter()
        .filter(|c| schema.iter().any(|(name, _)| name == *c))
        .map(|c| c.to_string())
        .collect();

    if cols.is_empty() {
        // Fall back to every textual field.
        cols = schema
            .iter()
            .filter(|(_, kind)| kind.is_text())
            .map(|(name, _)| name.clone())
            .collect();
    }

    if cols.is_empty() {
        return Err(CorpusMillError::validation(
            "Could not infer text columns. Provide --cols.",
        ));
    }

    debug!(?cols, "auto-detected text columns");
    Ok(cols)
}
