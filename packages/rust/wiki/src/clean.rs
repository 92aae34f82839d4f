//! Cleanup pipeline for encyclopedia extracts.
//!
//! Each pass is a function `&str -> String` applied in sequence: citation
//! markers, editorial markers, leftover bracketed spans, whitespace, then
//! disambiguation boilerplate anchored at the start of the text.

use std::sync::LazyLock;

use regex::Regex;

/// Run the full cleanup pipeline on a raw extract.
pub fn clean_extract(extract: &str) -> String {
    let mut result = extract.to_string();

    result = strip_citation_markers(&result);
    result = strip_editorial_markers(&result);
    result = strip_bracketed_spans(&result);
    result = squeeze_whitespace(&result);
    result = strip_leading_boilerplate(&result);

    result.trim().to_string()
}

/// Whether a cleaned extract is long enough to accept. Bounds are inclusive:
/// at `min_chars` the extract passes.
pub fn meets_min_length(cleaned: &str, min_chars: usize) -> bool {
    cleaned.chars().count() >= min_chars
}

// ---------------------------------------------------------------------------
// Pass 1: Numeric citation markers
// ---------------------------------------------------------------------------

/// Remove reference markers like `[1]`, `[23]`.
fn strip_citation_markers(text: &str) -> String {
    static CITATION_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\[\d+\]").expect("valid regex"));

    CITATION_RE.replace_all(text, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 2: Editorial markers
// ---------------------------------------------------------------------------

/// Remove fixed editorial annotations such as `[citation needed]`.
fn strip_editorial_markers(text: &str) -> String {
    static EDITORIAL_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r"\[(?:citation needed|clarification needed|when\?|where\?|who\?|why\?|how\?)\]",
        )
        .expect("valid regex")
    });

    EDITORIAL_RE.replace_all(text, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 3: Remaining bracketed spans
// ---------------------------------------------------------------------------

/// Remove any bracketed span left over, whatever its content.
fn strip_bracketed_spans(text: &str) -> String {
    static BRACKET_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\[.*?\]").expect("valid regex"));

    BRACKET_RE.replace_all(text, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 4: Whitespace
// ---------------------------------------------------------------------------

/// Collapse whitespace runs to single spaces and trim the edges.
fn squeeze_whitespace(text: &str) -> String {
    static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

    WS_RE.replace_all(text, " ").trim().to_string()
}

// ---------------------------------------------------------------------------
// Pass 5: Disambiguation boilerplate
// ---------------------------------------------------------------------------

/// Strip the standard disambiguation lead-ins, matched only at the very
/// start of the text. A matching sentence later in the extract is kept.
fn strip_leading_boilerplate(text: &str) -> String {
    static ABOUT_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^This article is about.*?\. For.*?, see.*?\.").expect("valid regex")
    });
    static OTHER_USES_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^For other uses, see.*?\.").expect("valid regex"));
    static REFER_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^\S+ may refer to:").expect("valid regex"));

    let mut result = text.to_string();
    result = ABOUT_RE.replace(&result, "").to_string();
    result = OTHER_USES_RE.replace(&result, "").to_string();
    result = REFER_RE.replace(&result, "").to_string();
    result
}
