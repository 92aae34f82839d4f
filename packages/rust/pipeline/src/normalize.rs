//! Whitespace/case normalization applied before filtering and dedup.
//!
//! The normalized string is the filter and dedup key, so this must be a pure,
//! idempotent function of `(text, options)`.

use std::sync::LazyLock;

use regex::Regex;

static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Options controlling [`normalize`]. Order of application is fixed:
/// trim, then squeeze, then lowercase.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeOptions {
    /// Strip leading and trailing whitespace.
    pub trim: bool,
    /// Collapse every run of whitespace characters to a single space.
    pub squeeze_ws: bool,
    /// Lowercase the result.
    pub lower: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            trim: true,
            squeeze_ws: true,
            lower: false,
        }
    }
}

/// Normalize `text` according to `opts`.
///
/// Idempotent: normalizing an already-normalized string with the same
/// options yields the same string.
pub fn normalize(text: &str, opts: &NormalizeOptions) -> String {
    let mut result = text.to_string();

    if opts.trim {
        result = result.trim().to_string();
    }
    if opts.squeeze_ws {
        result = WS_RE.replace_all(&result, " ").to_string();
    }
    if opts.lower {
        result = result.to_lowercase();
    }

    result
}
