//! Builds one text candidate per record, either from a format template or by
//! concatenating selected columns.
//!
//! Template mode takes precedence when a template is supplied. A build that
//! cannot complete (missing field, malformed placeholder) produces no text at
//! all — the record is skipped, never partially rendered.

use corpusmill_shared::{Record, scalar_to_text};

/// Per-record text builder.
#[derive(Debug, Clone)]
pub struct TextBuilder {
    columns: Vec<String>,
    sep: String,
    template: Option<String>,
}

impl TextBuilder {
    /// Create a builder over the given columns and separator. When `template`
    /// is `Some`, it wins and the columns are ignored.
    pub fn new(columns: Vec<String>, sep: impl Into<String>, template: Option<String>) -> Self {
        Self {
            columns,
            sep: sep.into(),
            template,
        }
    }

    /// Build the text candidate for one record.
    ///
    /// Returns `None` when no text could be produced (template substitution
    /// failure). Concatenation mode is total; it may return an empty string,
    /// which callers treat as "no text".
    pub fn build(&self, record: &Record) -> Option<String> {
        match &self.template {
            Some(template) => render_template(template, record),
            None => Some(self.concat(record)),
        }
    }

    /// Concatenation mode: coerce each selected column to text, drop empties,
    /// join with the separator. Missing fields count as empty.
    fn concat(&self, record: &Record) -> String {
        let parts: Vec<String> = self
            .columns
            .iter()
            .filter_map(|col| {
                let text = record.get(col).map(scalar_to_text).unwrap_or_default();
                if text.is_empty() { None } else { Some(text) }
            })
            .collect();

        parts.join(&self.sep)
    }
}

/// Substitute `{name}` placeholders from the record into the template.
///
/// `{{` and `}}` are literal braces. Any placeholder naming a field absent
/// from the record, and any malformed placeholder, fails the whole render.
fn render_template(template: &str, record: &Record) -> Option<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    out.push('{');
                    continue;
                }
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) => name.push(ch),
                        // Unterminated placeholder
                        None => return None,
                    }
                }
                if name.is_empty() {
                    return None;
                }
                let value = record.get(&name)?;
                out.push_str(&scalar_to_text(value));
            }
            '}' => {
                if chars.peek() == Some(&'}') {
                    chars.next();
                    out.push('}');
                } else {
                    // Stray closing brace
                    return None;
                }
            }
            _ => out.push(c),
        }
    }

    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: &str) -> Record {
        serde_json::from_str(json).expect("valid JSON object")
    }

    #[test]
    fn concat_drops_empty_and_coerces() {
        let builder = TextBuilder::new(
            vec!["a".into(), "b".into(), "c".into()],
            " ",
            None,
        );
        let rec = record(r#"{"a": "Hi", "b": null, "c": 5}"#);
        assert_eq!(builder.build(&rec), Some("Hi 5".to_string()));
    }

    #[test]
    fn concat_missing_column_counts_as_empty() {
        let builder = TextBuilder::new(vec!["x".into(), "a".into()], " | ", None);
        let rec = record(r#"{"a": "only"}"#);
        assert_eq!(builder.build(&rec), Some("only".to_string()));
    }

    #[test]
    fn concat_all_empty_yields_empty_string() {
        let builder = TextBuilder::new(vec!["a".into(), "b".into()], " ", None);
        let rec = record(r#"{"a": "", "b": null}"#);
        assert_eq!(builder.build(&rec), Some(String::new()));
    }

    #[test]
    fn concat_uses_custom_separator() {
        let builder = TextBuilder::new(vec!["a".into(), "b".into()], "\n", None);
        let rec = record(r#"{"a": "one", "b": "two"}"#);
        assert_eq!(builder.build(&rec), Some("one\ntwo".to_string()));
    }

    #[test]
    fn template_substitutes_by_name() {
        let builder = TextBuilder::new(
            Vec::new(),
            " ",
            Some("{instruction}\n{input}".into()),
        );
        let rec = record(r#"{"instruction": "Add", "input": "2+2"}"#);
        assert_eq!(builder.build(&rec), Some("Add\n2+2".to_string()));
    }

    #[test]
    fn template_missing_field_fails_record() {
        let builder = TextBuilder::new(Vec::new(), " ", Some("{x}-{y}".into()));
        let rec = record(r#"{"x": "foo"}"#);
        assert_eq!(builder.build(&rec), None);
    }

    #[test]
    fn template_takes_precedence_over_columns() {
        let builder = TextBuilder::new(vec!["a".into()], " ", Some("{b}".into()));
        let rec = record(r#"{"a": "col", "b": "tmpl"}"#);
        assert_eq!(builder.build(&rec), Some("tmpl".to_string()));
    }

    #[test]
    fn template_escaped_braces_are_literal() {
        let builder = TextBuilder::new(Vec::new(), " ", Some("{{{a}}}".into()));
        let rec = record(r#"{"a": "v"}"#);
        assert_eq!(builder.build(&rec), Some("{v}".to_string()));
    }

    #[test]
    fn template_malformed_fails_record() {
        let rec = record(r#"{"a": "v"}"#);
        for bad in ["{a", "{}", "a } b"] {
            let builder = TextBuilder::new(Vec::new(), " ", Some(bad.into()));
            assert_eq!(builder.build(&rec), None, "expected failure for {bad:?}");
        }
    }

    #[test]
    fn template_coerces_non_text_values() {
        let builder = TextBuilder::new(Vec::new(), " ", Some("{n} {b}".into()));
        let rec = record(r#"{"n": 7, "b": false}"#);
        assert_eq!(builder.build(&rec), Some("7 false".to_string()));
    }
}
