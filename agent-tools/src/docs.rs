//! Best-effort extraction of summaries and parameter descriptions from doc text.
//!
//! Two layouts are understood. Google style:
//!
//! ```text
//! Fetch the forecast.
//!
//! Args:
//!     location: City name.
//!     unit (str): Temperature unit.
//! ```
//!
//! and the rustdoc convention:
//!
//! ```text
//! Fetch the forecast.
//!
//! # Arguments
//!
//! * `location` - City name.
//! ```
//!
//! The scanner is heuristic. Callers must not depend on it for anything beyond
//! enriching descriptions.

use std::collections::BTreeMap;

const SECTION_LABELS: &[&str] = &["args", "arguments", "parameters", "params"];

/// Summary and per-parameter descriptions parsed from a doc block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocComment {
    summary: Option<String>,
    params: BTreeMap<String, String>,
}

impl DocComment {
    /// Parses a doc block.
    #[must_use]
    pub fn parse(doc: &str) -> Self {
        let summary = doc
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(ToOwned::to_owned);

        let mut params = BTreeMap::new();
        let mut in_section = false;
        for line in doc.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if let Some(is_argument_section) = section_header(line) {
                in_section = is_argument_section;
                continue;
            }
            if !in_section {
                continue;
            }
            if let Some((name, description)) = parse_entry(trimmed) {
                params.entry(name.to_owned()).or_insert(description);
            }
        }

        Self { summary, params }
    }

    /// First non-blank line of the doc block.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Description recorded for `name`, if any.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Classifies a section boundary. `Some(true)` opens an argument section,
/// `Some(false)` opens any other section, `None` is ordinary text.
fn section_header(line: &str) -> Option<bool> {
    let trimmed = line.trim();

    if let Some(heading) = trimmed.strip_prefix('#') {
        let title = heading.trim_start_matches('#').trim().trim_end_matches(':');
        return Some(is_label(title));
    }

    let title = trimmed.strip_suffix(':')?.trim();
    if is_label(title) {
        return Some(true);
    }

    let indented = line.starts_with(char::is_whitespace);
    (!indented).then_some(false)
}

fn is_label(title: &str) -> bool {
    SECTION_LABELS
        .iter()
        .any(|label| title.eq_ignore_ascii_case(label))
}

fn parse_entry(line: &str) -> Option<(&str, String)> {
    let line = line.trim_start_matches(['*', '-', '+']).trim_start();

    if let Some(rest) = line.strip_prefix('`') {
        let (name, tail) = rest.split_once('`')?;
        if !is_identifier(name) {
            return None;
        }
        let description = tail.trim_start().trim_start_matches([':', '-']).trim();
        return non_empty(name, description);
    }

    let end = line
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(line.len());
    let (name, rest) = line.split_at(end);
    if !is_identifier(name) {
        return None;
    }
    if rest.starts_with(':') || rest.trim_start().starts_with('(') {
        let (_, description) = rest.split_once(':')?;
        return non_empty(name, description.trim());
    }
    None
}

fn non_empty<'a>(name: &'a str, description: &str) -> Option<(&'a str, String)> {
    (!description.is_empty()).then(|| (name, description.to_owned()))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}
