//! Placeholder discovery
//!
//! A placeholder name is one or more non-whitespace characters between an open
//! delimiter and the next close delimiter. Delimiters are matched literally, so
//! markers such as `/` or `?` carry no pattern meaning.

use std::collections::HashMap;

use regex::{Regex, RegexBuilder};

use super::source::Delimiters;
use crate::error::{Span, TemplateError};

/// A distinct placeholder name and where it first appeared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub name: String,
    pub span: Span,
}

/// Upper bound for compiled scanning and substitution patterns
pub(crate) const PATTERN_SIZE_LIMIT: usize = 64 * (1 << 20);

/// Case folding used for every placeholder comparison
///
/// Uppercasing first applies the one-to-many mappings (`ß` → `SS`), and
/// lowercasing afterwards merges context forms such as final sigma, so
/// `straße`, `STRASSE` and `Strasse` all fold to `strasse`.
pub fn fold(name: &str) -> String {
    name.to_uppercase().to_lowercase()
}

/// Build the discovery pattern for a delimiter pair
pub fn placeholder_pattern(delimiters: &Delimiters) -> Result<Regex, TemplateError> {
    pattern_with_limit(delimiters, PATTERN_SIZE_LIMIT)
}

fn pattern_with_limit(delimiters: &Delimiters, size_limit: usize) -> Result<Regex, TemplateError> {
    let pattern = format!(
        r"{}(\S+?){}",
        regex::escape(&delimiters.open),
        regex::escape(&delimiters.close)
    );
    RegexBuilder::new(&pattern)
        .size_limit(size_limit)
        .build()
        .map_err(|e| TemplateError::invalid_delimiter(e.to_string()))
}

/// Collect distinct placeholder names in first-seen order
pub fn scan(text: &str, delimiters: &Delimiters) -> Result<Vec<Placeholder>, TemplateError> {
    let pattern = placeholder_pattern(delimiters)?;
    let mut found: Vec<Placeholder> = Vec::new();

    for caps in pattern.captures_iter(text) {
        let Some(name) = caps.get(1) else { continue };
        if found.iter().any(|p| p.name == name.as_str()) {
            continue;
        }
        found.push(Placeholder {
            name: name.as_str().to_string(),
            span: name.range(),
        });
    }

    tracing::debug!(count = found.len(), "scanned template for placeholders");
    Ok(found)
}

/// Reject names that collide under case folding
pub fn check_ambiguity(placeholders: &[Placeholder]) -> Result<(), TemplateError> {
    let mut groups: HashMap<String, Vec<&Placeholder>> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for placeholder in placeholders {
        let key = fold(&placeholder.name);
        let group = groups.entry(key.clone()).or_default();
        if group.is_empty() {
            order.push(key);
        }
        group.push(placeholder);
    }

    let mut names = Vec::new();
    let mut spans = Vec::new();
    for key in &order {
        let group = &groups[key];
        if group.len() > 1 {
            for placeholder in group {
                names.push(placeholder.name.clone());
                spans.push(placeholder.span.clone());
            }
        }
    }

    if names.is_empty() {
        Ok(())
    } else {
        Err(TemplateError::AmbiguousPlaceholders { names, spans })
    }
}
