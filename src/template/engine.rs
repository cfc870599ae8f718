//! The template engine: value storage, key resolution and substitution

use std::collections::HashMap;

use regex::{Captures, RegexBuilder};

use super::scanner::{self, fold, PATTERN_SIZE_LIMIT};
use super::source::{Delimiters, TemplateSource};
use crate::error::TemplateError;

/// A template with its discovered placeholders and the values assigned so far
///
/// Assigned values only live until the next render, so one engine can serve any
/// number of independent renders of the same template.
#[derive(Debug, Clone)]
pub struct TemplateEngine {
    source: TemplateSource,
    delimiters: Delimiters,
    /// Canonical names in first-seen order
    placeholders: Vec<String>,
    values: HashMap<String, String>,
    default_value: Option<String>,
    errors: Vec<String>,
}

impl TemplateEngine {
    /// Scan `source` for placeholders bounded by `delimiters`
    ///
    /// Fails if a delimiter is empty or too large to compile, or if two
    /// placeholder names differ only by case.
    pub fn new(
        source: impl Into<TemplateSource>,
        delimiters: Delimiters,
    ) -> Result<Self, TemplateError> {
        let source = source.into();
        delimiters.validate()?;

        let found = scanner::scan(&source.joined(), &delimiters)?;
        scanner::check_ambiguity(&found)?;

        Ok(Self {
            source,
            delimiters,
            placeholders: found.into_iter().map(|p| p.name).collect(),
            values: HashMap::new(),
            default_value: None,
            errors: Vec::new(),
        })
    }

    /// Set the value used for placeholders left unassigned at render time
    pub fn with_default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    /// `None` leaves unassigned placeholders verbatim
    pub fn set_default_value(&mut self, value: Option<String>) {
        self.default_value = value;
    }

    pub fn source(&self) -> &TemplateSource {
        &self.source
    }

    pub fn delimiters(&self) -> &Delimiters {
        &self.delimiters
    }

    /// Canonical placeholder names in the order they first appear
    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    /// The literal token for a placeholder, using its canonical spelling
    pub fn token_for(&self, key: &str) -> Result<String, TemplateError> {
        self.resolve_key(key).map(|k| self.delimiters.wrap(k))
    }

    /// Map a caller-supplied name to its canonical placeholder name
    ///
    /// An exact match wins; otherwise the first case-insensitive match is used.
    pub fn resolve_key(&self, name: &str) -> Result<&str, TemplateError> {
        if let Some(key) = self.placeholders.iter().find(|k| *k == name) {
            return Ok(key.as_str());
        }
        let folded = fold(name);
        self.placeholders
            .iter()
            .find(|k| fold(k) == folded)
            .map(|k| k.as_str())
            .ok_or_else(|| TemplateError::unknown(name))
    }

    /// Assign a value, failing on names the template does not declare
    pub fn set_value(&mut self, key: &str, value: impl ToString) -> Result<(), TemplateError> {
        let canonical = self.resolve_key(key)?.to_string();
        tracing::trace!(key = %canonical, "assigned placeholder value");
        self.values.insert(canonical, value.to_string());
        Ok(())
    }

    pub fn has_value(&self, key: &str) -> bool {
        self.resolve_key(key)
            .map(|k| self.values.contains_key(k))
            .unwrap_or(false)
    }

    pub fn get_value(&self, key: &str) -> Option<&str> {
        let canonical = self.resolve_key(key).ok()?;
        self.values.get(canonical).map(|v| v.as_str())
    }

    /// Drop an assigned value; unknown names are ignored
    pub fn unset(&mut self, key: &str) {
        if let Ok(canonical) = self.resolve_key(key) {
            let canonical = canonical.to_string();
            self.values.remove(&canonical);
        }
    }

    /// Assign a value, recording failures in the error log instead of returning them
    pub fn set(&mut self, key: &str, value: impl ToString) -> &mut Self {
        if let Err(e) = self.set_value(key, value) {
            tracing::debug!(error = %e, "recorded assignment failure");
            self.errors.push(e.to_string());
        }
        self
    }

    /// Substitute the assigned values and reset them
    pub fn render(&mut self) -> TemplateSource {
        self.render_with(std::iter::empty::<(&str, &str)>())
    }

    /// Assign `values` tolerantly, then substitute and reset
    ///
    /// Explicit values take precedence over the default value. Tokens with
    /// neither are left untouched.
    pub fn render_with<I, K, V>(&mut self, values: I) -> TemplateSource
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: ToString,
    {
        for (key, value) in values {
            self.set(key.as_ref(), value);
        }

        let replacements = self.working_map();
        tracing::debug!(
            replacements = replacements.len(),
            blobs = self.source.len(),
            "rendering template"
        );

        let output = substitute(&self.source, &replacements);
        self.values.clear();
        output
    }

    /// Token → value for every placeholder that has an assigned or default value
    fn working_map(&self) -> HashMap<String, String> {
        self.placeholders
            .iter()
            .filter_map(|key| {
                self.values
                    .get(key)
                    .or(self.default_value.as_ref())
                    .map(|value| (self.delimiters.wrap(key), value.clone()))
            })
            .collect()
    }

    /// Return every recorded error and clear the log
    pub fn take_errors(&mut self) -> Vec<String> {
        std::mem::take(&mut self.errors)
    }

    /// The most recent error, or `None` if the log is empty
    pub fn last_error(&self) -> Option<&str> {
        self.errors.last().map(|e| e.as_str())
    }
}

/// Replace every token in one pass; the longest token wins at each position and
/// inserted values are never rescanned.
fn substitute(source: &TemplateSource, replacements: &HashMap<String, String>) -> TemplateSource {
    if replacements.is_empty() {
        return source.clone();
    }

    let mut tokens: Vec<&str> = replacements.keys().map(|t| t.as_str()).collect();
    tokens.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let alternation = tokens
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");

    match RegexBuilder::new(&alternation)
        .size_limit(PATTERN_SIZE_LIMIT)
        .build()
    {
        Ok(pattern) => source.map(|blob| {
            pattern
                .replace_all(blob, |caps: &Captures| {
                    replacements
                        .get(&caps[0])
                        .cloned()
                        .unwrap_or_else(|| caps[0].to_string())
                })
                .into_owned()
        }),
        Err(e) => {
            tracing::warn!(error = %e, "substitution pattern too large, using linear scan");
            source.map(|blob| substitute_linear(blob, &tokens, replacements))
        }
    }
}

/// `tokens` must be sorted longest first
fn substitute_linear(text: &str, tokens: &[&str], replacements: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(ch) = rest.chars().next() {
        match tokens.iter().find(|t| rest.starts_with(*t)) {
            Some(token) => {
                if let Some(value) = replacements.get(*token) {
                    out.push_str(value);
                }
                rest = &rest[token.len()..];
            }
            None => {
                out.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(text: &str) -> TemplateEngine {
        TemplateEngine::new(text, Delimiters::default()).expect("valid template")
    }

    #[test]
    fn test_new_collects_placeholders() {
        let e = engine("{{a}} {{b}} {{a}}");
        assert_eq!(e.placeholders(), &["a".to_string(), "b".to_string()]);
        assert_eq!(e.default_value(), None);
        assert_eq!(e.last_error(), None);
    }

    #[test]
    fn test_new_rejects_ambiguous() {
        let err = TemplateEngine::new("{{foo}} {{FOO}}", Delimiters::default()).unwrap_err();
        assert!(matches!(err, TemplateError::AmbiguousPlaceholders { .. }));
    }

    #[test]
    fn test_new_rejects_empty_delimiter() {
        let err = TemplateEngine::new("x", Delimiters::new("")).unwrap_err();
        assert_eq!(err, TemplateError::EmptyDelimiter);
    }

    #[test]
    fn test_new_with_huge_delimiter_does_not_panic() {
        let delimiters = Delimiters::pair("<".repeat(2_000_000), ">");
        let result = std::panic::catch_unwind(|| TemplateEngine::new("x", delimiters));
        match result.expect("construction must not panic") {
            Ok(e) => assert!(e.placeholders().is_empty()),
            Err(err) => assert!(matches!(err, TemplateError::InvalidDelimiter { .. })),
        }
    }

    #[test]
    fn test_resolve_key_expanding_fold() {
        let e = engine("{{STRASSE}}");
        assert_eq!(e.resolve_key("straße").unwrap(), "STRASSE");
    }

    #[test]
    fn test_new_does_not_match_across_blobs() {
        let e = TemplateEngine::new(vec!["a {{", "b}}"], Delimiters::default()).unwrap();
        assert!(e.placeholders().is_empty());
    }

    #[test]
    fn test_resolve_key_exact_and_folded() {
        let e = engine("{{FOO}}");
        assert_eq!(e.resolve_key("FOO").unwrap(), "FOO");
        assert_eq!(e.resolve_key("foo").unwrap(), "FOO");
        assert_eq!(e.resolve_key("fOo").unwrap(), "FOO");
        assert_eq!(
            e.resolve_key("bar").unwrap_err(),
            TemplateError::unknown("bar")
        );
    }

    #[test]
    fn test_set_value_overwrites() {
        let mut e = engine("{{foo}}");
        e.set_value("foo", "one").unwrap();
        e.set_value("FOO", "two").unwrap();
        assert_eq!(e.get_value("foo"), Some("two"));
    }

    #[test]
    fn test_set_value_coerces_to_string() {
        let mut e = engine("{{n}}");
        e.set_value("n", 42).unwrap();
        assert_eq!(e.get_value("n"), Some("42"));
    }

    #[test]
    fn test_has_and_get_never_fail() {
        let mut e = engine("{{foo}}");
        assert!(!e.has_value("foo"));
        assert!(!e.has_value("missing"));
        assert_eq!(e.get_value("missing"), None);
        e.set_value("foo", "x").unwrap();
        assert!(e.has_value("Foo"));
    }

    #[test]
    fn test_unset() {
        let mut e = engine("{{foo}}");
        e.set_value("foo", "x").unwrap();
        e.unset("nope");
        assert!(e.has_value("foo"));
        e.unset("FOO");
        assert!(!e.has_value("foo"));
    }

    #[test]
    fn test_set_is_tolerant_and_chainable() {
        let mut e = engine("{{a}} {{b}}");
        e.set("a", "1").set("zzz", "2").set("b", "3");
        assert_eq!(e.get_value("a"), Some("1"));
        assert_eq!(e.get_value("b"), Some("3"));
        assert_eq!(e.last_error(), Some("unknown placeholder 'zzz'"));
    }

    #[test]
    fn test_take_errors_clears_log() {
        let mut e = engine("{{a}}");
        e.set("x", "1").set("y", "2");
        assert_eq!(
            e.take_errors(),
            vec!["unknown placeholder 'x'", "unknown placeholder 'y'"]
        );
        assert!(e.take_errors().is_empty());
        assert_eq!(e.last_error(), None);
    }

    #[test]
    fn test_last_error_does_not_clear() {
        let mut e = engine("{{a}}");
        e.set("x", "1");
        assert!(e.last_error().is_some());
        assert!(e.last_error().is_some());
        assert_eq!(e.take_errors().len(), 1);
    }

    #[test]
    fn test_render_replaces_and_resets() {
        let mut e = engine("Hello {{name}}!");
        e.set_value("name", "world").unwrap();
        assert_eq!(e.render(), TemplateSource::from("Hello world!"));
        assert_eq!(e.render(), TemplateSource::from("Hello {{name}}!"));
    }

    #[test]
    fn test_render_with_last_chance_values() {
        let mut e = engine("{{a}}-{{b}}");
        e.set_value("a", "early").unwrap();
        let out = e.render_with([("A", "late"), ("b", "2"), ("c", "3")]);
        assert_eq!(out, TemplateSource::from("late-2"));
        assert_eq!(e.last_error(), Some("unknown placeholder 'c'"));
        assert!(!e.has_value("a"));
    }

    #[test]
    fn test_render_default_fills_unassigned() {
        let mut e = engine("{{a}} {{b}}").with_default_value("-");
        e.set_value("a", "x").unwrap();
        assert_eq!(e.render(), TemplateSource::from("x -"));
        assert_eq!(e.render(), TemplateSource::from("- -"));
    }

    #[test]
    fn test_render_empty_default_is_distinct_from_unset() {
        let mut e = engine("[{{a}}]");
        assert_eq!(e.render(), TemplateSource::from("[{{a}}]"));
        e.set_default_value(Some(String::new()));
        assert_eq!(e.render(), TemplateSource::from("[]"));
        e.set_default_value(None);
        assert_eq!(e.render(), TemplateSource::from("[{{a}}]"));
    }

    #[test]
    fn test_render_does_not_rescan_values() {
        let mut e = engine("{{a}} {{b}}");
        e.set_value("a", "{{b}}").unwrap();
        e.set_value("b", "B").unwrap();
        assert_eq!(e.render(), TemplateSource::from("{{b}} B"));
    }

    #[test]
    fn test_render_uses_canonical_token_case() {
        let mut e = engine("{{Name}} and {{name }}");
        e.set_value("NAME", "x").unwrap();
        assert_eq!(e.render(), TemplateSource::from("x and {{name }}"));
    }

    #[test]
    fn test_token_for() {
        let e = TemplateEngine::new("<<Id>>", Delimiters::pair("<<", ">>")).unwrap();
        assert_eq!(e.token_for("id").unwrap(), "<<Id>>");
        assert!(e.token_for("nope").is_err());
    }

    #[test]
    fn test_substitute_prefers_longest_token() {
        let replacements: HashMap<String, String> = [
            ("%a%".to_string(), "1".to_string()),
            ("%a%b%".to_string(), "2".to_string()),
        ]
        .into_iter()
        .collect();
        let out = substitute(&TemplateSource::from("%a%b% %a%"), &replacements);
        assert_eq!(out, TemplateSource::from("2 1"));
    }

    #[test]
    fn test_substitute_linear_matches_regex_path() {
        let replacements: HashMap<String, String> = [
            ("{{a}}".to_string(), "ä".to_string()),
            ("{{bb}}".to_string(), "B".to_string()),
        ]
        .into_iter()
        .collect();
        let tokens = ["{{bb}}", "{{a}}"];
        let text = "ü{{a}}-{{bb}}-{{c}}";
        assert_eq!(
            substitute_linear(text, &tokens, &replacements),
            substitute(&TemplateSource::from(text), &replacements).into_string()
        );
    }
}
