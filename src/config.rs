//! Fill files: delimiters, default value and values in TOML
//!
//! ```toml
//! default = "n/a"
//! template = "Hello {{name}}"
//!
//! [delimiters]
//! open = "{{"
//! close = "}}"
//!
//! [values]
//! name = "world"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::error::TemplateError;
use crate::template::{Delimiters, TemplateEngine, TemplateSource};

/// Errors that can occur when loading a fill file
#[derive(Error, Debug)]
pub enum FillConfigError {
    #[error("Failed to read fill file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse fill file TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid template in fill file: {0}")]
    Template(#[from] TemplateError),
}

/// Everything needed to render a template besides the template text itself
#[derive(Debug, Clone, Default)]
pub struct FillConfig {
    pub delimiters: Delimiters,
    /// Value for placeholders with no assigned value
    pub default: Option<String>,
    /// Inline template, used when no template files are given
    pub template: Option<TemplateSource>,
    /// Values applied at render time, keyed by placeholder name
    pub values: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct TomlFill {
    default: Option<String>,
    template: Option<toml::Value>,
    delimiters: Option<TomlDelimiters>,
    #[serde(default)]
    values: BTreeMap<String, toml::Value>,
}

#[derive(Deserialize)]
struct TomlDelimiters {
    open: String,
    close: Option<String>,
}

impl FillConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a fill file from disk
    pub fn from_file(path: &Path) -> Result<Self, FillConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a fill file from a TOML string
    pub fn from_str(content: &str) -> Result<Self, FillConfigError> {
        let parsed: TomlFill = toml::from_str(content)?;

        let template = parsed
            .template
            .map(TemplateSource::try_from)
            .transpose()?;

        let delimiters = match parsed.delimiters {
            Some(d) => Delimiters::from_parts(d.open, d.close),
            None => Delimiters::default(),
        };

        let values = parsed
            .values
            .into_iter()
            .map(|(key, value)| (key, value_to_string(value)))
            .collect();

        Ok(FillConfig {
            delimiters,
            default: parsed.default,
            template,
            values,
        })
    }

    /// Set the delimiters
    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }

    /// Set the default value
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Add or replace a value
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Build an engine for `source` with this file's delimiters and default
    pub fn engine(&self, source: impl Into<TemplateSource>) -> Result<TemplateEngine, TemplateError> {
        let mut engine = TemplateEngine::new(source, self.delimiters.clone())?;
        engine.set_default_value(self.default.clone());
        Ok(engine)
    }

    /// Build an engine for the inline template, if there is one
    pub fn inline_engine(&self) -> Option<Result<TemplateEngine, TemplateError>> {
        self.template.clone().map(|source| self.engine(source))
    }

    /// Render `engine` with this file's values, recording unknown names in its log
    pub fn render(&self, engine: &mut TemplateEngine) -> TemplateSource {
        engine.render_with(self.values.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }
}

/// Strings are taken verbatim, other scalars use their TOML spelling
fn value_to_string(value: toml::Value) -> String {
    match value {
        toml::Value::String(s) => s,
        other => other.to_string(),
    }
}
