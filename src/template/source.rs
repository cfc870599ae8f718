//! Template payloads and delimiter pairs

use crate::error::TemplateError;

/// A template payload: one text blob or an ordered sequence of blobs
///
/// Rendering returns the same variant that was used to build the engine, so a
/// `Many` of N blobs always comes back as a `Many` of N rendered blobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Single(String),
    Many(Vec<String>),
}

impl TemplateSource {
    /// Number of blobs in the payload
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Many(blobs) => blobs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_single(&self) -> bool {
        matches!(self, Self::Single(_))
    }

    /// Iterate over the blobs in order
    pub fn blobs(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            Self::Single(text) => std::slice::from_ref(text),
            Self::Many(blobs) => blobs,
        };
        slice.iter().map(|s| s.as_str())
    }

    /// All blobs joined by a line break
    ///
    /// Placeholder names never contain whitespace, so the separator keeps a
    /// delimiter at the end of one blob from pairing with one in the next.
    pub fn joined(&self) -> String {
        match self {
            Self::Single(text) => text.clone(),
            Self::Many(blobs) => blobs.join("\n"),
        }
    }

    /// Apply `f` to every blob, keeping the shape
    pub fn map(&self, mut f: impl FnMut(&str) -> String) -> Self {
        match self {
            Self::Single(text) => Self::Single(f(text)),
            Self::Many(blobs) => Self::Many(blobs.iter().map(|b| f(b)).collect()),
        }
    }

    /// Unwrap a single blob, or join a sequence with line breaks
    pub fn into_string(self) -> String {
        match self {
            Self::Single(text) => text,
            Self::Many(blobs) => blobs.join("\n"),
        }
    }

    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::Single(text) => vec![text],
            Self::Many(blobs) => blobs,
        }
    }
}

impl From<String> for TemplateSource {
    fn from(text: String) -> Self {
        Self::Single(text)
    }
}

impl From<&str> for TemplateSource {
    fn from(text: &str) -> Self {
        Self::Single(text.to_string())
    }
}

impl From<Vec<String>> for TemplateSource {
    fn from(blobs: Vec<String>) -> Self {
        Self::Many(blobs)
    }
}

impl From<Vec<&str>> for TemplateSource {
    fn from(blobs: Vec<&str>) -> Self {
        Self::Many(blobs.into_iter().map(String::from).collect())
    }
}

impl TryFrom<toml::Value> for TemplateSource {
    type Error = TemplateError;

    /// Accepts a string or an array whose items are all strings
    fn try_from(value: toml::Value) -> Result<Self, Self::Error> {
        match value {
            toml::Value::String(text) => Ok(Self::Single(text)),
            toml::Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    toml::Value::String(text) => Ok(text),
                    other => Err(TemplateError::invalid_type(format!(
                        "array containing {}",
                        other.type_str()
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Many),
            other => Err(TemplateError::invalid_type(other.type_str())),
        }
    }
}

/// The literal open/close markers around a placeholder name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    pub open: String,
    pub close: String,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self::pair("{{", "}}")
    }
}

impl Delimiters {
    /// Same marker on both sides, e.g. `%%name%%`
    pub fn new(open: impl Into<String>) -> Self {
        let open = open.into();
        Self {
            close: open.clone(),
            open,
        }
    }

    pub fn pair(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    /// Build from an open marker and an optional close marker
    pub fn from_parts(open: impl Into<String>, close: Option<String>) -> Self {
        let delimiters = Self::new(open);
        match close {
            Some(close) => delimiters.with_close(close),
            None => delimiters,
        }
    }

    /// Set the close marker
    pub fn with_close(mut self, close: impl Into<String>) -> Self {
        self.close = close.into();
        self
    }

    /// The literal token for `name`
    pub fn wrap(&self, name: &str) -> String {
        format!("{}{}{}", self.open, name, self.close)
    }

    pub(crate) fn validate(&self) -> Result<(), TemplateError> {
        if self.open.is_empty() || self.close.is_empty() {
            return Err(TemplateError::EmptyDelimiter);
        }
        Ok(())
    }
}
