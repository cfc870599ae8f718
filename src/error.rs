//! Error types for template construction and value assignment

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in the scanned template text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// The template payload is neither a string nor a sequence of strings
    #[error("invalid template type: expected a string or an array of strings, found {found}")]
    InvalidTemplateType { found: String },

    /// The open or close delimiter is empty
    #[error("delimiters must not be empty")]
    EmptyDelimiter,

    /// The delimiters cannot be compiled into a scanning pattern
    #[error("invalid delimiters: {message}")]
    InvalidDelimiter { message: String },

    /// Two or more placeholder names differ only by case
    #[error("ambiguous placeholders: {}", names.join(", "))]
    AmbiguousPlaceholders { names: Vec<String>, spans: Vec<Span> },

    /// A key that does not resolve to any placeholder of the template
    #[error("unknown placeholder '{name}'")]
    UnknownPlaceholder { name: String },
}

impl TemplateError {
    pub fn invalid_type(found: impl Into<String>) -> Self {
        Self::InvalidTemplateType {
            found: found.into(),
        }
    }

    pub fn invalid_delimiter(message: impl Into<String>) -> Self {
        Self::InvalidDelimiter {
            message: message.into(),
        }
    }

    pub fn unknown(name: impl Into<String>) -> Self {
        Self::UnknownPlaceholder { name: name.into() }
    }

    /// Spans of the offending placeholders, if any
    pub fn spans(&self) -> &[Span] {
        match self {
            Self::AmbiguousPlaceholders { spans, .. } => spans,
            _ => &[],
        }
    }

    /// Format the error with source context using ariadne
    ///
    /// `source` must be the text the spans point into: the template itself, or the
    /// blobs of a multi-part template joined with `'\n'`.
    pub fn format(&self, source: &str, filename: &str) -> String {
        let mut buf = Vec::new();
        let offset = self
            .spans()
            .first()
            .map(|s| char_offset(source, s.start))
            .unwrap_or(0);

        let mut report =
            Report::build(ReportKind::Error, filename, offset).with_message(self.to_string());

        if let Self::AmbiguousPlaceholders { names, spans } = self {
            for (name, span) in names.iter().zip(spans) {
                let range = char_offset(source, span.start)..char_offset(source, span.end);
                report = report.with_label(
                    Label::new((filename, range))
                        .with_message(format!("'{}' first declared here", name))
                        .with_color(Color::Red),
                );
            }
            report = report.with_help("placeholder names are matched case-insensitively");
        }

        if report
            .finish()
            .write((filename, Source::from(source)), &mut buf)
            .is_err()
        {
            return self.to_string();
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

/// ariadne counts characters, the scanner reports bytes
fn char_offset(source: &str, byte: usize) -> usize {
    source
        .get(..byte)
        .map(|prefix| prefix.chars().count())
        .unwrap_or_else(|| source.chars().count())
}
