//! delim-template - case-insensitive placeholder substitution for static text
//!
//! Templates contain placeholders written as `<open>name<close>`, for example
//! `{{name}}` or `%%name%%`. Values are assigned by name, matched without regard
//! to case, and substituted in a single pass. There are no conditionals, loops
//! or expressions.
//!
//! # Example
//!
//! ```rust
//! use delim_template::render;
//!
//! let text = render("Hello {{Name}}!", [("name", "world")]).unwrap();
//! assert_eq!(text, "Hello world!");
//! ```

pub mod config;
pub mod error;
pub mod template;

pub use config::{FillConfig, FillConfigError};
pub use error::TemplateError;
pub use template::{Delimiters, PlaceholderAccess, TemplateEngine, TemplateSource};

/// Render a single template with `{{` `}}` delimiters
///
/// Names that do not match a placeholder are ignored. Use [`TemplateEngine`]
/// directly to inspect them.
///
/// # Example
///
/// ```rust
/// use delim_template::render;
///
/// let text = render("{{a}} + {{b}} = {{c}}", [("a", "1"), ("b", "2")]).unwrap();
/// assert_eq!(text, "1 + 2 = {{c}}");
/// ```
pub fn render<'a>(
    source: &str,
    values: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Result<String, TemplateError> {
    let mut engine = TemplateEngine::new(source, Delimiters::default())?;
    Ok(engine.render_with(values).into_string())
}

/// Render with the delimiters, default value and values of a fill file
///
/// Returns the output together with the messages for every value that did not
/// match a placeholder.
///
/// # Example
///
/// ```rust
/// use delim_template::{render_with_config, Delimiters, FillConfig, TemplateSource};
///
/// let config = FillConfig::new()
///     .with_delimiters(Delimiters::new("%%"))
///     .with_default("me")
///     .with_value("foo", "you")
///     .with_value("baz", "?");
///
/// let (out, errors) = render_with_config("I love %%foo%% and %%bar%%.", &config).unwrap();
/// assert_eq!(out, TemplateSource::from("I love you and me."));
/// assert_eq!(errors, vec!["unknown placeholder 'baz'"]);
/// ```
pub fn render_with_config(
    source: impl Into<TemplateSource>,
    config: &FillConfig,
) -> Result<(TemplateSource, Vec<String>), TemplateError> {
    let mut engine = config.engine(source)?;
    let output = config.render(&mut engine);
    Ok((output, engine.take_errors()))
}
