//! Delimited placeholder templates
//!
//! A template is scanned once for `<open>name<close>` placeholders. Values are
//! assigned by name (case-insensitively), substituted on render, and then
//! discarded so the same template can be rendered again.
//!
//! # Example
//!
//! ```rust
//! use delim_template::template::{Delimiters, TemplateEngine, TemplateSource};
//!
//! let mut engine = TemplateEngine::new("I love {{foo}} and {{bar}}.", Delimiters::default())
//!     .unwrap()
//!     .with_default_value("me");
//!
//! engine.set("FOO", "you");
//! assert_eq!(engine.render(), TemplateSource::from("I love you and me."));
//! ```

mod access;
mod engine;
mod scanner;
mod source;

pub use access::PlaceholderAccess;
pub use engine::TemplateEngine;
pub use scanner::{fold, scan, Placeholder};
pub use source::{Delimiters, TemplateSource};
