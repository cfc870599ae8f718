//! Map-style access to placeholder values

use super::engine::TemplateEngine;
use crate::error::TemplateError;

/// Container-like view over the values assigned to a template
///
/// Lookups and removals never fail; only `insert` reports unknown names.
pub trait PlaceholderAccess {
    fn contains(&self, key: &str) -> bool;
    fn get(&self, key: &str) -> Option<&str>;
    fn insert(&mut self, key: &str, value: &str) -> Result<(), TemplateError>;
    fn remove(&mut self, key: &str);
}

impl PlaceholderAccess for TemplateEngine {
    fn contains(&self, key: &str) -> bool {
        self.has_value(key)
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.get_value(key)
    }

    fn insert(&mut self, key: &str, value: &str) -> Result<(), TemplateError> {
        self.set_value(key, value)
    }

    fn remove(&mut self, key: &str) {
        self.unset(key)
    }
}
