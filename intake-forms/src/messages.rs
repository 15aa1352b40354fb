//! Validation message catalog
//!
//! Maps each closed [`ErrorKey`] to a human-readable template and renders it
//! with the detail of a failure. Templates may reference `{requiredLength}`,
//! `{actualLength}`, `{min}`, `{max}`, `{requiredPattern}` and `{allowed}`;
//! placeholders without a matching detail are left as written.

use crate::{Node, Result};
use intake_validation::{ErrorDetail, ErrorKey};
use std::collections::BTreeMap;

/// Templates keyed by error key
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    templates: BTreeMap<ErrorKey, String>,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        let templates = [
            (ErrorKey::Required, "This field is required."),
            (ErrorKey::MinLength, "Please enter at least {requiredLength} characters."),
            (ErrorKey::MaxLength, "Please enter no more than {requiredLength} characters."),
            (ErrorKey::Email, "Please enter a valid email address."),
            (ErrorKey::Pattern, "Please match the requested format."),
            (ErrorKey::Range, "Please enter a value between {min} and {max}."),
            (ErrorKey::Match, "The confirmation does not match."),
            (ErrorKey::OneOf, "Please choose one of: {allowed}."),
        ]
        .into_iter()
        .map(|(key, template)| (key, template.to_string()))
        .collect();

        Self { templates }
    }
}

impl MessageCatalog {
    /// Catalog with the built-in English templates
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog without any template
    pub fn empty() -> Self {
        Self {
            templates: BTreeMap::new(),
        }
    }

    /// Build a catalog from string keys, rejecting any key outside the closed set
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut catalog = Self::empty();
        for (key, template) in pairs {
            catalog.register(key, template)?;
        }
        Ok(catalog)
    }

    /// Register a template under a string key.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownErrorKey`](crate::FormError::UnknownErrorKey)
    /// when `key` names no known rule.
    pub fn register(&mut self, key: &str, template: impl Into<String>) -> Result<()> {
        let key: ErrorKey = key.parse()?;
        self.templates.insert(key, template.into());
        Ok(())
    }

    /// Set a template, builder style
    pub fn with(mut self, key: ErrorKey, template: impl Into<String>) -> Self {
        self.templates.insert(key, template.into());
        self
    }

    pub fn template(&self, key: ErrorKey) -> Option<&str> {
        self.templates.get(&key).map(String::as_str)
    }

    /// Render the message for one failure. Keys without a template render as `None`.
    pub fn render(&self, key: ErrorKey, detail: &ErrorDetail) -> Option<String> {
        let template = self.template(key)?;
        let message = match detail {
            ErrorDetail::Flag(_) => template.to_string(),
            ErrorDetail::Length {
                required_length,
                actual_length,
            } => template
                .replace("{requiredLength}", &required_length.to_string())
                .replace("{actualLength}", &actual_length.to_string()),
            ErrorDetail::Range { min, max } => template
                .replace("{min}", &min.to_string())
                .replace("{max}", &max.to_string()),
            ErrorDetail::Pattern {
                required_pattern, ..
            } => template.replace("{requiredPattern}", required_pattern),
            ErrorDetail::OneOf { allowed } => template.replace("{allowed}", &allowed.join(", ")),
        };
        Some(message)
    }

    /// Message for a node, or `None` when nothing should be shown.
    ///
    /// A message appears only once the user has interacted with the node
    /// (touched or dirty) and the node has failures. Messages for several
    /// failures are joined with a space in key order.
    pub fn message_for(&self, node: &Node) -> Option<String> {
        if !(node.is_touched() || node.is_dirty()) {
            return None;
        }

        let errors = node.errors()?;
        let parts: Vec<String> = errors
            .iter()
            .filter_map(|(key, detail)| self.render(key, detail))
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}
