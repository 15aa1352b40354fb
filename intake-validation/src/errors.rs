// Validation errors

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Name of a validation rule, used as the key of a failure.
///
/// The set is closed: every rule the engine knows about has a variant here,
/// so message lookups can never hit an unknown name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKey {
    Required,
    MinLength,
    MaxLength,
    Email,
    Pattern,
    Range,
    Match,
    OneOf,
}

impl ErrorKey {
    /// All known keys, in declaration order
    pub const ALL: [ErrorKey; 8] = [
        ErrorKey::Required,
        ErrorKey::MinLength,
        ErrorKey::MaxLength,
        ErrorKey::Email,
        ErrorKey::Pattern,
        ErrorKey::Range,
        ErrorKey::Match,
        ErrorKey::OneOf,
    ];

    /// Wire name of the key
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKey::Required => "required",
            ErrorKey::MinLength => "minlength",
            ErrorKey::MaxLength => "maxlength",
            ErrorKey::Email => "email",
            ErrorKey::Pattern => "pattern",
            ErrorKey::Range => "range",
            ErrorKey::Match => "match",
            ErrorKey::OneOf => "oneof",
        }
    }
}

impl fmt::Display for ErrorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a name that is not a known rule
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown validation key: {0}")]
pub struct UnknownKey(pub String);

impl FromStr for ErrorKey {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownKey(s.to_string()))
    }
}

/// Detail attached to a failed rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    /// Plain failure marker (serializes as `true`)
    Flag(bool),

    /// String length bound violated
    #[serde(rename_all = "camelCase")]
    Length {
        required_length: usize,
        actual_length: usize,
    },

    /// Numeric bounds violated
    Range { min: f64, max: f64 },

    /// Pattern mismatch
    #[serde(rename_all = "camelCase")]
    Pattern {
        required_pattern: String,
        actual_value: String,
    },

    /// Value outside an enumeration
    OneOf { allowed: Vec<String> },
}

impl ErrorDetail {
    /// The plain failure marker
    pub fn flag() -> Self {
        ErrorDetail::Flag(true)
    }
}

/// Failures of a node, keyed by rule name.
///
/// An empty set means the node passed every attached rule.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<ErrorKey, ErrorDetail>,
}

impl ValidationErrors {
    /// Create an empty error set
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if there are any errors
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Record a failure. A later failure for the same key replaces the earlier one.
    pub fn add(&mut self, key: ErrorKey, detail: ErrorDetail) {
        self.errors.insert(key, detail);
    }

    /// Check whether a rule failed
    pub fn contains(&self, key: ErrorKey) -> bool {
        self.errors.contains_key(&key)
    }

    /// Detail for a failed rule
    pub fn get(&self, key: ErrorKey) -> Option<&ErrorDetail> {
        self.errors.get(&key)
    }

    /// Failed rule names, in key order
    pub fn keys(&self) -> impl Iterator<Item = ErrorKey> + '_ {
        self.errors.keys().copied()
    }

    /// Iterate over failures
    pub fn iter(&self) -> impl Iterator<Item = (ErrorKey, &ErrorDetail)> {
        self.errors.iter().map(|(k, v)| (*k, v))
    }

    /// `None` when empty, which is how nodes expose "no errors"
    pub fn into_option(self) -> Option<Self> {
        if self.is_empty() { None } else { Some(self) }
    }

    /// Convert to JSON representation
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&str> = self.errors.keys().map(|k| k.as_str()).collect();
        write!(f, "{}", keys.join(", "))
    }
}

impl FromIterator<(ErrorKey, ErrorDetail)> for ValidationErrors {
    fn from_iter<I: IntoIterator<Item = (ErrorKey, ErrorDetail)>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}
