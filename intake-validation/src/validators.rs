// Built-in validators

use crate::{Control, ErrorDetail, ErrorKey, FieldValue, Rule, Validator};
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$").unwrap()
});

static NULL: FieldValue = FieldValue::Null;

fn scalar_of(control: &dyn Control) -> &FieldValue {
    control.scalar().unwrap_or(&NULL)
}

// Presence

/// Fails on null or empty text
pub struct Required;

impl Rule for Required {
    fn key(&self) -> ErrorKey {
        ErrorKey::Required
    }

    fn check(&self, control: &dyn Control) -> Option<ErrorDetail> {
        scalar_of(control).is_empty().then(ErrorDetail::flag)
    }
}

// String validators

/// Minimum character count. Empty values are left to [`Required`].
pub struct MinLength(pub usize);

impl Rule for MinLength {
    fn key(&self) -> ErrorKey {
        ErrorKey::MinLength
    }

    fn check(&self, control: &dyn Control) -> Option<ErrorDetail> {
        let text = scalar_of(control).as_text().filter(|s| !s.is_empty())?;
        let actual_length = text.chars().count();
        (actual_length < self.0).then_some(ErrorDetail::Length {
            required_length: self.0,
            actual_length,
        })
    }
}

/// Maximum character count
pub struct MaxLength(pub usize);

impl Rule for MaxLength {
    fn key(&self) -> ErrorKey {
        ErrorKey::MaxLength
    }

    fn check(&self, control: &dyn Control) -> Option<ErrorDetail> {
        let text = scalar_of(control).as_text()?;
        let actual_length = text.chars().count();
        (actual_length > self.0).then_some(ErrorDetail::Length {
            required_length: self.0,
            actual_length,
        })
    }
}

/// Well-formed email address. Empty values are left to [`Required`].
pub struct IsEmail;

impl Rule for IsEmail {
    fn key(&self) -> ErrorKey {
        ErrorKey::Email
    }

    fn check(&self, control: &dyn Control) -> Option<ErrorDetail> {
        let value = scalar_of(control);
        if value.is_empty() {
            return None;
        }
        match value.as_text() {
            Some(text) if EMAIL_REGEX.is_match(text) => None,
            _ => Some(ErrorDetail::flag()),
        }
    }
}

/// Whole-value regex match. Empty values are left to [`Required`].
pub struct Matches {
    regex: Regex,
    source: String,
}

impl Matches {
    /// Compile a pattern, anchoring it at both ends unless it already is.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let anchored = if pattern.starts_with('^') && pattern.ends_with('$') {
            pattern.to_string()
        } else {
            format!("^(?:{})$", pattern)
        };
        Ok(Self {
            regex: Regex::new(&anchored)?,
            source: anchored,
        })
    }
}

impl Rule for Matches {
    fn key(&self) -> ErrorKey {
        ErrorKey::Pattern
    }

    fn check(&self, control: &dyn Control) -> Option<ErrorDetail> {
        let value = scalar_of(control);
        if value.is_empty() {
            return None;
        }
        let actual = value.to_string();
        (!self.regex.is_match(&actual)).then(|| ErrorDetail::Pattern {
            required_pattern: self.source.clone(),
            actual_value: actual,
        })
    }
}

// Number validators

/// Inclusive numeric range.
///
/// Null passes, leaving missing values to [`Required`]. Anything without a
/// numeric reading fails.
pub struct InRange {
    pub min: f64,
    pub max: f64,
}

impl Rule for InRange {
    fn key(&self) -> ErrorKey {
        ErrorKey::Range
    }

    fn check(&self, control: &dyn Control) -> Option<ErrorDetail> {
        let value = scalar_of(control);
        if value.is_null() {
            return None;
        }
        match value.as_number() {
            Some(n) if n >= self.min && n <= self.max => None,
            _ => Some(ErrorDetail::Range {
                min: self.min,
                max: self.max,
            }),
        }
    }
}

// Enumerations

/// Text value restricted to a fixed set. Empty values are left to [`Required`].
pub struct OneOf(pub Vec<String>);

impl Rule for OneOf {
    fn key(&self) -> ErrorKey {
        ErrorKey::OneOf
    }

    fn check(&self, control: &dyn Control) -> Option<ErrorDetail> {
        let value = scalar_of(control);
        if value.is_empty() {
            return None;
        }
        match value.as_text() {
            Some(text) if self.0.iter().any(|allowed| allowed == text) => None,
            _ => Some(ErrorDetail::OneOf {
                allowed: self.0.clone(),
            }),
        }
    }
}

// Cross-field validators

/// Two named children of a group must hold equal values.
///
/// Stays silent while either child is pristine, so the mismatch is only
/// reported once the user has filled in both.
pub struct FieldsMatch {
    pub first: String,
    pub second: String,
}

impl Rule for FieldsMatch {
    fn key(&self) -> ErrorKey {
        ErrorKey::Match
    }

    fn check(&self, control: &dyn Control) -> Option<ErrorDetail> {
        let first = control.child(&self.first)?;
        let second = control.child(&self.second)?;

        if first.is_pristine() || second.is_pristine() {
            return None;
        }
        (first.scalar() != second.scalar()).then(ErrorDetail::flag)
    }
}

// Factories

/// Value must be present
pub fn required() -> Validator {
    Validator::new(Required)
}

/// Text must have at least `n` characters
pub fn min_length(n: usize) -> Validator {
    Validator::new(MinLength(n))
}

/// Text must have at most `n` characters
pub fn max_length(n: usize) -> Validator {
    Validator::new(MaxLength(n))
}

/// Text must be a well-formed email address
pub fn email() -> Validator {
    Validator::new(IsEmail)
}

/// Value must match `pattern` as a whole
pub fn pattern(pattern: &str) -> Result<Validator, regex::Error> {
    Ok(Validator::new(Matches::new(pattern)?))
}

/// Number within `[min, max]`; null passes
pub fn range(min: f64, max: f64) -> Validator {
    Validator::new(InRange { min, max })
}

/// Text must be one of `allowed`
pub fn one_of(allowed: &[&str]) -> Validator {
    Validator::new(OneOf(allowed.iter().map(|s| s.to_string()).collect()))
}

/// Group children `first` and `second` must match once both are dirty
pub fn matching(first: &str, second: &str) -> Validator {
    Validator::new(FieldsMatch {
        first: first.to_string(),
        second: second.to_string(),
    })
}
