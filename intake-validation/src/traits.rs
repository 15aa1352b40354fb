// Validation traits

use crate::{ErrorDetail, ErrorKey, FieldValue};
use std::fmt;
use std::sync::Arc;

/// Read-only view of a form node, as seen by validators.
///
/// Scalar rules read [`Control::scalar`]; cross-field rules walk
/// [`Control::child`] on a group.
pub trait Control {
    /// Scalar value of a field. Groups and collections have none.
    fn scalar(&self) -> Option<&FieldValue>;

    /// Whether the node's value has never been changed
    fn is_pristine(&self) -> bool;

    /// Direct child by name (or by index for collections)
    fn child(&self, name: &str) -> Option<&dyn Control>;
}

/// A single validation rule
pub trait Rule: Send + Sync {
    /// Key under which a failure is reported
    fn key(&self) -> ErrorKey;

    /// Check the control; `Some` means the rule failed
    fn check(&self, control: &dyn Control) -> Option<ErrorDetail>;
}

/// A bound, shareable validation rule.
///
/// Cloning is cheap; the same validator may be attached to many nodes.
#[derive(Clone)]
pub struct Validator {
    rule: Arc<dyn Rule>,
}

impl Validator {
    /// Wrap a rule
    pub fn new<R: Rule + 'static>(rule: R) -> Self {
        Self {
            rule: Arc::new(rule),
        }
    }

    /// Build a validator from a closure
    pub fn custom<F>(key: ErrorKey, check: F) -> Self
    where
        F: Fn(&dyn Control) -> Option<ErrorDetail> + Send + Sync + 'static,
    {
        Self::new(FnRule { key, check })
    }

    /// Key under which a failure is reported
    pub fn key(&self) -> ErrorKey {
        self.rule.key()
    }

    /// Run the rule
    pub fn validate(&self, control: &dyn Control) -> Option<ErrorDetail> {
        self.rule.check(control)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Validator").field(&self.key()).finish()
    }
}

struct FnRule<F> {
    key: ErrorKey,
    check: F,
}

impl<F> Rule for FnRule<F>
where
    F: Fn(&dyn Control) -> Option<ErrorDetail> + Send + Sync,
{
    fn key(&self) -> ErrorKey {
        self.key
    }

    fn check(&self, control: &dyn Control) -> Option<ErrorDetail> {
        (self.check)(control)
    }
}

/// A detached scalar, handy for checking a value without a form tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarControl {
    pub value: FieldValue,
    pub pristine: bool,
}

impl ScalarControl {
    /// A dirty control holding `value`
    pub fn new(value: impl Into<FieldValue>) -> Self {
        Self {
            value: value.into(),
            pristine: false,
        }
    }
}

impl Control for ScalarControl {
    fn scalar(&self) -> Option<&FieldValue> {
        Some(&self.value)
    }

    fn is_pristine(&self) -> bool {
        self.pristine
    }

    fn child(&self, _name: &str) -> Option<&dyn Control> {
        None
    }
}
