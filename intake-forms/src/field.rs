// Leaf form node

use crate::Status;
use intake_validation::{Control, ErrorKey, FieldValue, ValidationErrors, Validator, ValidatorSet};

/// A single scalar value with its validators and interaction state.
///
/// Swapping validators does not re-run them; call [`FieldNode::revalidate`]
/// once the new set should take effect.
#[derive(Debug, Clone)]
pub struct FieldNode {
    value: FieldValue,
    initial: FieldValue,
    validators: ValidatorSet,
    errors: Option<ValidationErrors>,
    status: Status,
    dirty: bool,
    touched: bool,
    disabled: bool,
}

impl FieldNode {
    /// Create a field without validators
    pub fn new(initial: impl Into<FieldValue>) -> Self {
        Self::with_validators(initial, ValidatorSet::new())
    }

    /// Create a field and validate its initial value
    pub fn with_validators(initial: impl Into<FieldValue>, validators: impl Into<ValidatorSet>) -> Self {
        let initial = initial.into();
        let mut field = Self {
            value: initial.clone(),
            initial,
            validators: validators.into(),
            errors: None,
            status: Status::Valid,
            dirty: false,
            touched: false,
            disabled: false,
        };
        field.revalidate();
        field
    }

    /// Current value
    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    /// Replace the value, mark the field dirty and re-run its validators.
    pub fn set_value(&mut self, value: impl Into<FieldValue>) {
        self.value = value.into();
        self.dirty = true;
        self.revalidate();
    }

    /// Attached validators
    pub fn validators(&self) -> &ValidatorSet {
        &self.validators
    }

    /// Replace the validator set. Takes effect on the next [`revalidate`](Self::revalidate).
    pub fn set_validators(&mut self, validators: impl Into<ValidatorSet>) {
        self.validators = validators.into();
    }

    /// Drop every validator. Takes effect on the next [`revalidate`](Self::revalidate).
    pub fn clear_validators(&mut self) {
        self.validators = ValidatorSet::new();
    }

    /// Append a validator. Takes effect on the next [`revalidate`](Self::revalidate).
    pub fn add_validator(&mut self, validator: Validator) {
        self.validators.push(validator);
    }

    /// Re-run the current validators against the current value
    pub fn revalidate(&mut self) {
        if self.disabled {
            self.errors = None;
            self.status = Status::Disabled;
            return;
        }

        self.errors = self.validators.run(&*self).into_option();
        self.status = Status::aggregate(self.errors.is_some(), []);
    }

    /// Current failures, `None` when valid
    pub fn errors(&self) -> Option<&ValidationErrors> {
        self.errors.as_ref()
    }

    /// Whether a specific rule currently fails
    pub fn has_error(&self, key: ErrorKey) -> bool {
        self.errors.as_ref().is_some_and(|e| e.contains(key))
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_valid(&self) -> bool {
        self.status == Status::Valid
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_pristine(&self) -> bool {
        !self.dirty
    }

    pub fn is_touched(&self) -> bool {
        self.touched
    }

    /// Record that the field lost focus. Does not revalidate.
    pub fn mark_touched(&mut self) {
        self.touched = true;
    }

    /// Restore the initial value and clear the interaction flags
    pub fn reset(&mut self) {
        self.value = self.initial.clone();
        self.dirty = false;
        self.touched = false;
        self.revalidate();
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Exclude the field from validation and from its parent's value
    pub fn disable(&mut self) {
        self.disabled = true;
        self.revalidate();
    }

    pub fn enable(&mut self) {
        self.disabled = false;
        self.revalidate();
    }
}

impl Control for FieldNode {
    fn scalar(&self) -> Option<&FieldValue> {
        Some(&self.value)
    }

    fn is_pristine(&self) -> bool {
        !self.dirty
    }

    fn child(&self, _name: &str) -> Option<&dyn Control> {
        None
    }
}
