// Validator sets attached to form nodes

use crate::{Control, ValidationErrors, Validator};

/// Ordered set of validators attached to a node.
///
/// Running the set never fails; every failing rule contributes one entry to
/// the returned [`ValidationErrors`].
#[derive(Clone, Debug, Default)]
pub struct ValidatorSet {
    validators: Vec<Validator>,
}

impl ValidatorSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validator, builder style
    #[allow(clippy::should_implement_trait)]
    pub fn add(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Add a validator in place
    pub fn push(&mut self, validator: Validator) {
        self.validators.push(validator);
    }

    /// Number of attached validators
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Check if no validator is attached
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Iterate over attached validators
    pub fn iter(&self) -> impl Iterator<Item = &Validator> {
        self.validators.iter()
    }

    /// Run every validator against the control
    pub fn run(&self, control: &dyn Control) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        for validator in &self.validators {
            if let Some(detail) = validator.validate(control) {
                errors.add(validator.key(), detail);
            }
        }

        errors
    }
}

impl From<Vec<Validator>> for ValidatorSet {
    fn from(validators: Vec<Validator>) -> Self {
        Self { validators }
    }
}

impl FromIterator<Validator> for ValidatorSet {
    fn from_iter<I: IntoIterator<Item = Validator>>(iter: I) -> Self {
        Self {
            validators: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::*;
    use crate::{ErrorKey, FieldValue, ScalarControl};

    #[test]
    fn test_validator_set_collects_all_failures() {
        let set = ValidatorSet::new().add(required()).add(min_length(3));

        assert!(set.run(&ScalarControl::new("Jack")).is_empty());

        let errors = set.run(&ScalarControl::new(FieldValue::Null));
        assert!(errors.contains(ErrorKey::Required));
        assert!(!errors.contains(ErrorKey::MinLength));

        let errors = set.run(&ScalarControl::new("Jo"));
        assert_eq!(errors.keys().collect::<Vec<_>>(), vec![ErrorKey::MinLength]);
    }

    #[test]
    fn test_empty_set_never_fails() {
        let set = ValidatorSet::new();
        assert!(set.is_empty());
        assert!(set.run(&ScalarControl::new("")).is_empty());
    }

    #[test]
    fn test_from_vec_keeps_order() {
        let set = ValidatorSet::from(vec![required(), email()]);
        let keys: Vec<_> = set.iter().map(|v| v.key()).collect();
        assert_eq!(keys, vec![ErrorKey::Required, ErrorKey::Email]);
    }
}
