//! Validation rules for the customer intake form
//!
//! Provides the scalar value model, the closed set of rule names, built-in
//! validators and the [`ValidatorSet`] attached to each form node.
//!
//! # Examples
//!
//! ## Field Rules
//!
//! ```
//! use intake_validation::{validators, ErrorKey, ScalarControl, ValidatorSet};
//!
//! let rules = ValidatorSet::new()
//!     .add(validators::required())
//!     .add(validators::min_length(3));
//!
//! assert!(rules.run(&ScalarControl::new("Jack")).is_empty());
//!
//! let errors = rules.run(&ScalarControl::new(""));
//! assert!(errors.contains(ErrorKey::Required));
//! ```
//!
//! ## Number Ranges
//!
//! ```
//! use intake_validation::{validators, FieldValue, ScalarControl};
//!
//! let rating = validators::range(1.0, 5.0);
//! assert!(rating.validate(&ScalarControl::new(3)).is_none());
//! assert!(rating.validate(&ScalarControl::new(FieldValue::Null)).is_none());
//! assert!(rating.validate(&ScalarControl::new(6)).is_some());
//! ```
//!
//! ## Custom Rules
//!
//! ```
//! use intake_validation::{ErrorDetail, ErrorKey, ScalarControl, Validator};
//!
//! let no_spaces = Validator::custom(ErrorKey::Pattern, |control| {
//!     let text = control.scalar()?.as_text()?;
//!     text.contains(' ').then(ErrorDetail::flag)
//! });
//! assert!(no_spaces.validate(&ScalarControl::new("a b")).is_some());
//! ```

mod errors;
mod rules;
mod traits;
mod value;
pub mod validators;

pub use errors::*;
pub use rules::*;
pub use traits::*;
pub use validators::{FieldsMatch, InRange, IsEmail, Matches, MaxLength, MinLength, OneOf, Required};
pub use value::*;
