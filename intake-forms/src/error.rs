// Structural errors for the form tree

use intake_validation::UnknownKey;
use thiserror::Error;

/// Misuse of the form tree.
///
/// These signal a mismatch between caller code and the schema. Failing
/// validators are never reported here; they live in a node's errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Control not found: {0}")]
    NotFound(String),

    #[error("Index {index} out of range for collection of length {len}")]
    OutOfRange { index: usize, len: usize },

    #[error("Control is not a field: {0}")]
    NotAField(String),

    #[error("Control is not a group: {0}")]
    NotAGroup(String),

    #[error("Control is not a collection: {0}")]
    NotACollection(String),

    #[error("Invalid patch at '{path}': {reason}")]
    InvalidPatch { path: String, reason: String },

    #[error(transparent)]
    UnknownErrorKey(#[from] UnknownKey),
}

impl FormError {
    pub(crate) fn invalid_patch(path: &str, reason: impl Into<String>) -> Self {
        FormError::InvalidPatch {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FormError>;
