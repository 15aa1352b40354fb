// Error types for the customer intake form

use intake_config::ConfigError;
use intake_forms::FormError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Save failed: {0}")]
    Sink(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, IntakeError>;
