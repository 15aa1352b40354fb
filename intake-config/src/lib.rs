//! Configuration for the customer intake form
//!
//! [`FormConfig`] holds the timing knobs of a form session. Values are
//! layered, later layers winning: built-in defaults, an optional JSON, TOML or
//! `.env`-style file, an optional `.env` file loaded into the process
//! environment, then `INTAKE_`-prefixed environment variables.
//!
//! ```
//! use intake_config::FormConfig;
//! use std::time::Duration;
//!
//! let config = FormConfig::builder()
//!     .without_env()
//!     .set("prefill_delay_ms", 250)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.prefill_delay(), Duration::from_millis(250));
//! assert_eq!(config.message_debounce(), Duration::from_millis(1000));
//! ```

pub mod env;
pub mod error;
pub mod loader;
pub mod validation;

pub use env::EnvLoader;
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use validation::{ConfigValidator, Validate};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Environment variable prefix for form settings
pub const ENV_PREFIX: &str = "INTAKE";

const MAX_PREFILL_DELAY_MS: u64 = 60 * 60 * 1000;

/// Timing configuration of a form session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Apply the test-data patch automatically after `prefill_delay_ms`
    pub prefill_enabled: bool,
    pub prefill_delay_ms: u64,
    /// Quiet period before a validation message is recomputed
    pub message_debounce_ms: u64,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            prefill_enabled: true,
            prefill_delay_ms: 5000,
            message_debounce_ms: 1000,
        }
    }
}

impl FormConfig {
    pub fn builder() -> FormConfigBuilder {
        FormConfigBuilder::new()
    }

    /// Defaults, then `path` if given, then `.env`, then `INTAKE_*` variables
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = Self::builder().load_dotenv(None);
        if let Some(path) = path {
            builder = builder.file(path);
        }
        builder.build()
    }

    pub fn prefill_delay(&self) -> Duration {
        Duration::from_millis(self.prefill_delay_ms)
    }

    pub fn message_debounce(&self) -> Duration {
        Duration::from_millis(self.message_debounce_ms)
    }
}

impl Validate for FormConfig {
    fn validate(&self) -> Result<()> {
        ConfigValidator::non_zero(self.message_debounce_ms, "message_debounce_ms")?;
        ConfigValidator::in_range(self.prefill_delay_ms, 0, MAX_PREFILL_DELAY_MS, "prefill_delay_ms")?;
        Ok(())
    }
}

/// Layered loader for [`FormConfig`]
pub struct FormConfigBuilder {
    file: Option<PathBuf>,
    load_dotenv: bool,
    dotenv_path: Option<String>,
    env_prefix: Option<String>,
    overrides: Map<String, Value>,
}

impl FormConfigBuilder {
    pub fn new() -> Self {
        Self {
            file: None,
            load_dotenv: false,
            dotenv_path: None,
            env_prefix: Some(ENV_PREFIX.to_string()),
            overrides: Map::new(),
        }
    }

    /// Add a configuration file; the format follows the extension
    pub fn file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Load a `.env` file into the environment before reading variables.
    /// Without a path, a missing `.env` is not an error.
    pub fn load_dotenv(mut self, path: Option<String>) -> Self {
        self.load_dotenv = true;
        self.dotenv_path = path;
        self
    }

    /// Use a different environment prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Skip environment variables entirely
    pub fn without_env(mut self) -> Self {
        self.env_prefix = None;
        self
    }

    /// Set one key explicitly. Explicit keys win over every other layer.
    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.overrides.insert(key.to_string(), value.into());
        self
    }

    /// Merge the layers, deserialize and validate
    pub fn build(self) -> Result<FormConfig> {
        let mut merged = Map::new();

        if let Some(ref path) = self.file {
            let data = ConfigLoader::auto(path)?.load_file(path)?;
            debug!("Loaded form configuration from {}", path.display());
            merge(&mut merged, data);
        }

        if self.load_dotenv {
            match self.dotenv_path {
                Some(ref path) => {
                    dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
                }
                None => {
                    dotenvy::dotenv().ok();
                }
            }
        }

        if let Some(prefix) = self.env_prefix {
            let vars = EnvLoader::new(Some(prefix)).load();
            merge(&mut merged, Value::Object(vars));
        }

        merge(&mut merged, Value::Object(self.overrides));

        let config: FormConfig = serde_json::from_value(Value::Object(merged))
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for FormConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn merge(target: &mut Map<String, Value>, layer: Value) {
    if let Value::Object(map) = layer {
        for (key, value) in map {
            target.insert(key, value);
        }
    }
}
