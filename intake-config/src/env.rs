// Environment variable loading

use serde_json::{Map, Value};
use std::env;

/// Reads prefixed environment variables as configuration overrides.
///
/// `INTAKE_PREFILL_DELAY_MS=250` with prefix `INTAKE` becomes the key
/// `prefill_delay_ms`. Values that read as booleans or unsigned integers are
/// typed accordingly; everything else stays text.
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    /// Overrides from the process environment
    pub fn load(&self) -> Map<String, Value> {
        self.load_from(env::vars())
    }

    /// Overrides from an explicit set of variables
    pub fn load_from<I>(&self, vars: I) -> Map<String, Value>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut config = Map::new();

        for (key, value) in vars {
            let key = match self.prefix {
                Some(ref prefix) => match key.strip_prefix(prefix.as_str()) {
                    Some(rest) if rest.starts_with('_') => rest.trim_start_matches('_').to_string(),
                    _ => continue,
                },
                None => key,
            };
            config.insert(key.to_lowercase(), coerce(&value));
        }

        config
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(None)
    }
}

fn coerce(raw: &str) -> Value {
    let trimmed = raw.trim();
    if let Ok(flag) = trimmed.parse::<bool>() {
        return Value::Bool(flag);
    }
    if let Ok(number) = trimmed.parse::<u64>() {
        return Value::from(number);
    }
    Value::String(raw.to_string())
}
