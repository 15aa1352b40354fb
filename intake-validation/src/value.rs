// Scalar values held by form fields

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Largest magnitude at which every whole `f64` is exact
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A scalar value held by a field.
///
/// Serializes to the matching JSON scalar, so a field snapshot reads the
/// same as the value a client would post. Whole numbers serialize as
/// integers: a posted `4` comes back as `4`, not `4.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum FieldValue {
    /// Absent value
    #[default]
    Null,
    /// Boolean flag
    Bool(bool),
    /// Numeric value
    #[serde(serialize_with = "serialize_number")]
    Number(f64),
    /// Text value
    Text(String),
}

impl FieldValue {
    /// Build a text value
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// Whether the value counts as "not provided": null or empty text.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Check for null
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Borrow the text, if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric reading of the value.
    ///
    /// Numbers are returned as-is and text is parsed after trimming.
    /// Booleans, null and non-numeric text have no numeric reading.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) if n.is_finite() => Some(*n),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Borrow the flag, if this is a boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Convert to a JSON value
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Null => serde_json::Value::Null,
            FieldValue::Bool(b) => serde_json::Value::Bool(*b),
            FieldValue::Number(n) => match whole(*n) {
                Some(i) => serde_json::Value::from(i),
                None => serde_json::Number::from_f64(*n)
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::Null),
            },
            FieldValue::Text(s) => serde_json::Value::String(s.clone()),
        }
    }

    /// Read a JSON scalar. Arrays and objects have no scalar reading.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(FieldValue::Null),
            serde_json::Value::Bool(b) => Some(FieldValue::Bool(*b)),
            serde_json::Value::Number(n) => n.as_f64().map(FieldValue::Number),
            serde_json::Value::String(s) => Some(FieldValue::Text(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }
}

fn whole(n: f64) -> Option<i64> {
    (n.fract() == 0.0 && n.abs() <= MAX_EXACT_INTEGER).then_some(n as i64)
}

fn serialize_number<S: Serializer>(n: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    match whole(*n) {
        Some(i) => serializer.serialize_i64(i),
        None => serializer.serialize_f64(*n),
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_empty() {
        assert!(FieldValue::Null.is_empty());
        assert!(FieldValue::text("").is_empty());
        assert!(!FieldValue::text(" ").is_empty());
        assert!(!FieldValue::Bool(false).is_empty());
        assert!(!FieldValue::Number(0.0).is_empty());
    }

    #[test]
    fn test_as_number() {
        assert_eq!(FieldValue::Number(3.0).as_number(), Some(3.0));
        assert_eq!(FieldValue::text(" 4 ").as_number(), Some(4.0));
        assert_eq!(FieldValue::text("abc").as_number(), None);
        assert_eq!(FieldValue::text("").as_number(), None);
        assert_eq!(FieldValue::Bool(true).as_number(), None);
        assert_eq!(FieldValue::Null.as_number(), None);
    }

    #[test]
    fn test_json_scalars() {
        assert_eq!(
            FieldValue::from_json(&serde_json::json!("Jack")),
            Some(FieldValue::text("Jack"))
        );
        assert_eq!(
            FieldValue::from_json(&serde_json::json!(false)),
            Some(FieldValue::Bool(false))
        );
        assert_eq!(FieldValue::from_json(&serde_json::json!({"a": 1})), None);
        assert_eq!(FieldValue::from_json(&serde_json::json!([1])), None);
    }

    #[test]
    fn test_serializes_untagged() {
        let json = serde_json::to_string(&FieldValue::text("home")).unwrap();
        assert_eq!(json, "\"home\"");
        let json = serde_json::to_string(&FieldValue::Null).unwrap();
        assert_eq!(json, "null");
    }

    #[test]
    fn test_whole_numbers_stay_integers() {
        let posted = serde_json::json!(4);
        let value = FieldValue::from_json(&posted).unwrap();
        assert_eq!(value.to_json(), posted);
        assert_eq!(serde_json::to_string(&value).unwrap(), "4");

        assert_eq!(FieldValue::Number(-1.0).to_json(), serde_json::json!(-1));
        assert_eq!(FieldValue::Number(2.5).to_json(), serde_json::json!(2.5));
        assert_eq!(serde_json::to_string(&FieldValue::Number(2.5)).unwrap(), "2.5");
        assert_eq!(FieldValue::Number(f64::NAN).to_json(), serde_json::Value::Null);
    }

    #[test]
    fn test_from_option() {
        assert_eq!(FieldValue::from(None::<i32>), FieldValue::Null);
        assert_eq!(FieldValue::from(Some(2)), FieldValue::Number(2.0));
    }
}
