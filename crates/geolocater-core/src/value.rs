//! Configuration values and numeric normalization.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A scalar configuration value.
///
/// Serialized untagged, so a preference file holds plain JSON strings and
/// numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Number(f64),
    Text(String),
}

impl ConfigValue {
    /// Get the text content, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Text(text) => Some(text),
            ConfigValue::Number(_) => None,
        }
    }

    /// Interpret the value as a finite number.
    ///
    /// Text goes through [`normalize_number`], so `"12,5"` yields `12.5`.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            ConfigValue::Number(n) if n.is_finite() => Some(*n),
            ConfigValue::Number(_) => None,
            ConfigValue::Text(text) => normalize_number(text),
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Number(n) => write!(f, "{}", n),
            ConfigValue::Text(text) => write!(f, "{}", text),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::Text(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::Text(s)
    }
}

impl From<f64> for ConfigValue {
    fn from(n: f64) -> Self {
        ConfigValue::Number(n)
    }
}

/// Parse a coordinate typed with either a decimal point or a decimal comma.
///
/// Only the first comma is replaced, so `"1,234,5"` is rejected rather than
/// silently truncated. Returns `None` for anything that is not a finite number.
pub fn normalize_number(raw: &str) -> Option<f64> {
    raw.trim()
        .replacen(',', ".", 1)
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_decimal_comma() {
        assert_eq!(normalize_number("45,5"), Some(45.5));
        assert_eq!(normalize_number("48.85"), Some(48.85));
        assert_eq!(normalize_number(" -2,35 "), Some(-2.35));
        assert_eq!(normalize_number("7"), Some(7.0));
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert_eq!(normalize_number(""), None);
        assert_eq!(normalize_number("north"), None);
        assert_eq!(normalize_number("1,234,5"), None);
        assert_eq!(normalize_number("NaN"), None);
        assert_eq!(normalize_number("inf"), None);
    }

    #[test]
    fn test_to_number() {
        assert_eq!(ConfigValue::from("12,5").to_number(), Some(12.5));
        assert_eq!(ConfigValue::from(3.0).to_number(), Some(3.0));
        assert_eq!(ConfigValue::Number(f64::NAN).to_number(), None);
        assert_eq!(ConfigValue::from("http://localhost").to_number(), None);
    }

    #[test]
    fn test_untagged_json() {
        let values: Vec<ConfigValue> = serde_json::from_str(r#"[1.5, "text"]"#).unwrap();
        assert_eq!(
            values,
            vec![ConfigValue::Number(1.5), ConfigValue::Text("text".to_string())]
        );
        assert_eq!(
            serde_json::to_string(&ConfigValue::from(2.5)).unwrap(),
            "2.5"
        );
    }
}
