use crate::error::InputError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Declared type of an input. Set events are validated against it before they are appended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputType {
    String,
    Numeric,
    Regexp,
    Array,
    Hash,
    Boolean,
    Any,
}

impl InputType {
    pub fn as_str(self) -> &'static str {
        match self {
            InputType::String => "String",
            InputType::Numeric => "Numeric",
            InputType::Regexp => "Regexp",
            InputType::Array => "Array",
            InputType::Hash => "Hash",
            InputType::Boolean => "Boolean",
            InputType::Any => "Any",
        }
    }

    pub fn accepts(self, value: &Value) -> bool {
        match self {
            InputType::Any => true,
            InputType::String => value.is_string(),
            // numbers, or strings that parse as one
            InputType::Numeric => match value {
                Value::Number(_) => true,
                Value::String(s) => s.trim().parse::<f64>().is_ok(),
                _ => false,
            },
            InputType::Regexp => value.as_str().is_some_and(|s| Regex::new(s).is_ok()),
            InputType::Array => value.is_array(),
            InputType::Hash => value.is_object(),
            InputType::Boolean => value.is_boolean(),
        }
    }
}

impl FromStr for InputType {
    type Err = InputError;

    /// Case-insensitive; `Num` and `Regex` are accepted abbreviations.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" => Ok(InputType::String),
            "numeric" | "num" => Ok(InputType::Numeric),
            "regexp" | "regex" => Ok(InputType::Regexp),
            "array" => Ok(InputType::Array),
            "hash" => Ok(InputType::Hash),
            "boolean" => Ok(InputType::Boolean),
            "any" => Ok(InputType::Any),
            _ => Err(InputError::InvalidType(s.to_string())),
        }
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_names_case_insensitively_with_abbreviations() {
        assert_eq!("string".parse::<InputType>().unwrap(), InputType::String);
        assert_eq!("NUM".parse::<InputType>().unwrap(), InputType::Numeric);
        assert_eq!("Regex".parse::<InputType>().unwrap(), InputType::Regexp);
        assert_eq!("hash".parse::<InputType>().unwrap(), InputType::Hash);
        assert_eq!(
            "Float".parse::<InputType>(),
            Err(InputError::InvalidType("Float".to_string()))
        );
    }

    #[test]
    fn numeric_accepts_numeric_strings() {
        assert!(InputType::Numeric.accepts(&json!(3)));
        assert!(InputType::Numeric.accepts(&json!("3.25")));
        assert!(!InputType::Numeric.accepts(&json!("three")));
        assert!(!InputType::Numeric.accepts(&json!(null)));
    }

    #[test]
    fn regexp_requires_a_compilable_string() {
        assert!(InputType::Regexp.accepts(&json!("^root$")));
        assert!(!InputType::Regexp.accepts(&json!("(unclosed")));
        assert!(!InputType::Regexp.accepts(&json!(1)));
    }

    #[test]
    fn structural_types_match_json_shapes() {
        assert!(InputType::Array.accepts(&json!([1, 2])));
        assert!(InputType::Hash.accepts(&json!({"a": 1})));
        assert!(InputType::Boolean.accepts(&json!(false)));
        assert!(!InputType::Boolean.accepts(&json!("false")));
        assert!(InputType::Any.accepts(&json!(null)));
    }
}
