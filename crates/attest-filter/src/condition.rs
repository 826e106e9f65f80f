use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;

/// Custom condition objects for `where_` and field accessors.
pub trait Matchable: fmt::Debug + Send + Sync {
    fn matches(&self, value: &Value) -> bool;

    /// Text used in the table's filter description.
    fn describe(&self) -> String;
}

/// A `where_` condition. The variant decides how the row value is compared.
#[derive(Clone, Debug)]
pub enum Condition {
    /// Integer or integer-looking string equal to the condition.
    Int(i64),
    /// Float or float-looking string equal to the condition.
    Float(f64),
    /// String form of the row value matches the pattern.
    Regex(Regex),
    /// Plain equality.
    Value(Value),
    Custom(Arc<dyn Matchable>),
}

impl Condition {
    pub fn custom(matcher: impl Matchable + 'static) -> Self {
        Condition::Custom(Arc::new(matcher))
    }

    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Condition::Int(expected) => matches_int(value, *expected),
            Condition::Float(expected) => matches_float(value, *expected),
            Condition::Regex(re) => matches_regex(value, re),
            Condition::Value(expected) => loose_eq(value, expected),
            Condition::Custom(m) => m.matches(value),
        }
    }

    /// Literal rendering used when describing the filter chain.
    pub fn inspect(&self) -> String {
        match self {
            Condition::Int(v) => v.to_string(),
            Condition::Float(v) => inspect_float(*v),
            Condition::Regex(re) => format!("/{}/", re.as_str()),
            Condition::Value(v) => v.to_string(),
            Condition::Custom(m) => m.describe(),
        }
    }
}

fn matches_int(value: &Value, expected: i64) -> bool {
    match value {
        Value::Number(n) => n.as_i64().is_some_and(|v| v == expected),
        Value::String(s) if is_integer_literal(s) => {
            s.parse::<i64>().is_ok_and(|v| v == expected)
        }
        _ => false,
    }
}

fn matches_float(value: &Value, expected: f64) -> bool {
    match value {
        Value::Number(n) if n.is_f64() => n.as_f64().is_some_and(|v| v == expected),
        Value::String(s) if is_float_literal(s) => s.parse::<f64>().is_ok_and(|v| v == expected),
        _ => false,
    }
}

fn matches_regex(value: &Value, re: &Regex) -> bool {
    re.is_match(&display_value(value))
}

/// Equality that treats `1` and `1.0` as the same number.
pub(crate) fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        _ => a == b,
    }
}

/// String form of a row value: strings unquoted, `null` empty, everything else as JSON.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_integer_literal(s: &str) -> bool {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

// [-+]?(\d+\.?\d*|\.\d+)
fn is_float_literal(s: &str) -> bool {
    let body = s.strip_prefix(['-', '+']).unwrap_or(s);
    match body.split_once('.') {
        None => !body.is_empty() && body.bytes().all(|b| b.is_ascii_digit()),
        Some((int, frac)) => {
            let int_ok = int.bytes().all(|b| b.is_ascii_digit());
            let frac_ok = frac.bytes().all(|b| b.is_ascii_digit());
            int_ok && frac_ok && (!int.is_empty() || !frac.is_empty())
        }
    }
}

fn inspect_float(v: f64) -> String {
    if v.fract() == 0.0 && v.is_finite() {
        format!("{v:.1}")
    } else {
        v.to_string()
    }
}

impl Matchable for RangeInclusive<i64> {
    fn matches(&self, value: &Value) -> bool {
        let n = match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) if is_integer_literal(s) => s.parse::<i64>().ok(),
            _ => None,
        };
        n.is_some_and(|n| self.contains(&n))
    }

    fn describe(&self) -> String {
        format!("{}..{}", self.start(), self.end())
    }
}

impl From<i64> for Condition {
    fn from(v: i64) -> Self {
        Condition::Int(v)
    }
}

impl From<i32> for Condition {
    fn from(v: i32) -> Self {
        Condition::Int(v.into())
    }
}

impl From<u32> for Condition {
    fn from(v: u32) -> Self {
        Condition::Int(v.into())
    }
}

impl From<f64> for Condition {
    fn from(v: f64) -> Self {
        Condition::Float(v)
    }
}

impl From<bool> for Condition {
    fn from(v: bool) -> Self {
        Condition::Value(Value::Bool(v))
    }
}

impl From<&str> for Condition {
    fn from(v: &str) -> Self {
        Condition::Value(Value::String(v.to_string()))
    }
}

impl From<String> for Condition {
    fn from(v: String) -> Self {
        Condition::Value(Value::String(v))
    }
}

impl From<Regex> for Condition {
    fn from(v: Regex) -> Self {
        Condition::Regex(v)
    }
}

impl From<RangeInclusive<i64>> for Condition {
    fn from(v: RangeInclusive<i64>) -> Self {
        Condition::custom(v)
    }
}

impl From<Value> for Condition {
    fn from(v: Value) -> Self {
        if let Value::Number(n) = &v {
            let numeric = if n.is_f64() {
                n.as_f64().map(Condition::Float)
            } else {
                n.as_i64().map(Condition::Int)
            };
            if let Some(c) = numeric {
                return c;
            }
        }
        Condition::Value(v)
    }
}
