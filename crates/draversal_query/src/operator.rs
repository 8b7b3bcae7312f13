//! Comparison operators for query clauses.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde_json::Value;

use crate::QueryError;

/// An operator appended to a query key after the operator separator.
///
/// A key without an operator compares with [`Operator::Eq`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    /// The actual value is an element of the expected sequence.
    In,
    /// The actual sequence or string contains the expected value.
    Contains,
    /// The key is present.
    Exists,
    /// The actual value has the JSON type named by the expected string.
    Type,
    /// The actual string matches the expected pattern from its start.
    Regex,
}

impl Operator {
    pub const ALL: [Operator; 11] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Gt,
        Operator::Ge,
        Operator::Lt,
        Operator::Le,
        Operator::In,
        Operator::Contains,
        Operator::Exists,
        Operator::Type,
        Operator::Regex,
    ];

    /// Returns the operator name as written in query keys.
    pub fn name(self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Gt => "gt",
            Operator::Ge => "ge",
            Operator::Lt => "lt",
            Operator::Le => "le",
            Operator::In => "in",
            Operator::Contains => "contains",
            Operator::Exists => "exists",
            Operator::Type => "type",
            Operator::Regex => "regex",
        }
    }

    /// Compiles the expected value of a `regex` clause.
    ///
    /// Patterns are anchored at the start of the actual value.
    pub(crate) fn compile_pattern(expected: &Value) -> Result<Regex, QueryError> {
        let Value::String(pattern) = expected else {
            return Err(QueryError::invalid_query(format!(
                "regex operator expects a string pattern, got {expected}"
            )));
        };
        Regex::new(&format!("^(?:{pattern})"))
            .map_err(|e| QueryError::invalid_query(format!("invalid value pattern '{pattern}': {e}")))
    }

    /// Applies the operator to one flattened entry.
    ///
    /// `pattern` is the compiled expected value for [`Operator::Regex`].
    pub(crate) fn apply(self, actual: &Value, expected: &Value, pattern: Option<&Regex>) -> bool {
        match self {
            Operator::Eq => loosely_equal(actual, expected),
            Operator::Ne => !loosely_equal(actual, expected),
            Operator::Gt => compare(actual, expected).is_some_and(Ordering::is_gt),
            Operator::Ge => compare(actual, expected).is_some_and(Ordering::is_ge),
            Operator::Lt => compare(actual, expected).is_some_and(Ordering::is_lt),
            Operator::Le => compare(actual, expected).is_some_and(Ordering::is_le),
            Operator::In => match expected {
                Value::Array(items) => items.iter().any(|item| loosely_equal(actual, item)),
                Value::String(haystack) => actual.as_str().is_some_and(|s| haystack.contains(s)),
                _ => false,
            },
            Operator::Contains => match actual {
                Value::Array(items) => items.iter().any(|item| loosely_equal(item, expected)),
                Value::String(haystack) => expected.as_str().is_some_and(|s| haystack.contains(s)),
                Value::Object(map) => expected.as_str().is_some_and(|s| map.contains_key(s)),
                _ => false,
            },
            Operator::Exists => true,
            Operator::Type => expected.as_str() == Some(type_name(actual)),
            Operator::Regex => match (actual, pattern) {
                (Value::String(text), Some(pattern)) => pattern.is_match(text),
                _ => false,
            },
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| QueryError::invalid_query(format!("unknown operator '{s}'")))
    }
}

/// JSON type name of a value.
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Equality that treats `1` and `1.0` as the same number.
fn loosely_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(_), Value::Number(_)) => compare(actual, expected) == Some(Ordering::Equal),
        _ => actual == expected,
    }
}

/// Orders numbers numerically, strings lexicographically and booleans with
/// `false < true`. Other combinations are unordered.
fn compare(actual: &Value, expected: &Value) -> Option<Ordering> {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => {
            if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
                return Some(a.cmp(&b));
            }
            if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
                return Some(a.cmp(&b));
            }
            a.as_f64()?.partial_cmp(&b.as_f64()?)
        }
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
