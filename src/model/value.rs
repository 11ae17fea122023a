//! Context value type.
//!
//! Entry context is an open schema: whatever the upstream tracker exported
//! (status strings, numeric priorities, assignee lists) lands here. Query
//! predicates only ever look at a value's text form or its numeric form.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single context value.
///
/// Serialized untagged so that context maps read and write as plain JSON:
/// `{"status": "approved", "priority": 1, "reviewers": ["ana", "li"]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
}

// ============================================================================
// Views
// ============================================================================

impl Value {
    /// Numeric view: numbers as themselves, strings that parse as finite
    /// numbers, nothing else.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) if f.is_finite() => Some(*f),
            Value::Int(i) => Some(*i as f64),
            Value::String(s) => parse_number(s),
            _ => None,
        }
    }

    /// Plain text form used by query predicates.
    ///
    /// Unlike `Display`, strings are not quoted.
    pub fn as_text(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// Conversions (From impls)
// ============================================================================

impl From<bool> for Value { fn from(v: bool) -> Self { Value::Bool(v) } }
impl From<i32> for Value { fn from(v: i32) -> Self { Value::Int(v as i64) } }
impl From<i64> for Value { fn from(v: i64) -> Self { Value::Int(v) } }
impl From<f64> for Value { fn from(v: f64) -> Self { Value::Float(v) } }
impl From<String> for Value { fn from(v: String) -> Self { Value::String(v) } }
impl From<&str> for Value { fn from(v: &str) -> Self { Value::String(v.to_owned()) } }
impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self { Value::List(v.into_iter().map(Into::into).collect()) }
}
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self { v.map(Into::into).unwrap_or(Value::Null) }
}

// ============================================================================
// Display
// ============================================================================

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(s) => write!(f, "\"{}\"", s.replace('"', "\\\"")),
            Value::List(l) => {
                write!(f, "[")?;
                for (i, v) in l.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
        }
    }
}

// ============================================================================
// Comparison
// ============================================================================

/// Parse a query-side or field-side string as a finite number.
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Compare two text operands for the ordering operators.
///
/// With `numeric` set, operands that both parse as numbers compare by value
/// (`"9" < "10"`). Everything else compares by bytes (`"10" < "9"`).
pub fn compare_text(left: &str, right: &str, numeric: bool) -> Ordering {
    if numeric {
        if let (Some(a), Some(b)) = (parse_number(left), parse_number(right)) {
            return a.partial_cmp(&b).unwrap_or(Ordering::Equal);
        }
    }
    left.as_bytes().cmp(right.as_bytes())
}

impl Value {
    /// Order this value against query text for the ordering operators.
    ///
    /// Numeric values are compared as numbers without a round trip through
    /// their text form; everything else goes through `compare_text`.
    pub fn compare_to(&self, text: &str, numeric: bool) -> Ordering {
        if numeric {
            if let (Some(a), Some(b)) = (self.as_float(), parse_number(text)) {
                return a.partial_cmp(&b).unwrap_or(Ordering::Equal);
            }
        }
        compare_text(&self.as_text(), text, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_from() {
        assert_eq!(Value::from("hello"), Value::String("hello".into()));
        assert_eq!(Value::from(42), Value::Int(42));
        assert_eq!(Value::from(3.5), Value::Float(3.5));
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(None::<i64>), Value::Null);
    }

    #[test]
    fn test_as_text_unquoted() {
        assert_eq!(Value::from("approved").as_text(), "approved");
        assert_eq!(Value::from(2).as_text(), "2");
        assert_eq!(Value::Null.as_text(), "null");
    }

    #[test]
    fn test_untagged_json() {
        let v: Value = serde_json::from_str(r#"["a", 1, 2.5, true, null]"#).unwrap();
        assert_eq!(
            v,
            Value::List(vec![
                Value::from("a"),
                Value::Int(1),
                Value::Float(2.5),
                Value::Bool(true),
                Value::Null,
            ])
        );
    }

    #[test]
    fn test_numeric_aware_ordering() {
        assert_eq!(compare_text("9", "10", true), Ordering::Less);
        assert_eq!(compare_text("2.5", "2.50", true), Ordering::Equal);
    }

    #[test]
    fn test_lexicographic_fallback() {
        assert_eq!(compare_text("9", "10", false), Ordering::Greater);
        assert_eq!(compare_text("abc", "abd", true), Ordering::Less);
        // Mixed numeric / non-numeric operands fall back to bytes.
        assert_eq!(compare_text("10", "x", true), Ordering::Less);
    }

    #[test]
    fn test_as_float() {
        assert_eq!(Value::Int(9).as_float(), Some(9.0));
        assert_eq!(Value::Float(2.5).as_float(), Some(2.5));
        assert_eq!(Value::from("10").as_float(), Some(10.0));
        assert_eq!(Value::from("ten").as_float(), None);
        assert_eq!(Value::Float(f64::NAN).as_float(), None);
        assert_eq!(Value::Bool(true).as_float(), None);
    }

    #[test]
    fn test_value_compare_to() {
        assert_eq!(Value::Int(9).compare_to("10", true), Ordering::Less);
        assert_eq!(Value::Int(9).compare_to("10", false), Ordering::Greater);
        assert_eq!(Value::Float(2.0).compare_to("2", true), Ordering::Equal);
        assert_eq!(Value::from("draft").compare_to("approved", true), Ordering::Greater);
        assert_eq!(Value::Null.compare_to("0", true), Ordering::Greater);
    }

    #[test]
    fn test_non_finite_is_not_numeric() {
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number(" 7 "), Some(7.0));
    }
}
