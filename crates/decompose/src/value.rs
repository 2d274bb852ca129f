//! Values passed between composed steps.

use std::collections::HashMap;
use std::fmt;

use crate::awaitable::Awaitable;
use crate::callable::Callable;

/// A dynamic value flowing through a composition.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// No value. Returned by steps that only perform side effects.
    #[default]
    Undefined,
    /// The null value.
    Null,
    /// A string value.
    String(String),
    /// A numeric value (always f64).
    Number(f64),
    /// A boolean value.
    Boolean(bool),
    /// An array of values, forwarded to the next step as one argument.
    Array(Vec<Value>),
    /// An object with string keys.
    Object(HashMap<String, Value>),
    /// An error returned as a value rather than raised.
    Error(ErrorValue),
    /// A sequence to forward as separate positional arguments.
    ///
    /// Built with [`Value::arguments`].
    Args(Vec<Value>),
    /// A callable, as handed to and returned from `around` steps.
    Function(Callable),
    /// A deferred value.
    Awaitable(Awaitable),
}

/// An error-typed return value.
///
/// Steps signal failure either by raising ([`crate::Error::Exception`]) or
/// by returning one of these. Fail handlers receive both the same way.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ErrorValue {
    message: String,
}

impl ErrorValue {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// A copy of this error with `suffix` appended to its message.
    pub fn annotate(&self, suffix: &str) -> Self {
        Self {
            message: format!("{}{}", self.message, suffix),
        }
    }
}

impl Value {
    /// Tag `value` as a list of positional arguments for the next step.
    ///
    /// Arrays are tagged as they are; any other value becomes a single
    /// positional argument.
    pub fn arguments(value: impl Into<Value>) -> Value {
        match value.into() {
            Value::Array(items) | Value::Args(items) => Value::Args(items),
            other => Value::Args(vec![other]),
        }
    }

    /// Shorthand for an error value carrying `message`.
    pub fn error(message: impl Into<String>) -> Value {
        Value::Error(ErrorValue::new(message))
    }

    /// Coerce this value to a string.
    pub fn to_string_value(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::String(s) => s.clone(),
            Value::Number(n) => {
                if n.is_nan() {
                    "NaN".to_string()
                } else if n.is_infinite() {
                    if *n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
                } else if *n == n.trunc() && n.abs() < 1e15 {
                    // Integer-like numbers without decimal point
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            Value::Boolean(b) => if *b { "true" } else { "false" }.to_string(),
            Value::Array(arr) | Value::Args(arr) => {
                let items: Vec<String> = arr.iter().map(|v| v.to_string_value()).collect();
                items.join(", ")
            }
            Value::Object(_) => "[object Object]".to_string(),
            Value::Error(e) => format!("Error: {}", e.message()),
            Value::Function(_) => "[function]".to_string(),
            Value::Awaitable(_) => "[awaitable]".to_string(),
        }
    }

    /// Coerce this value to a boolean.
    ///
    /// A falsy result from a protected step means "no error signaled".
    pub fn to_bool(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::String(s) => !s.is_empty(),
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Boolean(b) => *b,
            Value::Array(_)
            | Value::Args(_)
            | Value::Object(_)
            | Value::Error(_)
            | Value::Function(_)
            | Value::Awaitable(_) => true,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&ErrorValue> {
        match self {
            Value::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Callable> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Short name of this value's variant, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Boolean(_) => "boolean",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Error(_) => "error",
            Value::Args(_) => "arguments",
            Value::Function(_) => "function",
            Value::Awaitable(_) => "awaitable",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_value())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<ErrorValue> for Value {
    fn from(e: ErrorValue) -> Self {
        Value::Error(e)
    }
}

impl From<Callable> for Value {
    fn from(f: Callable) -> Self {
        Value::Function(f)
    }
}

impl From<Awaitable> for Value {
    fn from(a: Awaitable) -> Self {
        Value::Awaitable(a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arguments_tags_arrays_as_is() {
        let args = Value::arguments(vec![Value::from(1), Value::from(2)]);
        assert_eq!(args, Value::Args(vec![Value::from(1), Value::from(2)]));
    }

    #[test]
    fn test_arguments_wraps_scalars() {
        assert_eq!(Value::arguments("x"), Value::Args(vec![Value::from("x")]));
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert_eq!(Value::from(1).as_str(), None);
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Undefined.to_bool());
        assert!(!Value::from(0).to_bool());
        assert!(!Value::from("").to_bool());
        assert!(Value::error("boom").to_bool());
        assert!(Value::Array(vec![]).to_bool());
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(Value::from(5).to_string_value(), "5");
        assert_eq!(Value::from(2.5).to_string_value(), "2.5");
    }

    #[test]
    fn test_annotate_error() {
        let e = ErrorValue::new("oups : bloups");
        assert_eq!(e.annotate(" bat").message(), "oups : bloups bat");
        assert_eq!(e.message(), "oups : bloups");
    }
}
