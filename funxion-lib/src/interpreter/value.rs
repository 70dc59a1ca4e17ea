use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fmt::Formatter;

/// Variable bindings available to an evaluation.
pub type Context = HashMap<String, Value>;

/// A value that can be bound to a variable, passed to a function or produced by an evaluation.
///
/// Only [`Value::Number`], [`Value::String`] and [`Value::Bool`] are scalars, and an evaluation
/// only ever produces scalars. The remaining variants exist so that a host (e.g. a spreadsheet
/// holding ranges and blank cells) can store them in a context; referencing one from an
/// expression is an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    String(String),
    Bool(bool),
    List(Vec<Value>),
    Empty,
}

impl Value {
    pub fn is_scalar(&self) -> bool {
        matches!(self, Value::Number(_) | Value::String(_) | Value::Bool(_))
    }

    /// Name of the runtime kind of this value, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Bool(_) => "bool",
            Value::List(_) => "list",
            Value::Empty => "empty",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(value) => write!(f, "{}", value),
            Value::String(value) => write!(f, "{}", value),
            Value::Bool(value) => write!(f, "{}", value),
            Value::List(values) => write!(f, "{}", values.iter().join(",")),
            Value::Empty => Ok(()),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parameterized_macro::parameterized;

    #[parameterized(
        value = {
            Value::Number(25.0),
            Value::Number(1.5),
            Value::String("text".into()),
            Value::Bool(false),
            Value::List(vec![Value::Number(1.0), Value::String("a".into())]),
            Value::Empty,
        },
        expected = {
            "25",
            "1.5",
            "text",
            "false",
            "1,a",
            "",
        }
    )]
    fn display_matches_plain_decimal_formatting(value: Value, expected: &str) {
        assert_eq!(value.to_string(), expected);
    }

    #[test]
    fn only_numbers_strings_and_bools_are_scalars() {
        assert!(Value::Number(0.0).is_scalar());
        assert!(Value::from("").is_scalar());
        assert!(Value::from(true).is_scalar());
        assert!(!Value::List(vec![]).is_scalar());
        assert!(!Value::Empty.is_scalar());
    }

    #[test]
    fn deserializes_from_plain_json() {
        let values: Vec<Value> = serde_json::from_str(r#"[1.5, "a", true, [2], null]"#).unwrap();

        assert_eq!(
            values,
            vec![
                Value::Number(1.5),
                Value::String("a".into()),
                Value::Bool(true),
                Value::List(vec![Value::Number(2.0)]),
                Value::Empty,
            ]
        );
    }
}
