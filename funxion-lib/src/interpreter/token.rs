use crate::interpreter::operator::BinaryOperator;
use crate::interpreter::value::Value;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;
use std::fmt::Formatter;

/// A discrete part of an expression.
///
/// Serializes as `{ "type": <kind>, "value": <payload> }`, where punctuation and operators carry
/// their literal character as payload.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawToken", into = "RawToken")]
pub enum Token {
    Number(f64),
    String(String),
    Bool(bool),
    Ident(String),
    Operator(BinaryOperator),
    ParenOpen,
    ParenClose,
    Comma,
    /// Already evaluated call arguments. Only ever produced while reducing.
    Params(Vec<Value>),
}

/// The closed set of token types.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Number,
    String,
    Bool,
    Ident,
    OpAdd,
    OpSub,
    OpMul,
    OpDiv,
    OpMod,
    OpPow,
    ParenOpen,
    ParenClose,
    Comma,
    Params,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Bool => "bool",
            TokenKind::Ident => "ident",
            TokenKind::OpAdd => "op_add",
            TokenKind::OpSub => "op_sub",
            TokenKind::OpMul => "op_mul",
            TokenKind::OpDiv => "op_div",
            TokenKind::OpMod => "op_mod",
            TokenKind::OpPow => "op_pow",
            TokenKind::ParenOpen => "paren_open",
            TokenKind::ParenClose => "paren_close",
            TokenKind::Comma => "comma",
            TokenKind::Params => "params",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Number(_) => TokenKind::Number,
            Token::String(_) => TokenKind::String,
            Token::Bool(_) => TokenKind::Bool,
            Token::Ident(_) => TokenKind::Ident,
            Token::Operator(operator) => operator.kind(),
            Token::ParenOpen => TokenKind::ParenOpen,
            Token::ParenClose => TokenKind::ParenClose,
            Token::Comma => TokenKind::Comma,
            Token::Params(_) => TokenKind::Params,
        }
    }

    /// Wraps a scalar value in the literal token of its kind.
    /// Non-scalar values are handed back unchanged as the error.
    pub fn from_scalar(value: Value) -> Result<Token, Value> {
        match value {
            Value::Number(value) => Ok(Token::Number(value)),
            Value::String(value) => Ok(Token::String(value)),
            Value::Bool(value) => Ok(Token::Bool(value)),
            other => Err(other),
        }
    }

    /// The scalar carried by a literal token, or `None` for every other kind.
    pub fn into_scalar(self) -> Option<Value> {
        match self {
            Token::Number(value) => Some(Value::Number(value)),
            Token::String(value) => Some(Value::String(value)),
            Token::Bool(value) => Some(Value::Bool(value)),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(value) => write!(f, "{}", value),
            Token::String(value) => write!(f, "{:?}", value),
            Token::Bool(value) => write!(f, "{}", value),
            Token::Ident(name) => write!(f, "{}", name),
            Token::Operator(operator) => write!(f, "{}", operator),
            Token::ParenOpen => write!(f, "("),
            Token::ParenClose => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Params(values) => write!(f, "[{}]", values.iter().join(", ")),
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), self)
    }
}

/// The `{ type, value }` wire shape of a token.
#[derive(Serialize, Deserialize)]
struct RawToken {
    #[serde(rename = "type")]
    kind: TokenKind,
    value: Value,
}

impl From<Token> for RawToken {
    fn from(token: Token) -> Self {
        let kind = token.kind();
        let value = match token {
            Token::Number(value) => Value::Number(value),
            Token::String(value) | Token::Ident(value) => Value::String(value),
            Token::Bool(value) => Value::Bool(value),
            Token::Params(values) => Value::List(values),
            Token::Operator(operator) => Value::String(operator.symbol().to_string()),
            Token::ParenOpen => Value::String("(".into()),
            Token::ParenClose => Value::String(")".into()),
            Token::Comma => Value::String(",".into()),
        };
        RawToken { kind, value }
    }
}

impl TryFrom<RawToken> for Token {
    type Error = String;

    fn try_from(raw: RawToken) -> Result<Self, Self::Error> {
        let RawToken { kind, value } = raw;
        match (kind, value) {
            (TokenKind::Number, Value::Number(value)) => Ok(Token::Number(value)),
            (TokenKind::String, Value::String(value)) => Ok(Token::String(value)),
            (TokenKind::Bool, Value::Bool(value)) => Ok(Token::Bool(value)),
            (TokenKind::Ident, Value::String(name)) => Ok(Token::Ident(name)),
            (TokenKind::Params, Value::List(values)) if values.iter().all(Value::is_scalar) => {
                Ok(Token::Params(values))
            }
            (TokenKind::ParenOpen, _) => Ok(Token::ParenOpen),
            (TokenKind::ParenClose, _) => Ok(Token::ParenClose),
            (TokenKind::Comma, _) => Ok(Token::Comma),
            (kind, value) => match operator_for(kind) {
                Some(operator) => Ok(Token::Operator(operator)),
                None => Err(format!(
                    "a {} token cannot carry a {} value",
                    kind,
                    value.kind()
                )),
            },
        }
    }
}

fn operator_for(kind: TokenKind) -> Option<BinaryOperator> {
    BinaryOperator::ALL
        .into_iter()
        .find(|operator| operator.kind() == kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn serializes_as_type_and_value() {
        let tokens = vec![
            Token::Ident("a".into()),
            Token::Operator(BinaryOperator::Add),
            Token::Number(1.5),
            Token::Params(vec![Value::Bool(true)]),
        ];

        let json = serde_json::to_value(&tokens).unwrap();

        assert_eq!(
            json,
            serde_json::json!([
                { "type": "ident", "value": "a" },
                { "type": "op_add", "value": "+" },
                { "type": "number", "value": 1.5 },
                { "type": "params", "value": [true] },
            ])
        );
    }

    #[test]
    fn deserializes_hand_written_tokens() {
        let json = r#"[
            { "type": "paren_open", "value": "(" },
            { "type": "string", "value": "x" },
            { "type": "op_pow", "value": "^" }
        ]"#;

        let tokens: Vec<Token> = serde_json::from_str(json).unwrap();

        assert_eq!(
            tokens,
            vec![
                Token::ParenOpen,
                Token::String("x".into()),
                Token::Operator(BinaryOperator::Exponentiate),
            ]
        );
    }

    #[test]
    fn rejects_payload_of_wrong_kind() {
        let result: Result<Token, _> = serde_json::from_str(r#"{ "type": "number", "value": "1" }"#);

        assert!(result.is_err());
    }

    #[test]
    fn only_scalars_become_literal_tokens() {
        assert_eq!(Token::from_scalar(Value::Number(2.0)), Ok(Token::Number(2.0)));
        assert_eq!(Token::from_scalar(Value::Empty), Err(Value::Empty));
    }
}
