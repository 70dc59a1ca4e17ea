use crate::interpreter::token::TokenKind;
use thiserror::Error;

/// Raised by [`parse`](crate::interpreter::parse) when the input cannot be tokenized.
/// Offsets are byte offsets into the expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Error at :{offset} (unexpected '{character}')")]
    UnexpectedCharacter { offset: usize, character: char },

    #[error("Error at :{offset} (invalid string literal: {reason})")]
    InvalidString { offset: usize, reason: String },
}

impl ParseError {
    pub fn offset(&self) -> usize {
        match self {
            ParseError::UnexpectedCharacter { offset, .. }
            | ParseError::InvalidString { offset, .. } => *offset,
        }
    }
}

/// Raised by [`exec`](crate::interpreter::exec) when a token sequence cannot be reduced
/// to a single value.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("No function named {name} exists.")]
    UnknownFunction { name: String },

    #[error("Function '{name}' failed: {source}")]
    FunctionFailed {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Bad return type {kind} from function '{name}'")]
    BadFunctionReturn { name: String, kind: &'static str },

    #[error("Unexpected {kind} type for variable '{name}'")]
    BadVariable { name: String, kind: &'static str },

    #[error("Invalid expression")]
    NoReduction,

    #[error("Invalid expression, unresolved {kind} token")]
    NonScalarResult { kind: TokenKind },

    #[error("Empty expression")]
    EmptyExpression,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Either stage of [`evaluate`](crate::interpreter::evaluate) failing.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}
