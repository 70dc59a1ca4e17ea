//! A small formula-expression engine.
//!
//! Expressions such as `(7+(6*5^2+3))/2` or `if(flag, "X", "Y")` are tokenized with
//! [`parse`] and then reduced to a single number, string or bool with [`exec`], against
//! caller supplied variables and functions.

pub mod interpreter;

pub use interpreter::error::{Error, EvalError, ParseError};
pub use interpreter::functions::{Function, Functions};
pub use interpreter::token::{Token, TokenKind};
pub use interpreter::value::{Context, Value};
pub use interpreter::{evaluate, exec, parse, ParseResult};
