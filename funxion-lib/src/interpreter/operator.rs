use crate::interpreter::token::TokenKind;
use std::fmt;
use std::fmt::Formatter;

/// A binary arithmetic operator.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Exponentiate,
}

impl BinaryOperator {
    pub const ALL: [BinaryOperator; 6] = [
        BinaryOperator::Add,
        BinaryOperator::Subtract,
        BinaryOperator::Multiply,
        BinaryOperator::Divide,
        BinaryOperator::Modulo,
        BinaryOperator::Exponentiate,
    ];

    pub fn kind(&self) -> TokenKind {
        match self {
            BinaryOperator::Add => TokenKind::OpAdd,
            BinaryOperator::Subtract => TokenKind::OpSub,
            BinaryOperator::Multiply => TokenKind::OpMul,
            BinaryOperator::Divide => TokenKind::OpDiv,
            BinaryOperator::Modulo => TokenKind::OpMod,
            BinaryOperator::Exponentiate => TokenKind::OpPow,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            BinaryOperator::Add => '+',
            BinaryOperator::Subtract => '-',
            BinaryOperator::Multiply => '*',
            BinaryOperator::Divide => '/',
            BinaryOperator::Modulo => '%',
            BinaryOperator::Exponentiate => '^',
        }
    }

    /// Applies the operator with IEEE-754 semantics: division by zero gives an infinity
    /// and `%` is the truncated remainder.
    pub fn evaluate(&self, a: f64, b: f64) -> f64 {
        match self {
            BinaryOperator::Add => a + b,
            BinaryOperator::Subtract => a - b,
            BinaryOperator::Multiply => a * b,
            BinaryOperator::Divide => a / b,
            BinaryOperator::Modulo => a % b,
            BinaryOperator::Exponentiate => f64::powf(a, b),
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
