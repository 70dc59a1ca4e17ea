use crate::interpreter::error::EvalError;
use crate::interpreter::functions::FunctionResolver;
use crate::interpreter::operator::BinaryOperator;
use crate::interpreter::token::{Token, TokenKind};
use crate::interpreter::value::{Context, Value};
use std::convert::TryInto;
use Slot::{AnyOf, Is};
use TokenKind::{
    Comma, Ident, Number, OpAdd, OpDiv, OpMod, OpMul, OpPow, OpSub, ParenClose, ParenOpen, Params,
};

/// One position in a rule pattern.
#[derive(Debug, Copy, Clone)]
pub(crate) enum Slot {
    Is(TokenKind),
    AnyOf(&'static [TokenKind]),
}

impl Slot {
    fn accepts(&self, kind: TokenKind) -> bool {
        match self {
            Slot::Is(expected) => *expected == kind,
            Slot::AnyOf(alternatives) => alternatives.contains(&kind),
        }
    }
}

/// Rewrites the tokens matched by a rule's pattern into their replacement.
pub(crate) type Transform =
    fn(Vec<Token>, &Context, &FunctionResolver) -> Result<Vec<Token>, EvalError>;

/// A production: a token pattern and what a matching window is rewritten into.
pub(crate) struct Rule {
    pub(crate) name: &'static str,
    pub(crate) pattern: &'static [Slot],
    /// The window does not match when the token right after it is of this kind.
    pub(crate) not_followed_by: Option<TokenKind>,
    pub(crate) transform: Transform,
}

impl Rule {
    /// Position of the leftmost window of `tokens` that matches the pattern.
    pub(crate) fn find(&self, tokens: &[Token]) -> Option<usize> {
        let width = self.pattern.len();
        tokens.windows(width).enumerate().position(|(start, window)| {
            let matches = window
                .iter()
                .zip(self.pattern)
                .all(|(token, slot)| slot.accepts(token.kind()));
            let next = tokens.get(start + width).map(Token::kind);
            matches && (self.not_followed_by.is_none() || next != self.not_followed_by)
        })
    }
}

const LITERAL: &[TokenKind] = &[TokenKind::Number, TokenKind::String, TokenKind::Bool];

/// The rules in priority order. Earlier rules pre-empt later ones, which is what gives
/// `^` precedence over `/ * %` and those over `+ -`.
pub(crate) static GRAMMAR: [Rule; 15] = [
    Rule {
        name: "single argument",
        pattern: &[Is(Ident), Is(ParenOpen), AnyOf(LITERAL), Is(ParenClose)],
        not_followed_by: None,
        transform: wrap_single_argument,
    },
    Rule {
        name: "implicit multiplication",
        pattern: &[Is(Number), Is(ParenOpen), Is(Number), Is(ParenClose)],
        not_followed_by: None,
        transform: implicit_multiplication,
    },
    Rule {
        name: "redundant parentheses",
        pattern: &[Is(ParenOpen), Is(Number), Is(ParenClose)],
        not_followed_by: None,
        transform: strip_parentheses,
    },
    Rule {
        name: "exponentiation",
        pattern: &[Is(Number), Is(OpPow), Is(Number)],
        not_followed_by: None,
        transform: fold_operation,
    },
    Rule {
        name: "division",
        pattern: &[Is(Number), Is(OpDiv), Is(Number)],
        not_followed_by: None,
        transform: fold_operation,
    },
    Rule {
        name: "multiplication",
        pattern: &[Is(Number), Is(OpMul), Is(Number)],
        not_followed_by: None,
        transform: fold_operation,
    },
    Rule {
        name: "remainder",
        pattern: &[Is(Number), Is(OpMod), Is(Number)],
        not_followed_by: None,
        transform: fold_operation,
    },
    Rule {
        name: "addition",
        pattern: &[Is(Number), Is(OpAdd), Is(Number)],
        not_followed_by: None,
        transform: fold_operation,
    },
    Rule {
        name: "subtraction",
        pattern: &[Is(Number), Is(OpSub), Is(Number)],
        not_followed_by: None,
        transform: fold_operation,
    },
    Rule {
        name: "argument pair",
        pattern: &[AnyOf(LITERAL), Is(Comma), AnyOf(LITERAL)],
        not_followed_by: None,
        transform: collect_arguments,
    },
    Rule {
        name: "append argument",
        pattern: &[Is(Params), Is(Comma), AnyOf(LITERAL)],
        not_followed_by: None,
        transform: append_argument,
    },
    Rule {
        name: "concatenate arguments",
        pattern: &[Is(Params), Is(Comma), Is(Params)],
        not_followed_by: None,
        transform: concatenate_arguments,
    },
    Rule {
        name: "no arguments",
        pattern: &[Is(Ident), Is(ParenOpen), Is(ParenClose)],
        not_followed_by: None,
        transform: wrap_no_arguments,
    },
    Rule {
        name: "call",
        pattern: &[Is(Ident), Is(ParenOpen), Is(Params), Is(ParenClose)],
        not_followed_by: None,
        transform: call_function,
    },
    Rule {
        name: "variable",
        pattern: &[Is(Ident)],
        not_followed_by: Some(ParenOpen),
        transform: substitute_variable,
    },
];

fn wrap_single_argument(
    tokens: Vec<Token>,
    _: &Context,
    _: &FunctionResolver,
) -> Result<Vec<Token>, EvalError> {
    let [ident, open, literal, close] = take::<4>(tokens)?;
    let argument = literal_value(literal)?;
    Ok(vec![ident, open, Token::Params(vec![argument]), close])
}

fn implicit_multiplication(
    tokens: Vec<Token>,
    _: &Context,
    _: &FunctionResolver,
) -> Result<Vec<Token>, EvalError> {
    let [a, _, b, _] = take::<4>(tokens)?;
    let product = BinaryOperator::Multiply.evaluate(number(a)?, number(b)?);
    Ok(vec![Token::Number(product)])
}

fn strip_parentheses(
    tokens: Vec<Token>,
    _: &Context,
    _: &FunctionResolver,
) -> Result<Vec<Token>, EvalError> {
    let [_, inner, _] = take::<3>(tokens)?;
    Ok(vec![inner])
}

fn fold_operation(
    tokens: Vec<Token>,
    _: &Context,
    _: &FunctionResolver,
) -> Result<Vec<Token>, EvalError> {
    let [a, operator, b] = take::<3>(tokens)?;
    let operator = match operator {
        Token::Operator(operator) => operator,
        other => return Err(mismatch("an operator", &other)),
    };
    Ok(vec![Token::Number(operator.evaluate(number(a)?, number(b)?))])
}

fn collect_arguments(
    tokens: Vec<Token>,
    _: &Context,
    _: &FunctionResolver,
) -> Result<Vec<Token>, EvalError> {
    let [a, _, b] = take::<3>(tokens)?;
    Ok(vec![Token::Params(vec![literal_value(a)?, literal_value(b)?])])
}

fn append_argument(
    tokens: Vec<Token>,
    _: &Context,
    _: &FunctionResolver,
) -> Result<Vec<Token>, EvalError> {
    let [params, _, literal] = take::<3>(tokens)?;
    let mut arguments = params_values(params)?;
    arguments.push(literal_value(literal)?);
    Ok(vec![Token::Params(arguments)])
}

fn concatenate_arguments(
    tokens: Vec<Token>,
    _: &Context,
    _: &FunctionResolver,
) -> Result<Vec<Token>, EvalError> {
    let [first, _, second] = take::<3>(tokens)?;
    let mut arguments = params_values(first)?;
    arguments.extend(params_values(second)?);
    Ok(vec![Token::Params(arguments)])
}

fn wrap_no_arguments(
    tokens: Vec<Token>,
    _: &Context,
    _: &FunctionResolver,
) -> Result<Vec<Token>, EvalError> {
    let [ident, open, close] = take::<3>(tokens)?;
    Ok(vec![ident, open, Token::Params(Vec::new()), close])
}

fn call_function(
    tokens: Vec<Token>,
    _: &Context,
    functions: &FunctionResolver,
) -> Result<Vec<Token>, EvalError> {
    let [ident, _, params, _] = take::<4>(tokens)?;
    let name = ident_name(ident)?;
    let arguments = params_values(params)?;

    let returned = functions.call(&name, &arguments)?;
    let token = Token::from_scalar(returned).map_err(|value| EvalError::BadFunctionReturn {
        name,
        kind: value.kind(),
    })?;
    Ok(vec![token])
}

fn substitute_variable(
    tokens: Vec<Token>,
    context: &Context,
    _: &FunctionResolver,
) -> Result<Vec<Token>, EvalError> {
    let [ident] = take::<1>(tokens)?;
    let name = ident_name(ident)?;

    let bound = match context.get(&name) {
        Some(value) => value.clone(),
        None => {
            return Err(EvalError::BadVariable {
                name,
                kind: "undefined",
            })
        }
    };
    let token = Token::from_scalar(bound).map_err(|value| EvalError::BadVariable {
        name,
        kind: value.kind(),
    })?;
    Ok(vec![token])
}

fn take<const N: usize>(tokens: Vec<Token>) -> Result<[Token; N], EvalError> {
    tokens.try_into().map_err(|tokens: Vec<Token>| {
        EvalError::Internal(format!(
            "expected {} matched tokens, got {}",
            N,
            tokens.len()
        ))
    })
}

fn number(token: Token) -> Result<f64, EvalError> {
    match token {
        Token::Number(value) => Ok(value),
        other => Err(mismatch("a number", &other)),
    }
}

fn literal_value(token: Token) -> Result<Value, EvalError> {
    let kind = token.kind();
    token
        .into_scalar()
        .ok_or_else(|| EvalError::Internal(format!("expected a literal, got {}", kind)))
}

fn params_values(token: Token) -> Result<Vec<Value>, EvalError> {
    match token {
        Token::Params(values) => Ok(values),
        other => Err(mismatch("params", &other)),
    }
}

fn ident_name(token: Token) -> Result<String, EvalError> {
    match token {
        Token::Ident(name) => Ok(name),
        other => Err(mismatch("an identifier", &other)),
    }
}

fn mismatch(expected: &str, found: &Token) -> EvalError {
    EvalError::Internal(format!("expected {}, got {:?}", expected, found))
}
