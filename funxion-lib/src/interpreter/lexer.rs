use crate::interpreter::error::ParseError;
use crate::interpreter::operator::BinaryOperator;
use crate::interpreter::token::Token;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

/// What a pattern in the lexer table produces when it matches.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Lexeme {
    Number,
    String,
    Bool,
    Operator(BinaryOperator),
    ParenOpen,
    ParenClose,
    Comma,
    Whitespace,
    Ident,
}

/// Token patterns, in the order they are tried at each cursor position.
/// Every pattern is anchored to the cursor.
static PATTERNS: Lazy<Vec<(Lexeme, Regex)>> = Lazy::new(|| {
    let table = [
        (Lexeme::Number, r"[0-9]+(\.[0-9]+)?"),
        (Lexeme::String, r#""(\\.|[^"])*""#),
        (Lexeme::Bool, r"true|false"),
        (Lexeme::Operator(BinaryOperator::Add), r"\+"),
        (Lexeme::Operator(BinaryOperator::Subtract), r"-"),
        (Lexeme::Operator(BinaryOperator::Multiply), r"\*"),
        (Lexeme::Operator(BinaryOperator::Divide), r"/"),
        (Lexeme::Operator(BinaryOperator::Modulo), r"%"),
        (Lexeme::Operator(BinaryOperator::Exponentiate), r"\^"),
        (Lexeme::ParenOpen, r"\("),
        (Lexeme::ParenClose, r"\)"),
        (Lexeme::Comma, r","),
        (Lexeme::Whitespace, r"\s+"),
        (Lexeme::Ident, r"[a-zA-Z]+"),
    ];
    table
        .into_iter()
        .map(|(lexeme, pattern)| {
            let anchored = format!("^(?:{})", pattern);
            let regex = Regex::new(&anchored).expect("lexer patterns are valid regular expressions");
            (lexeme, regex)
        })
        .collect()
});

/// Splits an expression into tokens.
///
/// # Arguments
///
/// * `expression`: The text to tokenize.
///
/// returns: The tokens in source order (whitespace dropped), and the distinct identifier
/// names in order of first appearance.
pub(crate) fn tokenize(expression: &str) -> Result<(Vec<Token>, Vec<String>), ParseError> {
    let mut tokens = Vec::new();
    let mut cursor = 0;

    while cursor < expression.len() {
        let rest = &expression[cursor..];
        let (lexeme, text) = PATTERNS
            .iter()
            .find_map(|(lexeme, regex)| regex.find(rest).map(|found| (*lexeme, found.as_str())))
            .ok_or_else(|| unexpected_character(expression, cursor))?;

        if let Some(token) = make_token(lexeme, text, cursor)? {
            tokens.push(token);
        }
        cursor += text.len();
    }

    let vars = tokens
        .iter()
        .filter_map(|token| match token {
            Token::Ident(name) => Some(name.clone()),
            _ => None,
        })
        .unique()
        .collect();

    Ok((tokens, vars))
}

fn make_token(lexeme: Lexeme, text: &str, offset: usize) -> Result<Option<Token>, ParseError> {
    let token = match lexeme {
        Lexeme::Whitespace => return Ok(None),
        Lexeme::Number => Token::Number(text.parse().map_err(|_| ParseError::UnexpectedCharacter {
            offset,
            character: text.chars().next().unwrap_or_default(),
        })?),
        Lexeme::String => Token::String(decode_string(text, offset)?),
        Lexeme::Bool => Token::Bool(text == "true"),
        Lexeme::Operator(operator) => Token::Operator(operator),
        Lexeme::ParenOpen => Token::ParenOpen,
        Lexeme::ParenClose => Token::ParenClose,
        Lexeme::Comma => Token::Comma,
        Lexeme::Ident => Token::Ident(text.to_string()),
    };
    Ok(Some(token))
}

/// Decodes a quoted literal with JSON string escapes (`\"`, `\\`, `\n`, `\u00e9`, ...).
fn decode_string(text: &str, offset: usize) -> Result<String, ParseError> {
    serde_json::from_str(text).map_err(|error| ParseError::InvalidString {
        offset,
        reason: error.to_string(),
    })
}

fn unexpected_character(expression: &str, offset: usize) -> ParseError {
    ParseError::UnexpectedCharacter {
        offset,
        character: expression[offset..].chars().next().unwrap_or_default(),
    }
}
