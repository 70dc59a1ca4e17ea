pub mod error;
pub mod functions;
mod grammar;
mod lexer;
pub mod operator;
mod reducer;
pub mod token;
pub mod value;

use crate::interpreter::error::{Error, EvalError, ParseError};
use crate::interpreter::functions::{FunctionResolver, Functions};
use crate::interpreter::token::Token;
use crate::interpreter::value::{Context, Value};
use anyhow::{Context as _, Result};
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};
use string_builder::Builder;

/// A tokenized expression together with the variables it references.
///
/// When loaded from JSON only the tokens are read; the variables are collected again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SerializedParseResult")]
pub struct ParseResult {
    tokens: Vec<Token>,
    vars: Vec<String>,
}

#[derive(Deserialize)]
struct SerializedParseResult {
    tokens: Vec<Token>,
}

impl From<SerializedParseResult> for ParseResult {
    fn from(serialized: SerializedParseResult) -> Self {
        ParseResult::from_tokens(serialized.tokens)
    }
}

impl ParseResult {
    /// Wraps an already tokenized expression, e.g. one built by hand or loaded from JSON.
    /// The variables are collected from its identifiers.
    pub fn from_tokens(tokens: Vec<Token>) -> ParseResult {
        let vars = tokens
            .iter()
            .filter_map(|token| match token {
                Token::Ident(name) => Some(name.clone()),
                _ => None,
            })
            .unique()
            .collect();
        ParseResult { tokens, vars }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Distinct identifier names, in order of first appearance. Names of called functions
    /// are included, as the lexer cannot tell them apart from variables.
    pub fn vars(&self) -> &[String] {
        &self.vars
    }
}

/// Tokenizes an expression.
///
/// # Arguments
///
/// * `expression`: The text of the expression, e.g. `if(a, "X", mean(b, 2))`.
///
/// returns: The tokens and the variable names referenced by them.
///
/// # Examples
///
/// ```
/// # use anyhow::Result;
/// # fn main() -> Result<()> {
/// use funxion::interpreter::parse;
///
/// let parsed = parse("b + a + b")?;
/// assert_eq!(parsed.vars(), ["b", "a"]);
/// # Ok::<(), anyhow::Error>(()) }
/// ```
pub fn parse(expression: &str) -> Result<ParseResult, ParseError> {
    let (tokens, vars) = lexer::tokenize(expression)?;
    debug!(
        "parsed {} tokens and {} variables from {:?}",
        tokens.len(),
        vars.len(),
        expression
    );
    Ok(ParseResult { tokens, vars })
}

/// Evaluates a parsed expression.
///
/// The same parse result can be evaluated any number of times; each evaluation works on
/// its own copy of the tokens.
///
/// Variables are substituted only once no other rule applies, so operators next to a
/// variable do not bind tighter than ones elsewhere: `a * 2 + 2` with `a = 10` is `40`.
///
/// # Arguments
///
/// * `parsed`: The output of [`parse`].
/// * `context`: Values of the variables referenced by the expression.
/// * `functions`: Functions in addition to `if`, `join` and `mean`. A function with the
///   same name as a standard one replaces it.
///
/// returns: A number, string or bool.
///
/// # Examples
///
/// ```
/// # use anyhow::Result;
/// # fn main() -> Result<()> {
/// use funxion::interpreter::functions::Functions;
/// use funxion::interpreter::value::{Context, Value};
/// use funxion::interpreter::{exec, parse};
///
/// let parsed = parse("(a * 2) + mean(1, 3)")?;
/// let mut context = Context::new();
/// context.insert("a".to_string(), Value::Number(10.0));
///
/// let value = exec(&parsed, &context, &Functions::new())?;
/// assert_eq!(value, Value::Number(22.0));
/// # Ok::<(), anyhow::Error>(()) }
/// ```
pub fn exec(
    parsed: &ParseResult,
    context: &Context,
    functions: &Functions,
) -> Result<Value, EvalError> {
    let resolver = FunctionResolver::new(functions);
    reducer::reduce(&parsed.tokens, context, &resolver)
}

/// Parses and evaluates an expression in one go.
pub fn evaluate(
    expression: &str,
    context: &Context,
    functions: &Functions,
) -> Result<Value, Error> {
    let parsed = parse(expression)?;
    Ok(exec(&parsed, context, functions)?)
}

/// Renders tokens back into expression text, with whitespace around the lower
/// precedence operators.
///
/// # Arguments
///
/// * `tokens`: The tokens to print.
///
/// returns: A pretty-printed text-version of the given tokens.
///
/// # Examples
///
/// ```
/// use funxion::interpreter::{parse, tokens_to_string};
/// # use anyhow::Result;
///
/// # fn main() -> Result<()> {
/// let parsed = parse("if(x^2, \"big\", 1)")?;
/// let pretty_printed_tokens = tokens_to_string(parsed.tokens().to_vec())?;
/// print!("{}", pretty_printed_tokens);
/// # Ok::<(), anyhow::Error>(()) }
/// ```
pub fn tokens_to_string(tokens: Vec<Token>) -> Result<String> {
    let mut builder = Builder::new(tokens.len());

    for token in tokens {
        match token {
            Token::String(value) => builder.append(serde_json::to_string(&value)?),
            Token::Operator(operator) if operator.symbol() == '^' => {
                builder.append(operator.to_string())
            }
            Token::Operator(operator) => {
                builder.append(" ");
                builder.append(operator.to_string());
                builder.append(" ");
            }
            Token::Comma => builder.append(", "),
            Token::Params(values) => {
                let rendered: Vec<String> = values
                    .into_iter()
                    .map(|value| match value {
                        Value::String(text) => serde_json::to_string(&text),
                        other => Ok(other.to_string()),
                    })
                    .collect::<Result<_, _>>()?;
                builder.append(format!("[{}]", rendered.join(", ")));
            }
            _ => builder.append(token.to_string()),
        }
    }

    builder.string().context("Failed to build token string")
}

#[cfg(test)]
mod interpreter_tests {
    use super::*;
    use anyhow::bail;
    use parameterized_macro::parameterized;

    fn run(expression: &str) -> Result<Value, Error> {
        evaluate(expression, &Context::new(), &Functions::new())
    }

    #[parameterized(
        expression = {
            "(7+(6*5^2+3))/2",
            "1 + 2 * 3",
            "2 * 3 + 4 * 5",
            "10 - 4 - 3",
            "100 / 10 / 5",
            "2 ^ 3 * 2",
            "(1 + 2) * 3",
            "2(3 + 4)",
            "7 % 4 + 1",
            "2 ^ 3 ^ 2",
            "((5))",
        },
        expected = {
            80.0,
            7.0,
            26.0,
            3.0,
            2.0,
            16.0,
            9.0,
            14.0,
            4.0,
            64.0,
            5.0,
        }
    )]
    fn arithmetic_follows_conventional_precedence(expression: &str, expected: f64) {
        assert_eq!(run(expression).unwrap(), Value::Number(expected));
    }

    #[test]
    fn rule_order_decides_between_same_level_operators() {
        // Addition is tried before subtraction and multiplication before remainder.
        assert_eq!(run("2 - 3 + 4").unwrap(), Value::Number(-5.0));
        assert_eq!(run("17 % 5 * 3").unwrap(), Value::Number(2.0));
    }

    #[test]
    fn variables_are_substituted_from_context() {
        let parsed = parse("a + b").unwrap();
        let mut context = Context::new();
        context.insert("a".into(), Value::Number(10.0));
        context.insert("b".into(), Value::Number(5.0));

        let value = exec(&parsed, &context, &Functions::new()).unwrap();

        assert_eq!(value, Value::Number(15.0));
    }

    #[test]
    fn vars_are_reported_in_first_seen_order() {
        assert_eq!(parse("a + b").unwrap().vars(), ["a", "b"]);
        assert_eq!(parse("b + a + b").unwrap().vars(), ["b", "a"]);
    }

    #[test]
    fn standard_if_selects_branch() {
        assert_eq!(
            run(r#"if(true,"SUCCESS","FAIL")"#).unwrap(),
            Value::String("SUCCESS".into())
        );
        assert_eq!(run(r#"if(false, 1, 2)"#).unwrap(), Value::Number(2.0));
    }

    #[test]
    fn standard_join_concatenates() {
        assert_eq!(
            run(r#"join("Hello,", " World!")"#).unwrap(),
            Value::String("Hello, World!".into())
        );
    }

    #[test]
    fn standard_join_stringifies_numbers() {
        assert_eq!(
            run(r#"join("n=", 2 * 3, ".", 0.5)"#).unwrap(),
            Value::String("n=6.0.5".into())
        );
    }

    #[test]
    fn standard_mean_averages() {
        assert_eq!(run("mean(6,3,100,3,13)").unwrap(), Value::Number(25.0));
    }

    #[test]
    fn mean_without_arguments_is_an_error() {
        let error = run("mean()").unwrap_err();

        assert!(matches!(
            error,
            Error::Eval(EvalError::FunctionFailed { .. })
        ));
    }

    #[test]
    fn nested_calls_are_evaluated_inside_out() {
        assert_eq!(
            run(r#"if(true, join("a", join("b", "c")), "no")"#).unwrap(),
            Value::String("abc".into())
        );
        assert_eq!(run("mean(mean(2, 4), 5) * 2").unwrap(), Value::Number(8.0));
    }

    #[test]
    fn custom_functions_extend_standard_set() {
        let parsed = parse("foo(1)").unwrap();
        let mut functions = Functions::new();
        functions.insert(
            "foo".into(),
            Box::new(|args: &[Value]| -> Result<Value> {
                match args {
                    [Value::Number(value)] => Ok(Value::Number(value + 1.0)),
                    _ => bail!("foo takes one number"),
                }
            }),
        );

        let value = exec(&parsed, &Context::new(), &functions).unwrap();

        assert_eq!(value, Value::Number(2.0));
    }

    #[test]
    fn zero_argument_custom_function_is_called() {
        let parsed = parse("answer() + 0").unwrap();
        let mut functions = Functions::new();
        functions.insert(
            "answer".into(),
            Box::new(|_: &[Value]| -> Result<Value> { Ok(Value::Number(42.0)) }),
        );

        let value = exec(&parsed, &Context::new(), &functions).unwrap();

        assert_eq!(value, Value::Number(42.0));
    }

    #[test]
    fn custom_function_returning_non_scalar_is_rejected() {
        let parsed = parse("nothing()").unwrap();
        let mut functions = Functions::new();
        functions.insert(
            "nothing".into(),
            Box::new(|_: &[Value]| -> Result<Value> { Ok(Value::Empty) }),
        );

        let error = exec(&parsed, &Context::new(), &functions).unwrap_err();

        assert!(matches!(
            error,
            EvalError::BadFunctionReturn { kind: "empty", .. }
        ));
    }

    #[test]
    fn unknown_function_is_an_error() {
        let error = run("nope(1)").unwrap_err();

        assert!(matches!(
            &error,
            Error::Eval(EvalError::UnknownFunction { name }) if name == "nope"
        ));
    }

    #[test]
    fn string_variable_in_arithmetic_is_invalid() {
        let parsed = parse("foo * 5").unwrap();
        let mut context = Context::new();
        context.insert("foo".into(), Value::String("hi".into()));

        let error = exec(&parsed, &context, &Functions::new()).unwrap_err();

        assert_eq!(error.to_string(), "Invalid expression");
    }

    #[test]
    fn variables_are_substituted_after_arithmetic_around_them() {
        let mut context = Context::new();
        context.insert("a".into(), Value::Number(10.0));

        let late = evaluate("a * 2 + 2", &context, &Functions::new()).unwrap();
        let grouped = evaluate("(a * 2) + 2", &context, &Functions::new()).unwrap();

        assert_eq!(late, Value::Number(40.0));
        assert_eq!(grouped, Value::Number(22.0));
    }

    #[test]
    fn unbound_variable_is_an_error() {
        let error = run("x + 1").unwrap_err();

        assert!(matches!(
            error,
            Error::Eval(EvalError::BadVariable {
                kind: "undefined",
                ..
            })
        ));
    }

    #[test]
    fn lone_identifier_is_left_unresolved() {
        let parsed = parse("a").unwrap();
        let mut context = Context::new();
        context.insert("a".into(), Value::Number(1.0));

        let error = exec(&parsed, &context, &Functions::new()).unwrap_err();

        assert!(matches!(error, EvalError::NonScalarResult { .. }));
    }

    #[test]
    fn parse_and_eval_errors_are_distinct() {
        assert!(matches!(run("1 $ 2").unwrap_err(), Error::Parse(_)));
        assert!(matches!(run("1 +").unwrap_err(), Error::Eval(_)));
    }

    #[test]
    fn empty_expression_is_an_error() {
        assert!(matches!(
            run("").unwrap_err(),
            Error::Eval(EvalError::EmptyExpression)
        ));
    }

    #[test]
    fn evaluation_is_repeatable() {
        let parsed = parse("n * 2 + mean(n, 4)").unwrap();
        let mut context = Context::new();
        context.insert("n".into(), Value::Number(2.0));

        let first = exec(&parsed, &context, &Functions::new()).unwrap();
        let second = exec(&parsed, &context, &Functions::new()).unwrap();

        assert_eq!(first, second);
        assert_eq!(first, Value::Number(7.0));
    }

    #[test]
    fn parse_result_is_shared_between_contexts() {
        let parsed = parse("if(flag, x, 0)").unwrap();
        let with = |flag: bool| {
            let mut context = Context::new();
            context.insert("flag".into(), Value::Bool(flag));
            context.insert("x".into(), Value::Number(3.0));
            exec(&parsed, &context, &Functions::new()).unwrap()
        };

        assert_eq!(with(true), Value::Number(3.0));
        assert_eq!(with(false), Value::Number(0.0));
    }

    #[test]
    fn parse_result_is_evaluated_from_several_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ParseResult>();
        assert_send_sync::<Functions>();

        let parsed = parse("x * 2").unwrap();
        let functions = Functions::new();
        let results: Vec<Value> = std::thread::scope(|scope| {
            let handles: Vec<_> = [1.0, 2.0]
                .into_iter()
                .map(|x| {
                    let (parsed, functions) = (&parsed, &functions);
                    scope.spawn(move || {
                        let mut context = Context::new();
                        context.insert("x".into(), Value::Number(x));
                        exec(parsed, &context, functions).unwrap()
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect()
        });

        assert_eq!(results, vec![Value::Number(2.0), Value::Number(4.0)]);
    }

    #[test]
    fn deserializing_recollects_vars_from_tokens() {
        let json = r#"{
            "tokens": [
                { "type": "ident", "value": "a" },
                { "type": "op_add", "value": "+" },
                { "type": "ident", "value": "a" }
            ],
            "vars": ["zzz", "zzz"]
        }"#;

        let parsed: ParseResult = serde_json::from_str(json).unwrap();

        assert_eq!(parsed.vars(), ["a"]);
        assert_eq!(parsed, parse("a + a").unwrap());
    }

    #[test]
    fn parse_result_serializes_to_type_value_pairs() {
        let parsed = parse("test(a)").unwrap();

        let json = serde_json::to_value(&parsed).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "tokens": [
                    { "type": "ident", "value": "test" },
                    { "type": "paren_open", "value": "(" },
                    { "type": "ident", "value": "a" },
                    { "type": "paren_close", "value": ")" },
                ],
                "vars": ["test", "a"],
            })
        );
    }

    #[test]
    fn tokens_are_printed_back_as_text() {
        let parsed = parse(r#"if(x^2,"a \"b\"",c%2)"#).unwrap();
        let text = tokens_to_string(parsed.tokens().to_vec()).unwrap();

        assert_eq!(text, r#"if(x^2, "a \"b\"", c % 2)"#);
    }
}
