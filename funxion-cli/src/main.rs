mod session;

use anyhow::{Context as _, Result};
use clap::Parser;
use clap_verbosity_flag::Verbosity;
use funxion::{exec, parse, Context, Functions, Value};
use log::{debug, LevelFilter};

/// Evaluates formula expressions such as `(7+(6*5^2+3))/2` or `if(flag, "X", "Y")`
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Arguments {
    /// The expression to evaluate. Reads expressions line by line from stdin when omitted
    expression: Option<String>,

    /// Binds a variable, e.g. `--var x=2` or `--var name=Ada`
    #[clap(short = 'D', long = "var", value_name = "NAME=VALUE", parse(try_from_str = parse_binding))]
    vars: Vec<(String, Value)>,

    /// Print the tokens and variables of the expression as JSON instead of evaluating it
    #[clap(long)]
    tokens: bool,

    #[clap(flatten)]
    verbose: Verbosity,
}

fn main() -> Result<()> {
    let args = Arguments::parse();
    env_logger::Builder::new()
        .filter_level(
            args.verbose
                .log_level()
                .map_or(LevelFilter::Off, |level| level.to_level_filter()),
        )
        .parse_default_env()
        .init();

    let context: Context = args.vars.into_iter().collect();
    debug!("starting with {} bound variables", context.len());

    match args.expression {
        Some(expression) => run_once(&expression, &context, args.tokens),
        None => session::run(context),
    }
}

fn run_once(expression: &str, context: &Context, print_tokens: bool) -> Result<()> {
    let parsed = parse(expression).with_context(|| format!("could not parse '{}'", expression))?;

    if print_tokens {
        println!("{}", serde_json::to_string_pretty(&parsed)?);
        return Ok(());
    }

    let value = exec(&parsed, context, &Functions::new())
        .with_context(|| format!("could not evaluate '{}'", expression))?;
    println!("{}", value);
    Ok(())
}

fn parse_binding(text: &str) -> Result<(String, Value), String> {
    let (name, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", text))?;
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(format!("'{}' is not a valid variable name", name));
    }
    Ok((name.to_string(), parse_value(value)))
}

/// Reads a bool or number where possible, anything else as a string.
fn parse_value(text: &str) -> Value {
    match text {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => text
            .parse::<f64>()
            .map(Value::Number)
            .unwrap_or_else(|_| Value::String(text.to_string())),
    }
}
