use crate::interpreter::error::EvalError;
use crate::interpreter::value::Value;
use anyhow::{anyhow, bail, Result};
use itertools::Itertools;
use std::collections::HashMap;

/// A caller supplied function. Receives the already evaluated arguments.
pub type Function = Box<dyn Fn(&[Value]) -> Result<Value> + Send + Sync>;

/// Caller supplied functions by name. These shadow the standard functions.
pub type Functions = HashMap<String, Function>;

type StandardFunction = fn(&[Value]) -> Result<Value>;

const STANDARD_FUNCTIONS: [(&str, StandardFunction); 3] = [
    ("if", standard_if),
    ("join", standard_join),
    ("mean", standard_mean),
];

/// Resolves function names during one evaluation, looking at the caller's functions first
/// and the standard functions second.
pub struct FunctionResolver<'a> {
    custom: &'a Functions,
}

impl<'a> FunctionResolver<'a> {
    pub fn new(custom: &'a Functions) -> Self {
        FunctionResolver { custom }
    }

    /// Calls the function called `name`.
    ///
    /// # Arguments
    ///
    /// * `name`: Name of a custom or standard function.
    /// * `args`: The evaluated arguments.
    ///
    /// returns: Whatever the function returns. It is up to the caller to check that the
    /// value is a scalar.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, EvalError> {
        let result = if let Some(function) = self.custom.get(name) {
            function(args)
        } else if let Some(function) = standard_function(name) {
            function(args)
        } else {
            return Err(EvalError::UnknownFunction {
                name: name.to_string(),
            });
        };

        result.map_err(|source| EvalError::FunctionFailed {
            name: name.to_string(),
            source,
        })
    }
}

fn standard_function(name: &str) -> Option<StandardFunction> {
    STANDARD_FUNCTIONS
        .iter()
        .find(|(standard_name, _)| *standard_name == name)
        .map(|(_, function)| *function)
}

fn standard_if(args: &[Value]) -> Result<Value> {
    match args {
        [Value::Bool(condition), when_true, when_false] => Ok(if *condition {
            when_true.clone()
        } else {
            when_false.clone()
        }),
        [condition, _, _] => bail!("condition must be a bool, not a {}", condition.kind()),
        _ => bail!("expected 3 arguments, got {}", args.len()),
    }
}

fn standard_join(args: &[Value]) -> Result<Value> {
    Ok(Value::String(args.iter().join("")))
}

fn standard_mean(args: &[Value]) -> Result<Value> {
    if args.is_empty() {
        bail!("cannot take the mean of no values");
    }
    let numbers: Vec<f64> = args
        .iter()
        .map(|arg| {
            arg.as_number()
                .ok_or_else(|| anyhow!("expected a number, got a {}", arg.kind()))
        })
        .collect::<Result<_>>()?;

    Ok(Value::Number(numbers.iter().sum::<f64>() / numbers.len() as f64))
}
