use crate::interpreter::error::EvalError;
use crate::interpreter::functions::FunctionResolver;
use crate::interpreter::grammar::{Rule, GRAMMAR};
use crate::interpreter::token::Token;
use crate::interpreter::tokens_to_string;
use crate::interpreter::value::{Context, Value};
use log::{debug, log_enabled, trace, Level};

/// The working copy of a token sequence while it is being rewritten.
pub(crate) struct ReductionState {
    program: Vec<Token>,
}

impl ReductionState {
    pub(crate) fn new(tokens: &[Token]) -> Self {
        ReductionState {
            program: tokens.to_vec(),
        }
    }

    pub(crate) fn is_reduced(&self) -> bool {
        self.program.len() <= 1
    }

    /// Applies the highest priority rule once, at its leftmost match.
    ///
    /// returns: The rule that was applied.
    pub(crate) fn step(
        &mut self,
        context: &Context,
        functions: &FunctionResolver,
    ) -> Result<&'static Rule, EvalError> {
        let (rule, position) = GRAMMAR
            .iter()
            .find_map(|rule| rule.find(&self.program).map(|position| (rule, position)))
            .ok_or(EvalError::NoReduction)?;

        let end = position + rule.pattern.len();
        let matched: Vec<Token> = self.program.drain(position..end).collect();
        let replacement = (rule.transform)(matched, context, functions)?;
        self.program.splice(position..position, replacement);

        Ok(rule)
    }

    /// The value of the single remaining token.
    pub(crate) fn finish(mut self) -> Result<Value, EvalError> {
        let token = match self.program.pop() {
            Some(token) if self.program.is_empty() => token,
            Some(_) => return Err(EvalError::NoReduction),
            None => return Err(EvalError::EmptyExpression),
        };
        let kind = token.kind();
        token
            .into_scalar()
            .ok_or(EvalError::NonScalarResult { kind })
    }

    fn log_program(&self, rule: &Rule) {
        if log_enabled!(Level::Trace) {
            match tokens_to_string(self.program.clone()) {
                Ok(text) => trace!("{}: {}", rule.name, text),
                Err(_) => trace!("{}: {:?}", rule.name, self.program),
            }
        }
    }
}

/// Rewrites `tokens` until a single token is left.
///
/// # Arguments
///
/// * `tokens`: The sequence to reduce. It is copied, never modified.
/// * `context`: Variable bindings.
/// * `functions`: Resolves the names of called functions.
///
/// returns: The value of the last remaining token, which must be a literal.
pub(crate) fn reduce(
    tokens: &[Token],
    context: &Context,
    functions: &FunctionResolver,
) -> Result<Value, EvalError> {
    let mut state = ReductionState::new(tokens);
    let mut steps = 0;

    while !state.is_reduced() {
        let rule = state.step(context, functions)?;
        state.log_program(rule);
        steps += 1;
    }

    let value = state.finish()?;
    debug!("reduced {} tokens in {} steps to {}", tokens.len(), steps, value);
    Ok(value)
}
