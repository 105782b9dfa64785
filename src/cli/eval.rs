//! Evaluate expressions against JSON input

use std::time::Duration;

use super::CliError;
use crate::{
    Evaluator, EvaluatorOptions, FixedTimeout, ReferenceResolver, Scope, extract_references,
    convert::{json_to_scope, json_to_value, value_to_json},
    timeout::DEFAULT_TIMEOUT,
    validation::DEFAULT_MAX_EXPRESSION_LENGTH,
};

/// Options for the eval command
#[derive(Debug, Clone, Default)]
pub struct EvalOptions {
    /// The expression to evaluate
    pub expression: String,
    /// JSON bound to `context`
    pub context: Option<String>,
    /// JSON object of step name to step result
    pub steps: Option<String>,
    /// JSON object of per-call variables, shadowing step results
    pub vars: Option<String>,
    pub timeout_ms: Option<u64>,
    pub max_length: Option<usize>,
}

/// Evaluate an expression, returning the result as JSON.
pub fn execute_eval(options: &EvalOptions) -> Result<serde_json::Value, CliError> {
    let context = match &options.context {
        Some(text) => json_to_value(serde_json::from_str(text)?),
        None => crate::Value::Null,
    };
    let steps = parse_scope(options.steps.as_deref(), "--steps")?;
    let vars = parse_scope(options.vars.as_deref(), "--vars")?;

    let timeout = options
        .timeout_ms
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_TIMEOUT);
    let limits = EvaluatorOptions {
        max_expression_length: options.max_length.unwrap_or(DEFAULT_MAX_EXPRESSION_LENGTH),
    };

    let evaluator = Evaluator::new(ReferenceResolver::new(steps, context))
        .with_timeout_policy(FixedTimeout(timeout))
        .with_options(limits);

    let result = evaluator.evaluate(&options.expression, &vars)?;
    Ok(value_to_json(result))
}

/// List the step names an expression depends on.
pub fn execute_refs(expression: &str) -> Vec<String> {
    extract_references(expression)
}

fn parse_scope(text: Option<&str>, flag: &'static str) -> Result<Scope, CliError> {
    let Some(text) = text else {
        return Ok(Scope::new());
    };
    json_to_scope(serde_json::from_str(text)?).ok_or(CliError::NotAnObject(flag))
}
