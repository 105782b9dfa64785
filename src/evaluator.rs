use thiserror::Error;

use crate::{
    ast::{ArrayElement, AstNode, BinOp, ObjectProperty},
    error::ExpressionError,
    lexer::tokenize,
    parser::Parser,
    resolver::{ReferenceResolver, Scope},
    timeout::{Deadline, FixedTimeout, StepRef, TimeoutPolicy},
    validation::{DEFAULT_MAX_EXPRESSION_LENGTH, validate_expression},
    value::Value,
};

pub mod functions;
pub mod operators;

pub use operators::{OperatorError, OperatorFn, OperatorTable, StandardOperators};

/// A well-formed expression that failed while being evaluated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// The operator table has no entry for the operator
    #[error("unknown operator '{0}'")]
    UnknownOperator(BinOp),

    #[error("cannot perform {0} on non-numeric values")]
    NonNumeric(BinOp),

    #[error("division/modulo by zero")]
    DivisionByZero,

    #[error("cannot compare values of different types ({left} and {right})")]
    IncomparableTypes {
        left: &'static str,
        right: &'static str,
    },

    #[error("cannot compare {0} values")]
    Unorderable(&'static str),

    #[error("invalid spread operator usage: can only spread objects")]
    InvalidObjectSpread,

    #[error("invalid spread operator usage: can only spread arrays or objects")]
    InvalidArraySpread,

    #[error("function '{0}' is not allowed")]
    FunctionNotAllowed(String),

    /// An operator implementation failed with something other than an
    /// `EvalError`
    #[error("failed to evaluate operation: {0}")]
    OperationFailed(String),

    /// A node shape the parser never produces
    #[error("malformed expression node: {0}")]
    MalformedNode(String),
}

/// Evaluation limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluatorOptions {
    /// Longest accepted expression, in characters
    pub max_expression_length: usize,
}

impl Default for EvaluatorOptions {
    fn default() -> Self {
        EvaluatorOptions {
            max_expression_length: DEFAULT_MAX_EXPRESSION_LENGTH,
        }
    }
}

/// Evaluates expression text against step results and a context object.
///
/// Every call runs the full pipeline: validation, tokenizing, parsing and
/// a walk of the syntax tree, all under one time budget.
///
/// # Examples
///
/// ```
/// use safe_expr::{Evaluator, ReferenceResolver, Scope, Value};
///
/// let resolver = ReferenceResolver::new(Scope::new(), Value::Null)
///     .with_step_result("count", Value::Integer(4));
/// let evaluator = Evaluator::new(resolver);
///
/// let result = evaluator.evaluate("${count} * 2 + 1", &Scope::new()).unwrap();
/// assert_eq!(result, Value::Integer(9));
/// ```
pub struct Evaluator {
    resolver: ReferenceResolver,
    operators: Box<dyn OperatorTable>,
    timeout_policy: Box<dyn TimeoutPolicy>,
    options: EvaluatorOptions,
}

impl Evaluator {
    /// Standard operators, the default one-second budget and default
    /// limits.
    pub fn new(resolver: ReferenceResolver) -> Self {
        Evaluator {
            resolver,
            operators: Box::new(StandardOperators),
            timeout_policy: Box::new(FixedTimeout::default()),
            options: EvaluatorOptions::default(),
        }
    }

    pub fn with_operators(mut self, operators: impl OperatorTable + 'static) -> Self {
        self.operators = Box::new(operators);
        self
    }

    pub fn with_timeout_policy(mut self, policy: impl TimeoutPolicy + 'static) -> Self {
        self.timeout_policy = Box::new(policy);
        self
    }

    pub fn with_options(mut self, options: EvaluatorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn resolver(&self) -> &ReferenceResolver {
        &self.resolver
    }

    /// Evaluate `expression`; `extra` shadows step results for this call.
    pub fn evaluate(&self, expression: &str, extra: &Scope) -> Result<Value, ExpressionError> {
        self.run(expression, extra, None)
    }

    /// Like [`evaluate`](Self::evaluate), with the time budget chosen for
    /// `step` by the timeout policy.
    pub fn evaluate_for_step(
        &self,
        expression: &str,
        extra: &Scope,
        step: &StepRef,
    ) -> Result<Value, ExpressionError> {
        self.run(expression, extra, Some(step))
    }

    fn run(
        &self,
        expression: &str,
        extra: &Scope,
        step: Option<&StepRef>,
    ) -> Result<Value, ExpressionError> {
        validate_expression(expression, self.options.max_expression_length)?;

        let deadline = Deadline::start(expression, self.timeout_policy.timeout_for(step));
        let result = self.pipeline(expression, extra, &deadline);
        let elapsed_us = deadline.elapsed().as_micros() as u64;

        match &result {
            Ok(_) => tracing::debug!(expression, elapsed_us, "evaluated expression"),
            Err(err) if err.is_timeout() => {
                tracing::warn!(expression, elapsed_us, "expression evaluation timed out")
            }
            Err(err) => tracing::debug!(expression, error = %err, "expression evaluation failed"),
        }

        result.map_err(|err| err.with_expression(expression))
    }

    fn pipeline(
        &self,
        expression: &str,
        extra: &Scope,
        deadline: &Deadline,
    ) -> Result<Value, ExpressionError> {
        let tokens = tokenize(expression)?;
        let ast = Parser::new(deadline).parse(&tokens)?;
        self.evaluate_ast(&ast, extra, deadline)
    }

    /// Walk an already parsed tree. The deadline is checked on entry to
    /// every node.
    pub fn evaluate_ast(
        &self,
        node: &AstNode,
        extra: &Scope,
        deadline: &Deadline,
    ) -> Result<Value, ExpressionError> {
        deadline.check()?;

        match node {
            AstNode::Literal(value) => Ok(value.clone()),
            AstNode::Reference(path) => Ok(self.resolver.resolve_path(path, extra)?),
            AstNode::Operation {
                operator,
                left,
                right,
            } => {
                let apply = self
                    .operators
                    .get(*operator)
                    .ok_or(EvalError::UnknownOperator(*operator))?;
                let left = self.evaluate_ast(left, extra, deadline)?;
                let right = self.evaluate_ast(right, extra, deadline)?;
                apply(&left, &right).map_err(operation_error)
            }
            AstNode::Object(properties) => self.build_object(properties, extra, deadline),
            AstNode::Array(elements) => self.build_array(elements, extra, deadline),
            AstNode::FunctionCall { name, args } => {
                let function = functions::lookup(name)
                    .ok_or_else(|| EvalError::FunctionNotAllowed(name.clone()))?;
                let args = args
                    .iter()
                    .map(|arg| self.evaluate_ast(arg, extra, deadline))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(function(&args))
            }
        }
    }

    fn build_object(
        &self,
        properties: &[ObjectProperty],
        extra: &Scope,
        deadline: &Deadline,
    ) -> Result<Value, ExpressionError> {
        let mut object = indexmap::IndexMap::new();

        for property in properties {
            let value = self.evaluate_ast(&property.value, extra, deadline)?;

            if property.spread {
                match value {
                    Value::Object(entries) => object.extend(entries),
                    Value::Array(items) => {
                        object.extend(items.into_iter().enumerate().map(|(i, v)| (i.to_string(), v)))
                    }
                    _ => return Err(EvalError::InvalidObjectSpread.into()),
                }
                continue;
            }

            let key = property
                .key
                .clone()
                .ok_or_else(|| EvalError::MalformedNode("object property without a key".to_string()))?;
            object.insert(key, value);
        }

        Ok(Value::Object(object))
    }

    fn build_array(
        &self,
        elements: &[ArrayElement],
        extra: &Scope,
        deadline: &Deadline,
    ) -> Result<Value, ExpressionError> {
        let mut items = Vec::with_capacity(elements.len());

        for element in elements {
            let value = self.evaluate_ast(&element.value, extra, deadline)?;

            if !element.spread {
                items.push(value);
                continue;
            }
            match value {
                Value::Array(spread) => items.extend(spread),
                Value::Object(entries) => items.extend(entries.into_values()),
                _ => return Err(EvalError::InvalidArraySpread.into()),
            }
        }

        Ok(Value::Array(items))
    }
}

/// Typed errors from an operator pass through; anything else is wrapped.
fn operation_error(err: OperatorError) -> ExpressionError {
    let err = match err.downcast::<EvalError>() {
        Ok(eval) => return ExpressionError::Eval(*eval),
        Err(other) => other,
    };
    match err.downcast::<ExpressionError>() {
        Ok(expr) => *expr,
        Err(other) => EvalError::OperationFailed(other.to_string()).into(),
    }
}
