//! Error taxonomy shared by every stage of the pipeline.
//!
//! Each stage owns its error type (next to the code that raises it);
//! [`ExpressionError`] is what the public entry points return.

use thiserror::Error;

use crate::{
    evaluator::EvalError, lexer::LexError, parser::ParseError, resolver::ReferenceError,
    timeout::TimeoutError, validation::ValidationError,
};

/// Coarse classification of an [`ExpressionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed token stream
    Lexical,
    /// Malformed path or expression structure
    Syntax,
    /// Unknown root, failed property access, bad path inside a reference
    Reference,
    /// Operator type mismatch, bad spread, disallowed function, ...
    Evaluation,
    /// Length limit, forbidden pattern, unbalanced template braces
    Security,
    /// Time budget exceeded
    Timeout,
}

/// Any failure of `evaluate()`.
#[derive(Debug, Error)]
pub enum ExpressionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Syntax(#[from] ParseError),

    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Timeout(#[from] TimeoutError),

    /// Envelope attached at the `evaluate()` boundary to syntax, reference
    /// and evaluation failures.
    #[error("failed to evaluate expression: {expression}. Got error: {source}")]
    Failed {
        expression: String,
        #[source]
        source: Box<ExpressionError>,
    },
}

impl ExpressionError {
    /// Wrap in the `failed to evaluate expression` envelope.
    ///
    /// Validation, lexical and timeout errors, and errors that already carry
    /// an envelope, are returned unchanged.
    pub fn with_expression(self, expression: &str) -> Self {
        match self {
            ExpressionError::Syntax(_) | ExpressionError::Reference(_) | ExpressionError::Eval(_) => {
                ExpressionError::Failed {
                    expression: expression.to_string(),
                    source: Box::new(self),
                }
            }
            other => other,
        }
    }

    /// The innermost error, looking through the envelope.
    pub fn root(&self) -> &ExpressionError {
        match self {
            ExpressionError::Failed { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self.root() {
            ExpressionError::Validation(_) => ErrorKind::Security,
            ExpressionError::Lex(_) => ErrorKind::Lexical,
            ExpressionError::Syntax(_) => ErrorKind::Syntax,
            ExpressionError::Reference(_) => ErrorKind::Reference,
            ExpressionError::Eval(_) => ErrorKind::Evaluation,
            ExpressionError::Timeout(_) => ErrorKind::Timeout,
            ExpressionError::Failed { .. } => unreachable!("root() never returns an envelope"),
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind() == ErrorKind::Timeout
    }
}
