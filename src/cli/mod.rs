//! CLI support for safe-expr
//!
//! The command implementations live in the library so they can be driven
//! without going through argument parsing.

mod docs;
mod eval;

pub use docs::{DocCategory, get_doc_category, get_docs_overview};
pub use eval::{EvalOptions, execute_eval, execute_refs};

use std::io;

use thiserror::Error;

use crate::ExpressionError;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Expression(#[from] ExpressionError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A flag that takes a JSON object got some other JSON value
    #[error("{0} must be a JSON object")]
    NotAnObject(&'static str),

    #[error("Unknown category: '{0}'\nRun 'safexpr docs' to see available categories.")]
    UnknownCategory(String),
}
