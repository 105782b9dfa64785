//! Pre-tokenization checks on raw expression text.
//!
//! The denylist is a plain substring scan, so a variable named
//! `prototype` is rejected too.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

pub const DEFAULT_MAX_EXPRESSION_LENGTH: usize = 10_000;

/// Deepest accepted nesting, shared by the lexer (container tokens), the
/// parser (syntax tree height), the reference extractor and the resolver
/// (computed path segments). Each of them recurses once per level.
pub const MAX_NESTING_DEPTH: usize = 256;

pub const FORBIDDEN_PATTERNS: [&str; 5] = ["eval", "Function", "constructor", "__proto__", "prototype"];

static EMPTY_SLOT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{\s*\}").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("expression must be a non-empty string")]
    Empty,

    #[error("expression exceeds maximum length of {max} characters (got {length})")]
    TooLong { length: usize, max: usize },

    #[error("expression contains forbidden pattern '{0}'")]
    ForbiddenPattern(&'static str),

    #[error("empty template expression '${{}}'")]
    EmptyTemplateSlot,

    #[error("malformed template literal: unclosed ${{")]
    UnclosedTemplate,
}

/// Run every check, first failure wins.
pub fn validate_expression(expression: &str, max_length: usize) -> Result<(), ValidationError> {
    if expression.trim().is_empty() {
        return Err(ValidationError::Empty);
    }

    let length = expression.chars().count();
    if length > max_length {
        return Err(ValidationError::TooLong {
            length,
            max: max_length,
        });
    }

    if let Some(pattern) = FORBIDDEN_PATTERNS.iter().find(|p| expression.contains(*p)) {
        tracing::warn!(pattern, "rejected expression containing forbidden pattern");
        return Err(ValidationError::ForbiddenPattern(pattern));
    }

    if EMPTY_SLOT.is_match(expression) {
        return Err(ValidationError::EmptyTemplateSlot);
    }

    check_template_balance(expression)
}

/// Every `${` needs its `}`. Plain `{` pairs are tracked so object literals
/// inside a reference do not close it early; quoted regions are skipped.
fn check_template_balance(expression: &str) -> Result<(), ValidationError> {
    // true = opened by `${`
    let mut open: Vec<bool> = Vec::new();
    let mut quote: Option<char> = None;
    let mut chars = expression.chars().peekable();

    while let Some(ch) = chars.next() {
        if let Some(q) = quote {
            if ch == '\\' {
                chars.next();
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            '$' if chars.peek() == Some(&'{') => {
                chars.next();
                open.push(true);
            }
            '{' => open.push(false),
            '}' => {
                open.pop();
            }
            _ => {}
        }
    }

    if open.contains(&true) {
        return Err(ValidationError::UnclosedTemplate);
    }
    Ok(())
}
