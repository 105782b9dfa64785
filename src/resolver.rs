//! Reference resolution against the layered variable namespace.
//!
//! A reference root is looked up in three layers, first match wins:
//!
//! 1. the extra context passed to a single `evaluate()` call
//! 2. the literal name `context`, bound to the persistent context object
//! 3. results of previously executed steps, keyed by step name
//!
//! `context` always means the context object; a step that happens to be
//! named `context` cannot shadow it.

use indexmap::IndexMap;
use thiserror::Error;

use crate::{
    path::{self, PathSegment, PathSyntaxError, PropertyAccessError, parse_path},
    validation::MAX_NESTING_DEPTH,
    value::Value,
};

/// Named variables, in insertion order.
pub type Scope = IndexMap<String, Value>;

pub const CONTEXT_ROOT: &str = "context";

/// A reference that could not be resolved.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReferenceError {
    /// Root name not present in any namespace layer
    #[error("unknown reference '{root}'. Available references: {}", .available.join(", "))]
    UnknownReference { root: String, available: Vec<String> },

    #[error(transparent)]
    PropertyAccess(#[from] PropertyAccessError),

    #[error(transparent)]
    PathSyntax(#[from] PathSyntaxError),

    /// A computed segment produced something other than a string or number
    #[error("invalid computed key '[{segment}]' in path '{path}': expected string or number, got {found}")]
    InvalidKey {
        path: String,
        segment: String,
        found: &'static str,
    },
}

/// Read-only view of step results and the context object.
///
/// # Examples
///
/// ```
/// use safe_expr::{ReferenceResolver, Scope, Value};
///
/// let resolver = ReferenceResolver::new(Scope::new(), Value::Null)
///     .with_step_result("fetch", Value::Integer(200));
///
/// let status = resolver.resolve_path("fetch", &Scope::new()).unwrap();
/// assert_eq!(status, Value::Integer(200));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReferenceResolver {
    step_results: Scope,
    context: Value,
}

impl ReferenceResolver {
    pub fn new(step_results: Scope, context: Value) -> Self {
        ReferenceResolver {
            step_results,
            context,
        }
    }

    /// Add or replace one step result.
    pub fn with_step_result(mut self, step: impl Into<String>, result: Value) -> Self {
        self.step_results.insert(step.into(), result);
        self
    }

    pub fn step_results(&self) -> &Scope {
        &self.step_results
    }

    pub fn context(&self) -> &Value {
        &self.context
    }

    /// Resolve a reference path such as `fetch.body.items[0]`.
    pub fn resolve_path(&self, path: &str, extra: &Scope) -> Result<Value, ReferenceError> {
        self.resolve_at(path, extra, 0)
    }

    /// `depth` counts the computed segments enclosing `path`.
    fn resolve_at(&self, path: &str, extra: &Scope, depth: usize) -> Result<Value, ReferenceError> {
        let path = path.trim();
        if depth > MAX_NESTING_DEPTH {
            return Err(PathSyntaxError {
                path: path.to_string(),
                position: 0,
                message: format!("computed keys nested too deeply (maximum depth is {})", MAX_NESTING_DEPTH),
            }
            .into());
        }

        let root_end = path.find(['.', '[']).unwrap_or(path.len());
        let root_name = path[..root_end].trim();

        if root_name.is_empty() {
            return Err(PathSyntaxError {
                path: path.to_string(),
                position: 0,
                message: "missing root name".to_string(),
            }
            .into());
        }

        let root = self.lookup_root(root_name, extra)?;
        if root_end == path.len() {
            return Ok(root.clone());
        }

        let segments = parse_path(path)?;
        let rest = self.resolve_segments(&segments[1..], path, extra, depth)?;
        Ok(path::get(root, &rest, path)?)
    }

    /// Whether `path` resolves without error.
    pub fn has(&self, path: &str, extra: &Scope) -> bool {
        self.resolve_path(path, extra).is_ok()
    }

    fn lookup_root<'a>(&'a self, name: &str, extra: &'a Scope) -> Result<&'a Value, ReferenceError> {
        if let Some(value) = extra.get(name) {
            return Ok(value);
        }
        if name == CONTEXT_ROOT {
            return Ok(&self.context);
        }
        if let Some(value) = self.step_results.get(name) {
            return Ok(value);
        }

        Err(ReferenceError::UnknownReference {
            root: name.to_string(),
            available: self.available_names(extra),
        })
    }

    /// Every legal root: extra-context keys, step names, then `context`.
    pub fn available_names(&self, extra: &Scope) -> Vec<String> {
        extra
            .keys()
            .chain(self.step_results.keys())
            .filter(|name| name.as_str() != CONTEXT_ROOT)
            .cloned()
            .chain(std::iter::once(CONTEXT_ROOT.to_string()))
            .collect()
    }

    /// Replace computed segments with the property or index they evaluate to.
    fn resolve_segments(
        &self,
        segments: &[PathSegment],
        path: &str,
        extra: &Scope,
        depth: usize,
    ) -> Result<Vec<PathSegment>, ReferenceError> {
        let mut resolved = Vec::with_capacity(segments.len());
        for segment in segments {
            let PathSegment::Expression(text) = segment else {
                resolved.push(segment.clone());
                continue;
            };
            let inner = text
                .strip_prefix("${")
                .and_then(|t| t.strip_suffix('}'))
                .unwrap_or(text);
            let key = match self.resolve_at(inner, extra, depth + 1)? {
                Value::String(key) => PathSegment::Property(key),
                Value::Integer(n) if n >= 0 => PathSegment::Index(n as usize),
                Value::Float(n) if n >= 0.0 && n.fract() == 0.0 => PathSegment::Index(n as usize),
                other => {
                    return Err(ReferenceError::InvalidKey {
                        path: path.to_string(),
                        segment: text.clone(),
                        found: other.type_name(),
                    });
                }
            };
            resolved.push(key);
        }
        Ok(resolved)
    }
}
