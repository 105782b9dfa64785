//! Static dependency analysis: which root names an expression reads.
//!
//! Works on raw text, without tokenizing, so it also accepts expressions
//! the evaluator would reject.

use std::collections::BTreeSet;

use crate::validation::MAX_NESTING_DEPTH;

/// Loop-scope aliases and the context namespace, which are never step
/// dependencies.
pub const DEFAULT_IGNORED: [&str; 4] = ["item", "index", "acc", "context"];

/// List the root names of every `${...}` span in `expression`, nested spans
/// included, deduplicated and sorted.
///
/// Never fails: malformed text, including spans nested deeper than
/// [`MAX_NESTING_DEPTH`], yields an empty list.
///
/// # Examples
///
/// ```
/// use safe_expr::extract_references;
///
/// let refs = extract_references("${fetch.body[${cursor}]} + ${item.id}");
/// assert_eq!(refs, vec!["cursor", "fetch"]);
/// ```
pub fn extract_references(expression: &str) -> Vec<String> {
    ReferenceExtractor::new().extract(expression)
}

/// Reference scanner with a configurable set of ignored names.
#[derive(Debug, Clone)]
pub struct ReferenceExtractor {
    ignored: BTreeSet<String>,
}

impl Default for ReferenceExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceExtractor {
    pub fn new() -> Self {
        ReferenceExtractor {
            ignored: DEFAULT_IGNORED.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Also skip `name`.
    pub fn ignore(mut self, name: impl Into<String>) -> Self {
        self.ignored.insert(name.into());
        self
    }

    pub fn extract(&self, expression: &str) -> Vec<String> {
        let mut found = BTreeSet::new();
        match self.scan(expression, 0, &mut found) {
            Ok(()) => found.into_iter().collect(),
            Err(position) => {
                tracing::debug!(expression, position, "malformed reference span, no references extracted");
                Vec::new()
            }
        }
    }

    /// Collect roots into `found`. The error is the byte offset of a `${`
    /// that is never closed or sits too deep.
    fn scan(&self, text: &str, depth: usize, found: &mut BTreeSet<String>) -> Result<(), usize> {
        let mut rest = text;
        let mut offset = 0;

        while let Some(open) = rest.find("${") {
            if depth >= MAX_NESTING_DEPTH {
                return Err(offset + open);
            }
            let body_start = open + 2;
            let close = span_end(&rest[body_start..]).ok_or(offset + open)?;
            let inner = &rest[body_start..body_start + close];

            if let Some(root) = root_name(inner)
                && !self.ignored.contains(root)
            {
                found.insert(root.to_string());
            }
            self.scan(inner, depth + 1, found)
                .map_err(|pos| offset + body_start + pos)?;

            let consumed = body_start + close + 1;
            rest = &rest[consumed..];
            offset += consumed;
        }

        Ok(())
    }
}

/// Byte offset of the `}` closing a span whose `${` was just consumed.
fn span_end(body: &str) -> Option<usize> {
    let mut depth = 1;
    for (i, ch) in body.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Text up to the first `.`, `[` or whitespace, if it reads as a name.
/// `${${a}}` has no root of its own; `a` is found by the nested scan.
fn root_name(inner: &str) -> Option<&str> {
    let inner = inner.trim_start();
    let end = inner
        .find(|c: char| c == '.' || c == '[' || c.is_whitespace())
        .unwrap_or(inner.len());
    let root = &inner[..end];
    let is_name = !root.is_empty() && root.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$');
    is_name.then_some(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roots_and_ordering() {
        let refs = extract_references("${zeta.a} + ${alpha[0]} + ${ mid } + ${alpha.b}");
        assert_eq!(refs, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_nested_spans() {
        let refs = extract_references("${rows[${page.index}][${col}]}");
        assert_eq!(refs, vec!["col", "page", "rows"]);
    }

    #[test]
    fn test_reference_as_root_is_not_a_name() {
        assert_eq!(extract_references("${${a}}"), vec!["a"]);
        assert_eq!(extract_references("${${a}.b} + ${c}"), vec!["a", "c"]);
    }

    #[test]
    fn test_nesting_limit() {
        let deep = |n: usize| format!("{}x{}", "${".repeat(n), "}".repeat(n));
        assert_eq!(extract_references(&deep(MAX_NESTING_DEPTH)), vec!["x"]);
        assert!(extract_references(&deep(MAX_NESTING_DEPTH + 1)).is_empty());
        assert!(extract_references(&deep(20_000)).is_empty());
    }

    #[test]
    fn test_ignored_names() {
        assert!(extract_references("${item.id} ${acc} ${index} ${context.user}").is_empty());

        let refs = ReferenceExtractor::new().ignore("env").extract("${env.HOME} ${build}");
        assert_eq!(refs, vec!["build"]);
    }

    #[test]
    fn test_unterminated_span_yields_nothing() {
        assert!(extract_references("${ok} + ${broken.path").is_empty());
        assert!(extract_references("no references here").is_empty());
    }
}
