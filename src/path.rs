use std::fmt;

use thiserror::Error;

use crate::value::Value;

/// A segment of a reference path.
///
/// Paths are read left to right; the first segment is the root name looked
/// up in the variable namespace.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    /// Property access by name
    ///
    /// # Examples
    /// - `user.name` → `[Property("user"), Property("name")]`
    /// - `headers["x-request-id"]` → `[Property("headers"), Property("x-request-id")]`
    Property(String),

    /// Array element access by index
    ///
    /// # Examples
    /// - `items[0]` → `[Property("items"), Index(0)]`
    Index(usize),

    /// Computed key, resolved against the namespace before the walk
    ///
    /// # Examples
    /// - `items[context.cursor]` → `[Property("items"), Expression("context.cursor")]`
    /// - `rows[${page.index}]` → `[Property("rows"), Expression("${page.index}")]`
    Expression(String),
}

/// A parsed reference path.
pub type Path = Vec<PathSegment>;

/// A path that could not be parsed.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid path '{path}' at position {position}: {message}")]
pub struct PathSyntaxError {
    pub path: String,
    pub position: usize,
    pub message: String,
}

/// Why a property walk stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessFailure {
    /// Stepped into `null` or `undefined`
    Nullish,
    /// Key or index not present on the current value
    Missing,
    /// Current value is a primitive with no such property
    NotIndexable,
    /// A computed segment reached the walk without being resolved
    Unresolved,
}

/// A property walk that could not complete.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{} in path '{path}'", self.describe())]
pub struct PropertyAccessError {
    pub path: String,
    pub segment: String,
    /// Type name of the value the segment was applied to
    pub target: &'static str,
    pub failure: AccessFailure,
}

impl PropertyAccessError {
    fn describe(&self) -> String {
        match self.failure {
            AccessFailure::Nullish | AccessFailure::NotIndexable => format!(
                "cannot access property '{}' of {}",
                self.segment, self.target
            ),
            AccessFailure::Missing => format!(
                "property '{}' does not exist on {}",
                self.segment, self.target
            ),
            AccessFailure::Unresolved => {
                format!("computed segment '[{}]' was not resolved", self.segment)
            }
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Property(name) => f.write_str(name),
            PathSegment::Index(i) => write!(f, "{}", i),
            PathSegment::Expression(text) => f.write_str(text),
        }
    }
}

/// Parse a path such as `foo["bar-baz"][0].qux` into segments.
///
/// # Examples
///
/// ```
/// use safe_expr::path::{parse_path, PathSegment};
///
/// let path = parse_path(r#"foo["bar-baz"][0]"#).unwrap();
/// assert_eq!(path, vec![
///     PathSegment::Property("foo".into()),
///     PathSegment::Property("bar-baz".into()),
///     PathSegment::Index(0),
/// ]);
/// ```
pub fn parse_path(path: &str) -> Result<Path, PathSyntaxError> {
    PathParser::new(path).parse()
}

struct PathParser<'a> {
    source: &'a str,
    chars: Vec<char>,
    position: usize,
}

impl<'a> PathParser<'a> {
    fn new(source: &'a str) -> Self {
        PathParser {
            source,
            chars: source.chars().collect(),
            position: 0,
        }
    }

    fn error(&self, message: impl Into<String>, position: usize) -> PathSyntaxError {
        PathSyntaxError {
            path: self.source.to_string(),
            position,
            message: message.into(),
        }
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn parse(mut self) -> Result<Path, PathSyntaxError> {
        let mut segments = Vec::new();

        if self.chars.is_empty() {
            return Err(self.error("empty path", 0));
        }

        // Root: a name unless the path opens with a bracket
        if self.current() != Some('[') {
            segments.push(PathSegment::Property(self.read_name()?));
        }

        while let Some(ch) = self.current() {
            match ch {
                '.' => {
                    self.position += 1;
                    segments.push(PathSegment::Property(self.read_name()?));
                }
                '[' => segments.push(self.read_bracket()?),
                ']' => return Err(self.error("unexpected ']'", self.position)),
                other => {
                    return Err(self.error(format!("unexpected character '{}'", other), self.position));
                }
            }
        }

        Ok(segments)
    }

    fn read_name(&mut self) -> Result<String, PathSyntaxError> {
        let start = self.position;
        while let Some(ch) = self.current() {
            if ch == '.' || ch == '[' || ch == ']' {
                break;
            }
            self.position += 1;
        }
        let name: String = self.chars[start..self.position].iter().collect();
        let name = name.trim();
        if name.is_empty() {
            return Err(self.error("expected a property name", start));
        }
        Ok(name.to_string())
    }

    fn read_bracket(&mut self) -> Result<PathSegment, PathSyntaxError> {
        let open = self.position;
        self.position += 1; // Consume '['

        if self.current() == Some('[') {
            return Err(self.error("unexpected '[['", open));
        }

        while self.current().is_some_and(char::is_whitespace) {
            self.position += 1;
        }

        if let Some(quote @ ('"' | '\'')) = self.current() {
            let key = self.read_quoted(quote)?;
            while self.current().is_some_and(char::is_whitespace) {
                self.position += 1;
            }
            if self.current() != Some(']') {
                return Err(self.error("expected ']' after quoted key", self.position));
            }
            self.position += 1;
            return Ok(PathSegment::Property(key));
        }

        // Bare index or computed expression, with nested brackets counted
        let start = self.position;
        let mut depth = 1;
        while let Some(ch) = self.current() {
            match ch {
                '"' | '\'' => {
                    self.read_quoted(ch)?;
                    continue;
                }
                '[' => depth += 1,
                ']' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            self.position += 1;
        }

        if depth != 0 {
            return Err(self.error("unterminated '['", open));
        }

        let inner: String = self.chars[start..self.position].iter().collect();
        self.position += 1; // Consume ']'
        let inner = inner.trim();

        if inner.is_empty() {
            return Err(self.error("empty brackets", open));
        }
        if inner.chars().all(|c| c.is_ascii_digit()) {
            return inner
                .parse::<usize>()
                .map(PathSegment::Index)
                .map_err(|_| self.error(format!("index '{}' is too large", inner), start));
        }
        Ok(PathSegment::Expression(inner.to_string()))
    }

    fn read_quoted(&mut self, quote: char) -> Result<String, PathSyntaxError> {
        let start = self.position;
        self.position += 1;
        let mut result = String::new();
        while let Some(ch) = self.current() {
            self.position += 1;
            match ch {
                '\\' => {
                    if let Some(escaped) = self.current() {
                        result.push(escaped);
                        self.position += 1;
                    }
                }
                c if c == quote => return Ok(result),
                c => result.push(c),
            }
        }
        Err(self.error("unterminated quote", start))
    }
}

/// Render segments back into canonical path text.
///
/// Identifier-like properties use dot notation, anything else is quoted in
/// brackets, so `foo[0]["bar-baz"]` formats to itself.
pub fn format_path(segments: &[PathSegment]) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        match segment {
            PathSegment::Property(name) if is_plain_name(name) => {
                if i > 0 {
                    out.push('.');
                }
                out.push_str(name);
            }
            PathSegment::Property(name) => {
                out.push_str("[\"");
                out.push_str(&name.replace('\\', "\\\\").replace('"', "\\\""));
                out.push_str("\"]");
            }
            PathSegment::Index(index) => {
                out.push_str(&format!("[{}]", index));
            }
            PathSegment::Expression(text) => {
                out.push('[');
                out.push_str(text);
                out.push(']');
            }
        }
    }
    out
}

fn is_plain_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Walk `segments` from `root`, failing on the first step that cannot be
/// taken.
///
/// `path` is only used for error messages.
pub fn get(root: &Value, segments: &[PathSegment], path: &str) -> Result<Value, PropertyAccessError> {
    let mut current = root;

    for (i, segment) in segments.iter().enumerate() {
        let target = current.type_name();
        let fail = |failure| PropertyAccessError {
            path: path.to_string(),
            segment: segment.to_string(),
            target,
            failure,
        };

        current = match (current, segment) {
            (_, PathSegment::Expression(_)) => return Err(fail(AccessFailure::Unresolved)),
            (Value::Null | Value::Undefined, _) => return Err(fail(AccessFailure::Nullish)),
            (Value::Object(map), PathSegment::Property(key)) => {
                map.get(key).ok_or_else(|| fail(AccessFailure::Missing))?
            }
            (Value::Object(map), PathSegment::Index(index)) => map
                .get(&index.to_string())
                .ok_or_else(|| fail(AccessFailure::Missing))?,
            (Value::Array(items), PathSegment::Index(index)) => {
                items.get(*index).ok_or_else(|| fail(AccessFailure::Missing))?
            }
            (Value::Array(items), PathSegment::Property(key)) if key == "length" => {
                return length_of(items.len(), &segments[i + 1..], path);
            }
            (Value::Array(items), PathSegment::Property(key)) => key
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get(index))
                .ok_or_else(|| fail(AccessFailure::Missing))?,
            (Value::String(s), PathSegment::Property(key)) if key == "length" => {
                return length_of(s.chars().count(), &segments[i + 1..], path);
            }
            _ => return Err(fail(AccessFailure::NotIndexable)),
        };
    }

    Ok(current.clone())
}

/// `length` ends the walk: a number has no properties of its own.
fn length_of(len: usize, rest: &[PathSegment], path: &str) -> Result<Value, PropertyAccessError> {
    match rest.first() {
        None => Ok(Value::Integer(len as i64)),
        Some(next) => Err(PropertyAccessError {
            path: path.to_string(),
            segment: next.to_string(),
            target: "number",
            failure: AccessFailure::NotIndexable,
        }),
    }
}

/// Same walk as [`get`], reporting only whether it would succeed.
pub fn has(root: &Value, segments: &[PathSegment]) -> bool {
    get(root, segments, "").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_round_trip() {
        for canonical in [r#"foo[0]["bar-baz"]"#, "foo.bar.baz", "a[1][2]", "x[y.z]"] {
            let parsed = parse_path(canonical).unwrap();
            assert_eq!(format_path(&parsed), canonical);
        }
    }

    #[test]
    fn test_nested_expression_segment() {
        let path = parse_path("rows[lookup[0]].name").unwrap();
        assert_eq!(
            path,
            vec![
                PathSegment::Property("rows".into()),
                PathSegment::Expression("lookup[0]".into()),
                PathSegment::Property("name".into()),
            ]
        );
    }

    #[test]
    fn test_syntax_errors() {
        assert_eq!(parse_path("foo[0").unwrap_err().position, 3);
        assert!(parse_path("foo[\"bar]").unwrap_err().message.contains("unterminated quote"));
        assert!(parse_path("foo[[0]]").unwrap_err().message.contains("[["));
        assert!(parse_path("foo..bar").is_err());
        assert!(parse_path("foo[]").is_err());
    }
}
