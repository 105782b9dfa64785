use indexmap::IndexMap;

/// A runtime value produced by evaluating an expression.
///
/// Values mirror the JSON data model with two additions: `Undefined` (the
/// result of the `undefined` keyword) and a split between integers and
/// floats. Both numeric variants are the same runtime type ("number") for
/// comparisons and equality.
///
/// Objects keep their keys in insertion order so spread and construction
/// order is observable in the output.
///
/// # Examples
///
/// ```
/// use safe_expr::Value;
/// use indexmap::IndexMap;
///
/// let mut obj = IndexMap::new();
/// obj.insert("name".to_string(), Value::String("build".to_string()));
/// obj.insert("attempts".to_string(), Value::Integer(3));
///
/// let value = Value::Object(obj);
/// assert!(value.is_truthy());
/// assert_eq!(value.type_name(), "object");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// The `undefined` keyword
    Undefined,

    /// JSON null
    #[default]
    Null,

    /// JSON boolean (true/false)
    Boolean(bool),

    /// Integer number (preserved separately from floats)
    Integer(i64),

    /// Floating-point number
    Float(f64),

    /// UTF-8 string
    String(String),

    /// Array of values
    Array(Vec<Value>),

    /// Object with insertion-ordered string keys
    Object(IndexMap<String, Value>),
}

impl Value {
    /// Runtime type name used in error messages and type checks.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) | Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Truthiness as used by `&&` and `||`.
    ///
    /// `false`, `0`, `NaN`, `""`, `null` and `undefined` are falsy; every
    /// array and object is truthy, even when empty.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Integer(n) => *n != 0,
            Value::Float(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }

    /// `null` or `undefined`, the values `??` falls through.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric conversion with `Number(x)` semantics.
    ///
    /// Strings are trimmed and parsed (the empty string is `0`), booleans
    /// become `0`/`1`, `null` is `0`. Anything unparseable is `NaN`.
    pub fn to_number(&self) -> Value {
        match self {
            Value::Integer(_) | Value::Float(_) => self.clone(),
            Value::Boolean(b) => Value::Integer(i64::from(*b)),
            Value::Null => Value::Integer(0),
            Value::Undefined => Value::Float(f64::NAN),
            Value::String(s) => parse_numeric(s.trim()),
            Value::Array(arr) => match arr.as_slice() {
                [] => Value::Integer(0),
                [single] => single.to_number(),
                _ => Value::Float(f64::NAN),
            },
            Value::Object(_) => Value::Float(f64::NAN),
        }
    }

    /// String conversion used by `+` concatenation, template literals and
    /// `String(x)`.
    ///
    /// Scalars render the way they are written in an expression; arrays and
    /// objects render as compact JSON.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Float(n) => format_float(*n),
            Value::String(s) => s.clone(),
            Value::Array(_) | Value::Object(_) => {
                serde_json::to_string(&crate::convert::value_to_json(self.clone()))
                    .unwrap_or_default()
            }
        }
    }
}

fn parse_numeric(s: &str) -> Value {
    if s.is_empty() {
        return Value::Integer(0);
    }
    if let Ok(n) = s.parse::<i64>() {
        return Value::Integer(n);
    }
    match s.parse::<f64>() {
        Ok(n) if s.chars().all(|c| c.is_ascii_digit() || "+-.eE".contains(c)) => Value::Float(n),
        _ => Value::Float(f64::NAN),
    }
}

fn format_float(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        n.to_string()
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        crate::convert::json_to_value(v)
    }
}
