//! The whitelisted conversion functions callable from an expression.

use crate::value::Value;

pub type Builtin = fn(&[Value]) -> Value;

/// Every function an expression may call, by name.
pub const BUILTINS: [(&str, Builtin); 5] = [
    ("Number", number),
    ("String", string),
    ("Boolean", boolean),
    ("parseInt", parse_int),
    ("parseFloat", parse_float),
];

/// Names are case-sensitive; `number(...)` is not allowed.
pub fn lookup(name: &str) -> Option<Builtin> {
    BUILTINS
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|&(_, f)| f)
}

fn number(args: &[Value]) -> Value {
    args.first().map_or(Value::Integer(0), Value::to_number)
}

fn string(args: &[Value]) -> Value {
    Value::String(args.first().map(Value::to_display_string).unwrap_or_default())
}

fn boolean(args: &[Value]) -> Value {
    Value::Boolean(args.first().is_some_and(Value::is_truthy))
}

/// `parseInt(text, radix?)`: the longest run of digits after optional
/// whitespace and sign. A `0x` prefix selects base 16 when no other radix is
/// given.
fn parse_int(args: &[Value]) -> Value {
    let text = args.first().map(Value::to_display_string).unwrap_or_default();
    let mut rest = text.trim_start();

    let negative = rest.starts_with('-');
    if let Some(stripped) = rest.strip_prefix(['-', '+']) {
        rest = stripped;
    }

    let mut radix = match args.get(1).map(Value::to_number) {
        Some(Value::Integer(r)) if r != 0 => r,
        Some(Value::Float(r)) if r.is_finite() && r.trunc() != 0.0 => r.trunc() as i64,
        _ => 0,
    };
    if (radix == 0 || radix == 16)
        && let Some(hex) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X"))
    {
        rest = hex;
        radix = 16;
    }
    if radix == 0 {
        radix = 10;
    }
    if !(2..=36).contains(&radix) {
        return Value::Float(f64::NAN);
    }

    let digits: String = rest
        .chars()
        .take_while(|c| c.is_digit(radix as u32))
        .collect();
    if digits.is_empty() {
        return Value::Float(f64::NAN);
    }

    match i64::from_str_radix(&digits, radix as u32) {
        Ok(n) => Value::Integer(if negative { -n } else { n }),
        Err(_) => {
            let n = digits
                .chars()
                .filter_map(|c| c.to_digit(radix as u32))
                .fold(0.0, |acc, d| acc * radix as f64 + f64::from(d));
            Value::Float(if negative { -n } else { n })
        }
    }
}

/// `parseFloat(text)`: the longest decimal prefix after optional whitespace.
fn parse_float(args: &[Value]) -> Value {
    let text = args.first().map(Value::to_display_string).unwrap_or_default();
    let rest = text.trim_start();

    let unsigned = rest.strip_prefix(['-', '+']).unwrap_or(rest);
    if unsigned.starts_with("Infinity") {
        let sign = if rest.starts_with('-') { -1.0 } else { 1.0 };
        return Value::Float(sign * f64::INFINITY);
    }

    let prefix = float_prefix(rest);
    match prefix.parse::<f64>() {
        Ok(n) if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 => Value::Integer(n as i64),
        Ok(n) => Value::Float(n),
        Err(_) => Value::Float(f64::NAN),
    }
}

/// Longest prefix of `s` shaped like `[+-]digits[.digits][e[+-]digits]`.
fn float_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return "";
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }

    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: &[Value]) -> Value {
        lookup(name).unwrap()(args)
    }

    #[test]
    fn test_parse_int_prefixes() {
        assert_eq!(call("parseInt", &["42px".into()]), Value::Integer(42));
        assert_eq!(call("parseInt", &["  -7.9".into()]), Value::Integer(-7));
        assert_eq!(call("parseInt", &["0x1f".into()]), Value::Integer(31));
        assert_eq!(call("parseInt", &["ff".into(), Value::Integer(16)]), Value::Integer(255));
        assert!(matches!(call("parseInt", &["abc".into()]), Value::Float(n) if n.is_nan()));
    }

    #[test]
    fn test_parse_float_prefixes() {
        assert_eq!(call("parseFloat", &["3.25kg".into()]), Value::Float(3.25));
        assert_eq!(call("parseFloat", &["1e3".into()]), Value::Integer(1000));
        assert_eq!(call("parseFloat", &[".5".into()]), Value::Float(0.5));
        assert!(matches!(call("parseFloat", &["-.".into()]), Value::Float(n) if n.is_nan()));
    }

    #[test]
    fn test_coercions() {
        assert_eq!(call("Number", &["12".into()]), Value::Integer(12));
        assert_eq!(call("Number", &[]), Value::Integer(0));
        assert_eq!(call("String", &[Value::Boolean(true)]), Value::String("true".into()));
        assert_eq!(call("Boolean", &["".into()]), Value::Boolean(false));
        assert!(lookup("eval").is_none());
        assert!(lookup("number").is_none());
    }
}
