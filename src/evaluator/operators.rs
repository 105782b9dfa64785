//! Binary operator implementations.
//!
//! Operands arrive already evaluated, left before right, so `&&`, `||` and
//! `??` only select between two values; nothing is short-circuited.

use std::{cmp::Ordering, error::Error};

use rust_decimal::{Decimal, prelude::FromPrimitive, prelude::ToPrimitive};

use super::EvalError;
use crate::{ast::BinOp, value::Value};

/// Error returned by an operator function. An [`EvalError`] inside it is
/// propagated as-is; anything else is reported as a failed operation.
pub type OperatorError = Box<dyn Error + Send + Sync>;

pub type OperatorFn = fn(&Value, &Value) -> Result<Value, OperatorError>;

/// Dispatch table from operator to implementation.
///
/// The evaluator takes the table by injection, so tests can substitute
/// one with missing or failing entries.
pub trait OperatorTable: Send + Sync {
    fn get(&self, op: BinOp) -> Option<OperatorFn>;
}

/// The built-in operator set.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardOperators;

impl OperatorTable for StandardOperators {
    fn get(&self, op: BinOp) -> Option<OperatorFn> {
        let f: OperatorFn = match op {
            BinOp::Add => add,
            BinOp::Subtract => subtract,
            BinOp::Multiply => multiply,
            BinOp::Divide => divide,
            BinOp::Modulo => modulo,
            BinOp::Equal => equal,
            BinOp::NotEqual => not_equal,
            BinOp::StrictEqual => strict_equal,
            BinOp::StrictNotEqual => strict_not_equal,
            BinOp::LessThan => less_than,
            BinOp::LessEqual => less_equal,
            BinOp::GreaterThan => greater_than,
            BinOp::GreaterEqual => greater_equal,
            BinOp::And => and,
            BinOp::Or => or,
            BinOp::NullCoalesce => null_coalesce,
        };
        Some(f)
    }
}

type OpResult = Result<Value, OperatorError>;

fn add(left: &Value, right: &Value) -> OpResult {
    if matches!(left, Value::String(_)) || matches!(right, Value::String(_)) {
        let mut out = left.to_display_string();
        out.push_str(&right.to_display_string());
        return Ok(Value::String(out));
    }
    Ok(arithmetic(BinOp::Add, left, right)?)
}

fn subtract(left: &Value, right: &Value) -> OpResult {
    Ok(arithmetic(BinOp::Subtract, left, right)?)
}

fn multiply(left: &Value, right: &Value) -> OpResult {
    Ok(arithmetic(BinOp::Multiply, left, right)?)
}

fn divide(left: &Value, right: &Value) -> OpResult {
    Ok(arithmetic(BinOp::Divide, left, right)?)
}

fn modulo(left: &Value, right: &Value) -> OpResult {
    Ok(arithmetic(BinOp::Modulo, left, right)?)
}

fn equal(left: &Value, right: &Value) -> OpResult {
    Ok(Value::Boolean(loose_equals(left, right)))
}

fn not_equal(left: &Value, right: &Value) -> OpResult {
    Ok(Value::Boolean(!loose_equals(left, right)))
}

fn strict_equal(left: &Value, right: &Value) -> OpResult {
    Ok(Value::Boolean(strict_equals(left, right)))
}

fn strict_not_equal(left: &Value, right: &Value) -> OpResult {
    Ok(Value::Boolean(!strict_equals(left, right)))
}

fn less_than(left: &Value, right: &Value) -> OpResult {
    Ok(Value::Boolean(compare(left, right)?.is_some_and(Ordering::is_lt)))
}

fn less_equal(left: &Value, right: &Value) -> OpResult {
    Ok(Value::Boolean(compare(left, right)?.is_some_and(Ordering::is_le)))
}

fn greater_than(left: &Value, right: &Value) -> OpResult {
    Ok(Value::Boolean(compare(left, right)?.is_some_and(Ordering::is_gt)))
}

fn greater_equal(left: &Value, right: &Value) -> OpResult {
    Ok(Value::Boolean(compare(left, right)?.is_some_and(Ordering::is_ge)))
}

fn and(left: &Value, right: &Value) -> OpResult {
    Ok(if left.is_truthy() { right.clone() } else { left.clone() })
}

fn or(left: &Value, right: &Value) -> OpResult {
    Ok(if left.is_truthy() { left.clone() } else { right.clone() })
}

fn null_coalesce(left: &Value, right: &Value) -> OpResult {
    Ok(if left.is_nullish() { right.clone() } else { left.clone() })
}

/// Numeric `+ - * / %`.
///
/// Integer arithmetic stays integral while it is exact and in range, and
/// falls back to floats otherwise. Mixed integer/float operands go through
/// `Decimal` so `0.5 * 4` is the integer `2`.
pub fn arithmetic(op: BinOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    if !left.is_number() || !right.is_number() {
        return Err(EvalError::NonNumeric(op));
    }
    if matches!(op, BinOp::Divide | BinOp::Modulo) && is_zero(right) {
        return Err(EvalError::DivisionByZero);
    }

    let result = match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => integer_op(op, *a, *b),
        (Value::Integer(a), Value::Float(b)) => {
            mixed_op(op, Decimal::from_i64(*a), Decimal::from_f64(*b), *a as f64, *b)
        }
        (Value::Float(a), Value::Integer(b)) => {
            mixed_op(op, Decimal::from_f64(*a), Decimal::from_i64(*b), *a, *b as f64)
        }
        (Value::Float(a), Value::Float(b)) => Value::Float(float_op(op, *a, *b)),
        _ => return Err(EvalError::NonNumeric(op)),
    };
    Ok(result)
}

fn is_zero(value: &Value) -> bool {
    match value {
        Value::Integer(n) => *n == 0,
        Value::Float(n) => *n == 0.0,
        _ => false,
    }
}

fn integer_op(op: BinOp, a: i64, b: i64) -> Value {
    let exact = match op {
        BinOp::Add => a.checked_add(b),
        BinOp::Subtract => a.checked_sub(b),
        BinOp::Multiply => a.checked_mul(b),
        BinOp::Divide if a.checked_rem(b) == Some(0) => a.checked_div(b),
        BinOp::Modulo => a.checked_rem(b),
        _ => None,
    };
    match exact {
        Some(n) => Value::Integer(n),
        None => Value::Float(float_op(op, a as f64, b as f64)),
    }
}

fn mixed_op(op: BinOp, a: Option<Decimal>, b: Option<Decimal>, af: f64, bf: f64) -> Value {
    if let (Some(ad), Some(bd)) = (a, b)
        && let Some(rd) = decimal_op(op, ad, bd)
    {
        if rd.is_integer()
            && let Some(r) = rd.to_i64()
        {
            return Value::Integer(r);
        } else if let Some(r) = rd.to_f64() {
            return Value::Float(r);
        }
    }
    Value::Float(float_op(op, af, bf))
}

fn decimal_op(op: BinOp, a: Decimal, b: Decimal) -> Option<Decimal> {
    match op {
        BinOp::Add => a.checked_add(b),
        BinOp::Subtract => a.checked_sub(b),
        BinOp::Multiply => a.checked_mul(b),
        BinOp::Divide => a.checked_div(b),
        BinOp::Modulo => a.checked_rem(b),
        _ => None,
    }
}

fn float_op(op: BinOp, a: f64, b: f64) -> f64 {
    match op {
        BinOp::Add => a + b,
        BinOp::Subtract => a - b,
        BinOp::Multiply => a * b,
        BinOp::Divide => a / b,
        BinOp::Modulo => a % b,
        _ => f64::NAN,
    }
}

/// `==`: `null` equals `undefined`, booleans compare as `0`/`1`, a string
/// compared with a number is converted to a number. Everything else is
/// compared strictly.
pub fn loose_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
        (Value::Undefined | Value::Null, _) | (_, Value::Undefined | Value::Null) => false,
        (Value::Boolean(b), other) | (other, Value::Boolean(b)) => {
            loose_equals(&Value::Integer(i64::from(*b)), other)
        }
        (Value::String(_), n) if n.is_number() => numbers_equal(&left.to_number(), n),
        (n, Value::String(_)) if n.is_number() => numbers_equal(n, &right.to_number()),
        _ => strict_equals(left, right),
    }
}

/// `===`: same runtime type and same value. Arrays and objects compare by
/// structure; object key order is ignored.
pub fn strict_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (a, b) if a.is_number() && b.is_number() => numbers_equal(a, b),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| strict_equals(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| strict_equals(x, y)))
        }
        _ => left == right,
    }
}

fn numbers_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => x == y,
        _ => match (a.as_float(), b.as_float()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

/// Ordering for `< <= > >=`. Both sides must share a runtime type, and only
/// numbers, strings and booleans are ordered. `None` means a `NaN` operand,
/// which fails every comparison.
fn compare(left: &Value, right: &Value) -> Result<Option<Ordering>, EvalError> {
    if left.type_name() != right.type_name() {
        return Err(EvalError::IncomparableTypes {
            left: left.type_name(),
            right: right.type_name(),
        });
    }

    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Ok(Some(a.cmp(b))),
        (Value::String(a), Value::String(b)) => Ok(Some(a.cmp(b))),
        (Value::Boolean(a), Value::Boolean(b)) => Ok(Some(a.cmp(b))),
        (a, b) if a.is_number() => Ok(a
            .as_float()
            .zip(b.as_float())
            .and_then(|(x, y)| x.partial_cmp(&y))),
        _ => Err(EvalError::Unorderable(left.type_name())),
    }
}
