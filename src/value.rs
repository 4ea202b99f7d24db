//! Runtime values and the operator table.
use std::cmp::Ordering;
use std::fmt;

use num_integer::Integer;

use crate::ops::BinaryOp;
use crate::vm::OperationError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Text(String),
    Bool(bool),
    /// The variable itself (an assignment target), named with its `$` sigil.
    Var(String),
}

impl Value {
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(n) => *n != 0,
            Value::Text(s) => !s.is_empty(),
            Value::Bool(b) => *b,
            Value::Var(_) => true,
        }
    }

    /// Integers and booleans take part in arithmetic; `true` counts as 1.
    fn as_number(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Bool(b) => Some(*b as i64),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Text(_) => "text",
            Value::Bool(_) => "boolean",
            Value::Var(_) => "variable",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Var(name) => f.write_str(name),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

/// Floor division, like the `d` operator of integer literals.
pub fn div_floor(a: i64, b: i64) -> Result<i64, OperationError> {
    if b == 0 {
        return Err(OperationError::DivisionByZero);
    }
    if a == i64::MIN && b == -1 {
        return Err(OperationError::IntegerOverflow);
    }
    Ok(Integer::div_floor(&a, &b))
}

/// Applies an integer-only operator; used when folding `N` literals.
pub fn apply_int(op: BinaryOp, a: i64, b: i64) -> Result<i64, OperationError> {
    match op {
        BinaryOp::Add => a.checked_add(b).ok_or(OperationError::IntegerOverflow),
        BinaryOp::Subtract => a.checked_sub(b).ok_or(OperationError::IntegerOverflow),
        BinaryOp::Multiply => a.checked_mul(b).ok_or(OperationError::IntegerOverflow),
        BinaryOp::Divide => div_floor(a, b),
        _ => Err(OperationError::TypeMismatch { op, lhs: "integer", rhs: "integer" }),
    }
}

fn check_text_len(len: Option<usize>, max_text_len: usize) -> Result<(), OperationError> {
    match len {
        Some(len) if len <= max_text_len => Ok(()),
        _ => Err(OperationError::TextTooLong { limit: max_text_len }),
    }
}

/// Evaluates `lhs op rhs`. Both operands must already be resolved.
///
/// Text produced by `ADD` or `MUL` may be at most `max_text_len` bytes long.
pub fn apply(op: BinaryOp, lhs: Value, rhs: Value, max_text_len: usize) -> Result<Value, OperationError> {
    let mismatch = |lhs: &Value, rhs: &Value| OperationError::TypeMismatch {
        op,
        lhs: lhs.kind(),
        rhs: rhs.kind(),
    };

    match op {
        BinaryOp::Or => Ok(if lhs.is_truthy() { lhs } else { rhs }),
        BinaryOp::And => Ok(if lhs.is_truthy() { rhs } else { lhs }),
        BinaryOp::Equal => Ok(Value::Bool(loose_eq(&lhs, &rhs))),
        BinaryOp::NotEqual => Ok(Value::Bool(!loose_eq(&lhs, &rhs))),
        BinaryOp::Greater | BinaryOp::GreaterOrEqual | BinaryOp::Less | BinaryOp::LessOrEqual => {
            let ordering = compare(&lhs, &rhs).ok_or_else(|| mismatch(&lhs, &rhs))?;
            Ok(Value::Bool(match op {
                BinaryOp::Greater => ordering == Ordering::Greater,
                BinaryOp::GreaterOrEqual => ordering != Ordering::Less,
                BinaryOp::Less => ordering == Ordering::Less,
                _ => ordering != Ordering::Greater,
            }))
        }
        BinaryOp::Add => match (&lhs, &rhs) {
            (Value::Text(a), Value::Text(b)) => {
                check_text_len(a.len().checked_add(b.len()), max_text_len)?;
                Ok(Value::Text(format!("{a}{b}")))
            }
            _ => arithmetic(op, &lhs, &rhs).ok_or_else(|| mismatch(&lhs, &rhs))?,
        },
        BinaryOp::Multiply => match (&lhs, &rhs) {
            (Value::Text(s), count) | (count, Value::Text(s)) if count.as_number().is_some() => {
                let count = usize::try_from(count.as_number().unwrap_or_default().max(0)).unwrap_or(usize::MAX);
                check_text_len(s.len().checked_mul(count), max_text_len)?;
                Ok(Value::Text(s.repeat(count)))
            }
            _ => arithmetic(op, &lhs, &rhs).ok_or_else(|| mismatch(&lhs, &rhs))?,
        },
        BinaryOp::Subtract | BinaryOp::Divide => {
            arithmetic(op, &lhs, &rhs).ok_or_else(|| mismatch(&lhs, &rhs))?
        }
    }
}

fn arithmetic(op: BinaryOp, lhs: &Value, rhs: &Value) -> Option<Result<Value, OperationError>> {
    let (a, b) = (lhs.as_number()?, rhs.as_number()?);
    Some(apply_int(op, a, b).map(Value::Int))
}

fn loose_eq(lhs: &Value, rhs: &Value) -> bool {
    match (lhs.as_number(), rhs.as_number()) {
        (Some(a), Some(b)) => a == b,
        _ => lhs == rhs,
    }
}

fn compare(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    match (lhs, rhs) {
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        _ => Some(lhs.as_number()?.cmp(&rhs.as_number()?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(op: BinaryOp, lhs: impl Into<Value>, rhs: impl Into<Value>) -> Value {
        apply(op, lhs.into(), rhs.into(), usize::MAX).unwrap()
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval(BinaryOp::Add, 2, 3), Value::Int(5));
        assert_eq!(eval(BinaryOp::Subtract, 2, 3), Value::Int(-1));
        assert_eq!(eval(BinaryOp::Multiply, -4, 3), Value::Int(-12));
        assert_eq!(eval(BinaryOp::Divide, 7, 2), Value::Int(3));
        assert_eq!(eval(BinaryOp::Add, true, 1), Value::Int(2));
    }

    #[test]
    fn test_division_floors() {
        assert_eq!(div_floor(-7, 2), Ok(-4));
        assert_eq!(div_floor(7, -2), Ok(-4));
        assert_eq!(div_floor(-7, -2), Ok(3));
        assert_eq!(div_floor(1, 0), Err(OperationError::DivisionByZero));
        assert_eq!(div_floor(i64::MIN, -1), Err(OperationError::IntegerOverflow));
    }

    #[test]
    fn test_overflow() {
        assert_eq!(apply_int(BinaryOp::Add, i64::MAX, 1), Err(OperationError::IntegerOverflow));
        assert_eq!(apply_int(BinaryOp::Multiply, i64::MIN, -1), Err(OperationError::IntegerOverflow));
    }

    #[test]
    fn test_text() {
        assert_eq!(eval(BinaryOp::Add, "ab", "cd"), Value::from("abcd"));
        assert_eq!(eval(BinaryOp::Multiply, "ab", 3), Value::from("ababab"));
        assert_eq!(eval(BinaryOp::Multiply, 2, "x"), Value::from("xx"));
        assert_eq!(eval(BinaryOp::Multiply, "x", -1), Value::from(""));
        assert!(matches!(
            apply(BinaryOp::Subtract, "a".into(), 1.into(), usize::MAX),
            Err(OperationError::TypeMismatch { lhs: "text", rhs: "integer", .. })
        ));
        assert!(apply(BinaryOp::Add, "a".into(), 1.into(), usize::MAX).is_err());
    }

    #[test]
    fn test_text_length_limit() {
        assert_eq!(apply(BinaryOp::Multiply, "ab".into(), 2.into(), 4), Ok(Value::from("abab")));
        assert_eq!(
            apply(BinaryOp::Multiply, "ab".into(), 3.into(), 4),
            Err(OperationError::TextTooLong { limit: 4 })
        );
        // should fail in reasonable time
        assert_eq!(
            apply(BinaryOp::Multiply, i64::MAX.into(), "ab".into(), 1 << 20),
            Err(OperationError::TextTooLong { limit: 1 << 20 })
        );
        assert_eq!(
            apply(BinaryOp::Add, "abc".into(), "de".into(), 4),
            Err(OperationError::TextTooLong { limit: 4 })
        );
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(eval(BinaryOp::Less, 1, 2), Value::Bool(true));
        assert_eq!(eval(BinaryOp::LessOrEqual, 2, 2), Value::Bool(true));
        assert_eq!(eval(BinaryOp::Greater, 2, 2), Value::Bool(false));
        assert_eq!(eval(BinaryOp::GreaterOrEqual, 3, 2), Value::Bool(true));
        assert_eq!(eval(BinaryOp::Less, "abc", "abd"), Value::Bool(true));
        assert_eq!(eval(BinaryOp::Equal, 1, true), Value::Bool(true));
        assert_eq!(eval(BinaryOp::Equal, 1, "1"), Value::Bool(false));
        assert_eq!(eval(BinaryOp::NotEqual, "a", "b"), Value::Bool(true));
        assert!(apply(BinaryOp::Less, "a".into(), 1.into(), usize::MAX).is_err());
    }

    #[test]
    fn test_logical_returns_operand() {
        assert_eq!(eval(BinaryOp::Or, 0, 5), Value::Int(5));
        assert_eq!(eval(BinaryOp::Or, 3, 5), Value::Int(3));
        assert_eq!(eval(BinaryOp::And, 3, 5), Value::Int(5));
        assert_eq!(eval(BinaryOp::And, "", 5), Value::from(""));
        assert_eq!(eval(BinaryOp::And, true, false), Value::Bool(false));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Int(-12).to_string(), "-12");
        assert_eq!(Value::Bool(true).to_string(), "True");
        assert_eq!(Value::Bool(false).to_string(), "False");
        assert_eq!(Value::from("hi there").to_string(), "hi there");
    }
}
