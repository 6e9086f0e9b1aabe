//! Value objects
//!
//! [`ValueObject`] is the result type of every sub-expression. It is a closed
//! enum: consumers match on it instead of asking "is this an array?".
//!
//! Value objects are immutable. Every operation returns a new value; array
//! grids are shared behind an `Arc` so clones are cheap.

mod array;
mod async_value;
mod primitive;
mod reference;

pub use array::{ArrayOrigin, ArrayValue};
pub use async_value::AsyncValue;
pub use primitive::{CustomValue, Primitive};
pub use reference::{ReferenceData, ReferenceValue};

pub(crate) use array::parse_scalar_token;

use std::cmp::Ordering;
use std::fmt;

use gridcalc_core::{CellError, CellValue, SharedString};

use crate::compare::{self, CompareToken};

/// Result of evaluating an expression
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ValueObject {
    /// Blank (empty cell or omitted argument)
    #[default]
    Null,
    Number(f64),
    String(SharedString),
    Boolean(bool),
    Error(CellError),
    /// Two-dimensional grid of scalar values
    Array(ArrayValue),
    /// Unresolved pointer at a cell range
    Reference(ReferenceValue),
    /// Pending computation producing a scalar
    AsyncScalar(AsyncValue),
    /// Pending computation producing an array
    AsyncArray(AsyncValue),
}

impl ValueObject {
    /// Create a string value
    pub fn string<S: AsRef<str>>(s: S) -> Self {
        ValueObject::String(SharedString::new(s))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ValueObject::Null)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ValueObject::Error(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, ValueObject::Array(_))
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, ValueObject::Reference(_))
    }

    pub fn is_async(&self) -> bool {
        matches!(self, ValueObject::AsyncScalar(_) | ValueObject::AsyncArray(_))
    }

    /// Null, Number, String, Boolean or Error
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            ValueObject::Null
                | ValueObject::Number(_)
                | ValueObject::String(_)
                | ValueObject::Boolean(_)
                | ValueObject::Error(_)
        )
    }

    /// Get the error if this is one
    pub fn error(&self) -> Option<CellError> {
        match self {
            ValueObject::Error(e) => Some(*e),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayValue> {
        match self {
            ValueObject::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ValueObject::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Get the type name for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            ValueObject::Null => "null",
            ValueObject::Number(_) => "number",
            ValueObject::String(_) => "string",
            ValueObject::Boolean(_) => "boolean",
            ValueObject::Error(_) => "error",
            ValueObject::Array(_) => "array",
            ValueObject::Reference(_) => "reference",
            ValueObject::AsyncScalar(_) => "async",
            ValueObject::AsyncArray(_) => "async array",
        }
    }

    /// Coerce to a number
    ///
    /// Booleans become 1/0, blanks 0, numeric text is parsed. A 1x1 array
    /// coerces through its only element.
    pub fn to_number(&self) -> Result<f64, CellError> {
        match self {
            ValueObject::Number(n) => Ok(*n),
            ValueObject::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
            ValueObject::Null => Ok(0.0),
            ValueObject::String(s) => parse_number(s.as_str()).ok_or(CellError::Value),
            ValueObject::Error(e) => Err(*e),
            ValueObject::Array(a) => match a.single() {
                Some(v) => v.to_number(),
                None => Err(CellError::Value),
            },
            ValueObject::Reference(_) => Err(CellError::Value),
            ValueObject::AsyncScalar(_) | ValueObject::AsyncArray(_) => {
                Err(CellError::GettingData)
            }
        }
    }

    /// Coerce to a boolean
    pub fn to_bool(&self) -> Result<bool, CellError> {
        match self {
            ValueObject::Boolean(b) => Ok(*b),
            ValueObject::Number(n) => Ok(*n != 0.0),
            ValueObject::Null => Ok(false),
            ValueObject::String(s) => {
                let upper = s.as_str().trim().to_uppercase();
                match upper.as_str() {
                    "TRUE" => Ok(true),
                    "FALSE" => Ok(false),
                    _ => Err(CellError::Value),
                }
            }
            ValueObject::Error(e) => Err(*e),
            ValueObject::Array(a) => match a.single() {
                Some(v) => v.to_bool(),
                None => Err(CellError::Value),
            },
            ValueObject::Reference(_) => Err(CellError::Value),
            ValueObject::AsyncScalar(_) | ValueObject::AsyncArray(_) => {
                Err(CellError::GettingData)
            }
        }
    }

    /// Coerce to text, as used by `&`
    pub fn to_text(&self) -> Result<String, CellError> {
        match self {
            ValueObject::Null => Ok(String::new()),
            ValueObject::Number(n) => Ok(format_number(*n)),
            ValueObject::String(s) => Ok(s.as_str().to_string()),
            ValueObject::Boolean(b) => Ok(if *b { "TRUE" } else { "FALSE" }.to_string()),
            ValueObject::Error(e) => Err(*e),
            ValueObject::Array(a) => match a.single() {
                Some(v) => v.to_text(),
                None => Err(CellError::Value),
            },
            ValueObject::Reference(_) => Err(CellError::Value),
            ValueObject::AsyncScalar(_) | ValueObject::AsyncArray(_) => {
                Err(CellError::GettingData)
            }
        }
    }

    /// Resolve a reference into the array it points at; other values are cloned
    pub fn materialize(&self) -> ValueObject {
        match self {
            ValueObject::Reference(r) => r.to_array_value(),
            other => other.clone(),
        }
    }

    /// Apply `f` to every element of an array, or to the value itself
    pub fn map<F>(&self, mut f: F) -> ValueObject
    where
        F: FnMut(&ValueObject) -> ValueObject,
    {
        match self {
            ValueObject::Array(a) => ValueObject::Array(a.map(f)),
            ValueObject::Reference(_) => self.materialize().map(f),
            other => f(other),
        }
    }

    pub fn plus(&self, other: &ValueObject) -> ValueObject {
        self.binary(other, |a, b| arithmetic(a, b, |x, y| Ok(x + y)))
    }

    pub fn minus(&self, other: &ValueObject) -> ValueObject {
        self.binary(other, |a, b| arithmetic(a, b, |x, y| Ok(x - y)))
    }

    pub fn multiply(&self, other: &ValueObject) -> ValueObject {
        self.binary(other, |a, b| arithmetic(a, b, |x, y| Ok(x * y)))
    }

    /// Division; a zero divisor yields `#DIV/0!`
    pub fn divided(&self, other: &ValueObject) -> ValueObject {
        self.binary(other, |a, b| {
            arithmetic(a, b, |x, y| {
                if y == 0.0 {
                    Err(CellError::Div0)
                } else {
                    Ok(x / y)
                }
            })
        })
    }

    pub fn power(&self, other: &ValueObject) -> ValueObject {
        self.binary(other, |a, b| {
            arithmetic(a, b, |x, y| {
                if x == 0.0 && y < 0.0 {
                    Err(CellError::Div0)
                } else {
                    Ok(x.powf(y))
                }
            })
        })
    }

    /// Text concatenation (`&`)
    pub fn concatenate(&self, other: &ValueObject) -> ValueObject {
        self.binary(other, |a, b| {
            if let Some(e) = first_error(a, b) {
                return ValueObject::Error(e);
            }
            match (a.to_text(), b.to_text()) {
                (Ok(l), Ok(r)) => ValueObject::string(l + &r),
                (Err(e), _) | (_, Err(e)) => ValueObject::Error(e),
            }
        })
    }

    /// Unary minus
    pub fn negate(&self) -> ValueObject {
        self.map(|v| match v.to_number() {
            Ok(n) => ValueObject::Number(-n),
            Err(e) => ValueObject::Error(e),
        })
    }

    /// Relational comparison producing a Boolean (or a Boolean array)
    pub fn compare(&self, other: &ValueObject, token: CompareToken) -> ValueObject {
        compare::compare(self, other, token)
    }

    pub fn is_equal(&self, other: &ValueObject) -> ValueObject {
        self.compare(other, CompareToken::Equals)
    }

    /// Scalar "less than" under the cross-type order; errors never compare
    pub fn is_less_than(&self, other: &ValueObject) -> bool {
        compare::compare_scalars(self, other) == Ok(Ordering::Less)
    }

    /// Scalar "greater than" under the cross-type order; errors never compare
    pub fn is_greater_than(&self, other: &ValueObject) -> bool {
        compare::compare_scalars(self, other) == Ok(Ordering::Greater)
    }

    /// Apply a scalar operation, broadcasting over arrays
    pub(crate) fn binary<F>(&self, other: &ValueObject, f: F) -> ValueObject
    where
        F: Fn(&ValueObject, &ValueObject) -> ValueObject,
    {
        match (self, other) {
            (ValueObject::Reference(_), _) | (_, ValueObject::Reference(_)) => {
                self.materialize().binary(&other.materialize(), f)
            }
            (ValueObject::Array(a), _) => ValueObject::Array(a.broadcast(other, &f)),
            (_, ValueObject::Array(_)) => {
                ValueObject::Array(ArrayValue::from_scalar(self.clone()).broadcast(other, &f))
            }
            _ => f(self, other),
        }
    }

    /// Convert to a storable cell value
    ///
    /// Arrays store their top-left element.
    pub fn to_cell_value(&self) -> CellValue {
        match self {
            ValueObject::Null => CellValue::Empty,
            ValueObject::Number(n) => CellValue::Number(*n),
            ValueObject::String(s) => CellValue::String(s.clone()),
            ValueObject::Boolean(b) => CellValue::Boolean(*b),
            ValueObject::Error(e) => CellValue::Error(*e),
            ValueObject::Array(a) => a
                .get(0, 0)
                .map(ValueObject::to_cell_value)
                .unwrap_or(CellValue::Empty),
            ValueObject::Reference(_) => self.materialize().to_cell_value(),
            ValueObject::AsyncScalar(_) | ValueObject::AsyncArray(_) => {
                CellValue::Error(CellError::GettingData)
            }
        }
    }
}

/// Error of the first operand that is one, left first
pub(crate) fn first_error(a: &ValueObject, b: &ValueObject) -> Option<CellError> {
    a.error().or_else(|| b.error())
}

fn arithmetic<F>(a: &ValueObject, b: &ValueObject, op: F) -> ValueObject
where
    F: Fn(f64, f64) -> Result<f64, CellError>,
{
    if let Some(e) = first_error(a, b) {
        return ValueObject::Error(e);
    }
    let x = match a.to_number() {
        Ok(x) => x,
        Err(e) => return ValueObject::Error(e),
    };
    let y = match b.to_number() {
        Ok(y) => y,
        Err(e) => return ValueObject::Error(e),
    };
    match op(x, y) {
        Ok(r) if r.is_finite() => ValueObject::Number(r),
        Ok(_) => ValueObject::Error(CellError::Num),
        Err(e) => ValueObject::Error(e),
    }
}

/// Parse numeric text (`" 12 "`, `"1e3"`, `"50%"`)
pub fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(pct) = s.strip_suffix('%') {
        return pct.trim().parse::<f64>().ok().map(|n| n / 100.0);
    }
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Format a number the way a cell displays it in general format
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for ValueObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueObject::Null => Ok(()),
            ValueObject::Number(n) => write!(f, "{}", format_number(*n)),
            ValueObject::String(s) => write!(f, "{}", s),
            ValueObject::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            ValueObject::Error(e) => write!(f, "{}", e),
            ValueObject::Array(a) => write!(f, "{}", a),
            ValueObject::Reference(r) => write!(f, "{}", r),
            ValueObject::AsyncScalar(_) | ValueObject::AsyncArray(_) => {
                write!(f, "{}", CellError::GettingData)
            }
        }
    }
}

impl From<&CellValue> for ValueObject {
    fn from(value: &CellValue) -> Self {
        match value {
            CellValue::Empty => ValueObject::Null,
            CellValue::Boolean(b) => ValueObject::Boolean(*b),
            CellValue::Number(n) => ValueObject::Number(*n),
            CellValue::String(s) => ValueObject::String(s.clone()),
            CellValue::Error(e) => ValueObject::Error(*e),
        }
    }
}

impl From<CellValue> for ValueObject {
    fn from(value: CellValue) -> Self {
        ValueObject::from(&value)
    }
}

impl From<f64> for ValueObject {
    fn from(n: f64) -> Self {
        ValueObject::Number(n)
    }
}

impl From<bool> for ValueObject {
    fn from(b: bool) -> Self {
        ValueObject::Boolean(b)
    }
}

impl From<&str> for ValueObject {
    fn from(s: &str) -> Self {
        ValueObject::string(s)
    }
}

impl From<String> for ValueObject {
    fn from(s: String) -> Self {
        ValueObject::string(s)
    }
}

impl From<CellError> for ValueObject {
    fn from(e: CellError) -> Self {
        ValueObject::Error(e)
    }
}

impl From<ArrayValue> for ValueObject {
    fn from(a: ArrayValue) -> Self {
        ValueObject::Array(a)
    }
}

impl From<ReferenceValue> for ValueObject {
    fn from(r: ReferenceValue) -> Self {
        ValueObject::Reference(r)
    }
}
