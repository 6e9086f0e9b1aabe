//! Plain, serializable values
//!
//! Custom functions receive and return these instead of value objects, and
//! results are converted to them for storage or display.

use gridcalc_core::CellError;
use serde::{Deserialize, Serialize};

use super::{ArrayValue, ValueObject};

/// A plain scalar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Primitive {
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
}

/// A plain scalar or a plain 2-D array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CustomValue {
    Scalar(Primitive),
    Array(Vec<Vec<Primitive>>),
}

impl From<f64> for Primitive {
    fn from(n: f64) -> Self {
        Primitive::Number(n)
    }
}

impl From<bool> for Primitive {
    fn from(b: bool) -> Self {
        Primitive::Boolean(b)
    }
}

impl From<&str> for Primitive {
    fn from(s: &str) -> Self {
        Primitive::String(s.to_string())
    }
}

impl ValueObject {
    /// Plain representation of a scalar; errors become their code text
    pub fn to_primitive(&self) -> Primitive {
        match self {
            ValueObject::Null => Primitive::Null,
            ValueObject::Number(n) => Primitive::Number(*n),
            ValueObject::String(s) => Primitive::String(s.as_str().to_string()),
            ValueObject::Boolean(b) => Primitive::Boolean(*b),
            ValueObject::Error(e) => Primitive::String(e.as_str().to_string()),
            ValueObject::Array(a) => a
                .get(0, 0)
                .map(ValueObject::to_primitive)
                .unwrap_or(Primitive::Null),
            ValueObject::Reference(_) => self.materialize().to_primitive(),
            ValueObject::AsyncScalar(_) | ValueObject::AsyncArray(_) => {
                Primitive::String(CellError::GettingData.as_str().to_string())
            }
        }
    }

    /// Plain representation; arrays keep their shape
    pub fn to_custom_value(&self) -> CustomValue {
        match self {
            ValueObject::Array(a) => CustomValue::Array(
                a.rows()
                    .iter()
                    .map(|row| row.iter().map(ValueObject::to_primitive).collect())
                    .collect(),
            ),
            ValueObject::Reference(_) => self.materialize().to_custom_value(),
            scalar => CustomValue::Scalar(scalar.to_primitive()),
        }
    }

    /// Wrap a plain scalar; text spelling an error code becomes that error
    pub fn from_primitive(primitive: &Primitive) -> ValueObject {
        match primitive {
            Primitive::Null => ValueObject::Null,
            Primitive::Boolean(b) => ValueObject::Boolean(*b),
            Primitive::Number(n) => ValueObject::Number(*n),
            Primitive::String(s) => match CellError::from_str(s) {
                Some(e) => ValueObject::Error(e),
                None => ValueObject::string(s),
            },
        }
    }

    /// Wrap a custom function result; array-shaped results become arrays
    /// without an origin
    pub fn from_custom_value(value: &CustomValue) -> ValueObject {
        match value {
            CustomValue::Scalar(p) => ValueObject::from_primitive(p),
            CustomValue::Array(rows) => ValueObject::Array(ArrayValue::new(
                rows.iter()
                    .map(|row| row.iter().map(ValueObject::from_primitive).collect())
                    .collect(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_error_text_becomes_error() {
        let value = ValueObject::from_primitive(&Primitive::String("#N/A".into()));
        assert_eq!(value, ValueObject::Error(CellError::Na));

        let value = ValueObject::from_primitive(&Primitive::String("N/A".into()));
        assert_eq!(value, ValueObject::string("N/A"));
    }

    #[test]
    fn test_custom_value_json() {
        let value: CustomValue = serde_json::from_str(r#"[[1, "a"], [true, null]]"#).unwrap();
        assert_eq!(
            value,
            CustomValue::Array(vec![
                vec![Primitive::Number(1.0), Primitive::String("a".into())],
                vec![Primitive::Boolean(true), Primitive::Null],
            ])
        );

        let wrapped = ValueObject::from_custom_value(&value);
        let array = wrapped.as_array().unwrap();
        assert_eq!((array.row_count(), array.column_count()), (2, 2));
        assert!(array.origin().is_none());

        let scalar: CustomValue = serde_json::from_str("2.5").unwrap();
        assert_eq!(scalar, CustomValue::Scalar(Primitive::Number(2.5)));
    }

    #[test]
    fn test_to_custom_value() {
        let array = ArrayValue::parse_literal("{1,#DIV/0!}").unwrap();
        assert_eq!(
            ValueObject::Array(array).to_custom_value(),
            CustomValue::Array(vec![vec![
                Primitive::Number(1.0),
                Primitive::String("#DIV/0!".into())
            ]])
        );
    }
}
