//! Criteria matching (COUNTIF-style conditions and boolean masks)

use std::cmp::Ordering;

use gridcalc_core::CellError;

use super::{compare, compare_scalars, compare_with_wildcard, has_wildcard, CompareToken};
use crate::value::{parse_number, ValueObject};

/// A parsed condition such as `">=10"`, `"<>a*"` or `5`
#[derive(Debug, Clone, PartialEq)]
pub struct Criteria {
    token: CompareToken,
    operand: ValueObject,
}

impl Criteria {
    /// Parse a criteria value
    ///
    /// Text may start with a relational operator (default `=`); the rest is
    /// read as a number, boolean, error code or text. Non-text criteria
    /// compare with `=`.
    pub fn parse(criteria: &ValueObject) -> Self {
        match criteria {
            ValueObject::String(s) => {
                let (token, rest) = CompareToken::parse_prefix(s.as_str());
                Self {
                    token,
                    operand: parse_operand(rest),
                }
            }
            ValueObject::Null => Self {
                token: CompareToken::Equals,
                operand: ValueObject::string(""),
            },
            ValueObject::Array(a) => match a.get(0, 0) {
                Some(first) => Self::parse(first),
                None => Self::parse(&ValueObject::Null),
            },
            ValueObject::Reference(_) => Self::parse(&criteria.materialize()),
            other => Self {
                token: CompareToken::Equals,
                operand: other.clone(),
            },
        }
    }

    pub fn token(&self) -> CompareToken {
        self.token
    }

    pub fn operand(&self) -> &ValueObject {
        &self.operand
    }

    fn is_blank(&self) -> bool {
        matches!(&self.operand, ValueObject::String(s) if s.is_empty())
    }

    /// Whether a cell value satisfies the condition
    pub fn matches(&self, value: &ValueObject) -> bool {
        let value_blank = match value {
            ValueObject::Null => true,
            ValueObject::String(s) => s.is_empty(),
            _ => false,
        };
        if self.is_blank() {
            return match self.token {
                CompareToken::Equals => value_blank,
                CompareToken::NotEqual => !value_blank,
                token => match value {
                    ValueObject::String(_) => {
                        compare_scalars(value, &self.operand).is_ok_and(|o| token.holds(o))
                    }
                    _ => false,
                },
            };
        }
        if value.is_null() {
            return self.token == CompareToken::NotEqual;
        }

        match (value, &self.operand) {
            (ValueObject::Number(x), ValueObject::Number(y)) => {
                let ordering = if (x - y).abs() < 1e-10 {
                    Ordering::Equal
                } else if x < y {
                    Ordering::Less
                } else {
                    Ordering::Greater
                };
                self.token.holds(ordering)
            }
            (ValueObject::String(_), ValueObject::String(pattern)) if has_wildcard(pattern.as_str()) => {
                compare_with_wildcard(value, pattern.as_str(), self.token) == ValueObject::Boolean(true)
            }
            (ValueObject::String(_), ValueObject::String(_))
            | (ValueObject::Boolean(_), ValueObject::Boolean(_)) => {
                compare_scalars(value, &self.operand).is_ok_and(|o| self.token.holds(o))
            }
            (ValueObject::Error(x), ValueObject::Error(y)) => match self.token {
                CompareToken::Equals => x == y,
                CompareToken::NotEqual => x != y,
                _ => false,
            },
            _ => self.token == CompareToken::NotEqual,
        }
    }
}

fn parse_operand(text: &str) -> ValueObject {
    if text.is_empty() {
        return ValueObject::string("");
    }
    if let Some(n) = parse_number(text) {
        return ValueObject::Number(n);
    }
    if text.eq_ignore_ascii_case("TRUE") {
        return ValueObject::Boolean(true);
    }
    if text.eq_ignore_ascii_case("FALSE") {
        return ValueObject::Boolean(false);
    }
    match CellError::from_str(text) {
        Some(e) => ValueObject::Error(e),
        None => ValueObject::string(text),
    }
}

/// Compare every element of `range` against `criteria`
///
/// Without an explicit token, text criteria are parsed as conditions
/// (`">40"`, `"te?t"`) and elements are matched the way COUNTIF does. With a
/// token, elements are ordered against the criteria under the cross-type
/// order, honouring wildcards in text criteria.
///
/// The result has the shape of `range`: a Boolean array, or a Boolean for a
/// scalar range.
pub fn value_object_compare(
    range: &ValueObject,
    criteria: &ValueObject,
    token: Option<CompareToken>,
) -> ValueObject {
    let range = range.materialize();
    let criteria = criteria.materialize();

    match token {
        None => {
            if let Some(e) = criteria.error() {
                return ValueObject::Error(e);
            }
            let parsed = Criteria::parse(&criteria);
            range.map(|v| ValueObject::Boolean(parsed.matches(v)))
        }
        Some(token) => match criteria.as_str() {
            Some(pattern) => range.map(|v| compare_with_wildcard(v, pattern, token)),
            None => compare(&range, &criteria, token),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ArrayValue;
    use pretty_assertions::assert_eq;

    fn arr(literal: &str) -> ValueObject {
        ValueObject::Array(ArrayValue::parse_literal(literal).unwrap())
    }

    fn mask(range: &ValueObject, criteria: &str) -> ValueObject {
        value_object_compare(range, &ValueObject::string(criteria), None)
    }

    #[test]
    fn test_numeric_criteria() {
        let range = arr("{1;4;44;444}");
        assert_eq!(mask(&range, ">40"), arr("{FALSE;FALSE;TRUE;TRUE}"));
        assert_eq!(mask(&range, "<=4"), arr("{TRUE;TRUE;FALSE;FALSE}"));
        assert_eq!(mask(&range, "<>44"), arr("{TRUE;TRUE;FALSE;TRUE}"));
        assert_eq!(mask(&range, "4"), arr("{FALSE;TRUE;FALSE;FALSE}"));
    }

    #[test]
    fn test_wildcard_criteria() {
        let range = arr(
            "{
                Ada;
                test1;
                test12;
                Univer
            }",
        );
        assert_eq!(mask(&range, "test*"), arr("{FALSE;TRUE;TRUE;FALSE}"));
        assert_eq!(mask(&range, ">test*"), arr("{FALSE;TRUE;TRUE;TRUE}"));
        assert_eq!(mask(&range, "<test*"), arr("{TRUE;FALSE;FALSE;FALSE}"));
        assert_eq!(mask(&range, "test?"), arr("{FALSE;TRUE;FALSE;FALSE}"));
        assert_eq!(mask(&range, "=test??"), arr("{FALSE;FALSE;TRUE;FALSE}"));
        assert_eq!(mask(&range, ">=test??"), arr("{FALSE;TRUE;TRUE;TRUE}"));
        assert_eq!(mask(&range, "<=test??"), arr("{TRUE;FALSE;FALSE;FALSE}"));
    }

    #[test]
    fn test_explicit_token() {
        let range = arr("{Ada;test1;Univer}");
        let result = value_object_compare(
            &range,
            &ValueObject::string("test*"),
            Some(CompareToken::GreaterThan),
        );
        assert_eq!(result, arr("{FALSE;TRUE;TRUE}"));

        // Cross-type order: every text sorts after every number
        let range = arr("{1,\"a\",TRUE}");
        let result = value_object_compare(&range, &ValueObject::Number(5.0), Some(CompareToken::GreaterThan));
        assert_eq!(result, arr("{FALSE,TRUE,TRUE}"));
    }

    #[test]
    fn test_blank_and_mixed_types() {
        let range = arr("{1,,\"\",\"x\"}");
        assert_eq!(
            value_object_compare(&range, &ValueObject::Null, None),
            arr("{FALSE,TRUE,TRUE,FALSE}")
        );
        assert_eq!(mask(&range, "<>"), arr("{TRUE,FALSE,FALSE,TRUE}"));

        // Number criteria never match text that looks like a number
        let range = arr("{5,\"5\"}");
        assert_eq!(mask(&range, "5"), arr("{TRUE,FALSE}"));
        assert_eq!(mask(&range, "<>5"), arr("{FALSE,TRUE}"));
    }

    #[test]
    fn test_criteria_parse() {
        let c = Criteria::parse(&ValueObject::string(">=TRUE"));
        assert_eq!(c.token(), CompareToken::GreaterThanOrEqual);
        assert_eq!(c.operand(), &ValueObject::Boolean(true));

        let c = Criteria::parse(&ValueObject::string("#N/A"));
        assert!(c.matches(&ValueObject::Error(CellError::Na)));
        assert!(!c.matches(&ValueObject::Error(CellError::Ref)));

        let c = Criteria::parse(&ValueObject::Number(5.0));
        assert!(c.matches(&ValueObject::Number(5.0 + 1e-12)));
    }

    #[test]
    fn test_scalar_range() {
        let result = mask(&ValueObject::Number(50.0), ">40");
        assert_eq!(result, ValueObject::Boolean(true));
    }
}
