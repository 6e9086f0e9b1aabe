//! Comparison of value objects
//!
//! Relational operators, the cross-type total order used by sorting and
//! lookups (Number < String < Boolean), wildcard patterns and criteria
//! masks.

mod criteria;
mod search;

pub use criteria::{value_object_compare, Criteria};
pub use search::{binary_search, order_search, BinarySearchType, OrderSearchType};

use std::cmp::Ordering;
use std::fmt;

use gridcalc_core::CellError;

use crate::value::ValueObject;

/// Relational operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareToken {
    Equals,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl CompareToken {
    pub fn as_str(self) -> &'static str {
        match self {
            CompareToken::Equals => "=",
            CompareToken::NotEqual => "<>",
            CompareToken::GreaterThan => ">",
            CompareToken::GreaterThanOrEqual => ">=",
            CompareToken::LessThan => "<",
            CompareToken::LessThanOrEqual => "<=",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "=" => Some(CompareToken::Equals),
            "<>" => Some(CompareToken::NotEqual),
            ">" => Some(CompareToken::GreaterThan),
            ">=" => Some(CompareToken::GreaterThanOrEqual),
            "<" => Some(CompareToken::LessThan),
            "<=" => Some(CompareToken::LessThanOrEqual),
            _ => None,
        }
    }

    /// Split a leading operator off `s`
    ///
    /// Text without an operator compares with `=`.
    pub fn parse_prefix(s: &str) -> (Self, &str) {
        // Longer operators first
        for token in [
            CompareToken::GreaterThanOrEqual,
            CompareToken::LessThanOrEqual,
            CompareToken::NotEqual,
            CompareToken::GreaterThan,
            CompareToken::LessThan,
            CompareToken::Equals,
        ] {
            if let Some(rest) = s.strip_prefix(token.as_str()) {
                return (token, rest);
            }
        }
        (CompareToken::Equals, s)
    }

    /// Whether an ordering satisfies the operator
    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            CompareToken::Equals => ordering == Ordering::Equal,
            CompareToken::NotEqual => ordering != Ordering::Equal,
            CompareToken::GreaterThan => ordering == Ordering::Greater,
            CompareToken::GreaterThanOrEqual => ordering != Ordering::Less,
            CompareToken::LessThan => ordering == Ordering::Less,
            CompareToken::LessThanOrEqual => ordering != Ordering::Greater,
        }
    }
}

impl fmt::Display for CompareToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rank of a scalar type in the cross-type order
fn type_rank(value: &ValueObject) -> u8 {
    match value {
        ValueObject::Number(_) => 0,
        ValueObject::String(_) => 1,
        ValueObject::Boolean(_) => 2,
        _ => 3,
    }
}

/// Reduce a value to a comparable scalar
fn scalar_of(value: &ValueObject) -> Result<&ValueObject, CellError> {
    match value {
        ValueObject::Error(e) => Err(*e),
        ValueObject::Array(a) => match a.single() {
            Some(v) => scalar_of(v),
            None => Err(CellError::Value),
        },
        ValueObject::Reference(_) => Err(CellError::Value),
        ValueObject::AsyncScalar(_) | ValueObject::AsyncArray(_) => Err(CellError::GettingData),
        scalar => Ok(scalar),
    }
}

/// Blank compared against `other` behaves as that type's empty value
fn blank_like(other: &ValueObject) -> ValueObject {
    match other {
        ValueObject::String(_) => ValueObject::string(""),
        ValueObject::Boolean(_) => ValueObject::Boolean(false),
        _ => ValueObject::Number(0.0),
    }
}

/// Order two scalars
///
/// Errors are returned instead of an ordering, the left operand's first.
/// Values of different types order as Number < String < Boolean; strings
/// compare case-insensitively.
///
/// Strings are lowercased and then ordered by code point, not by locale
/// collation, so accented text sorts after unaccented text (`"é" > "f"`).
pub fn compare_scalars(a: &ValueObject, b: &ValueObject) -> Result<Ordering, CellError> {
    let a = scalar_of(a);
    let b = scalar_of(b);
    let (a, b) = match (a, b) {
        (Err(e), _) | (_, Err(e)) => return Err(e),
        (Ok(a), Ok(b)) => (a, b),
    };

    match (a, b) {
        (ValueObject::Null, ValueObject::Null) => Ok(Ordering::Equal),
        (ValueObject::Null, other) => compare_scalars(&blank_like(other), other),
        (other, ValueObject::Null) => compare_scalars(other, &blank_like(other)),
        (ValueObject::Number(x), ValueObject::Number(y)) => {
            Ok(x.partial_cmp(y).unwrap_or(Ordering::Equal))
        }
        (ValueObject::String(x), ValueObject::String(y)) => {
            Ok(x.as_str().to_lowercase().cmp(&y.as_str().to_lowercase()))
        }
        (ValueObject::Boolean(x), ValueObject::Boolean(y)) => Ok(x.cmp(y)),
        (a, b) => Ok(type_rank(a).cmp(&type_rank(b))),
    }
}

fn compare_scalar_token(a: &ValueObject, b: &ValueObject, token: CompareToken) -> ValueObject {
    match compare_scalars(a, b) {
        Ok(ordering) => ValueObject::Boolean(token.holds(ordering)),
        Err(e) => ValueObject::Error(e),
    }
}

/// Compare two values with a relational operator
///
/// Arrays and references broadcast; the result is a Boolean or a Boolean
/// array.
pub fn compare(a: &ValueObject, b: &ValueObject, token: CompareToken) -> ValueObject {
    a.binary(b, |x, y| compare_scalar_token(x, y, token))
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PatternChar {
    AnyRun,
    AnyOne,
    Literal(char),
}

fn pattern_chars(pattern: &str) -> Vec<PatternChar> {
    let mut out = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '~' => match chars.next() {
                Some(escaped) => out.extend(escaped.to_lowercase().map(PatternChar::Literal)),
                None => out.push(PatternChar::Literal('~')),
            },
            '*' => out.push(PatternChar::AnyRun),
            '?' => out.push(PatternChar::AnyOne),
            c => out.extend(c.to_lowercase().map(PatternChar::Literal)),
        }
    }
    out
}

/// Whether `pattern` contains an unescaped `*` or `?`
pub fn has_wildcard(pattern: &str) -> bool {
    pattern_chars(pattern)
        .iter()
        .any(|p| !matches!(p, PatternChar::Literal(_)))
}

/// Literal text of a pattern: wildcards dropped, escapes resolved
fn pattern_literal(pattern: &str) -> String {
    pattern_chars(pattern)
        .into_iter()
        .filter_map(|p| match p {
            PatternChar::Literal(c) => Some(c),
            _ => None,
        })
        .collect()
}

/// Match text against a wildcard pattern, ignoring case
///
/// `*` matches any run of characters, `?` exactly one, and `~` makes the
/// next character literal.
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
    let pattern = pattern_chars(pattern);
    let text: Vec<char> = text.chars().flat_map(char::to_lowercase).collect();

    let mut pi = 0;
    let mut ti = 0;
    let mut star_pi = None;
    let mut star_ti = 0;

    while ti < text.len() {
        match pattern.get(pi) {
            Some(PatternChar::AnyOne) => {
                pi += 1;
                ti += 1;
            }
            Some(PatternChar::Literal(c)) if *c == text[ti] => {
                pi += 1;
                ti += 1;
            }
            Some(PatternChar::AnyRun) => {
                star_pi = Some(pi);
                star_ti = ti;
                pi += 1;
            }
            _ => match star_pi {
                Some(sp) => {
                    pi = sp + 1;
                    star_ti += 1;
                    ti = star_ti;
                }
                None => return false,
            },
        }
    }

    pattern[pi..].iter().all(|p| *p == PatternChar::AnyRun)
}

/// Compare a scalar against a text pattern that may contain wildcards
///
/// Without wildcards this is plain case-insensitive comparison. With
/// wildcards, `=` and `<>` test the match; `>`/`>=` hold for matches and for
/// values ordering after the pattern's literal text, `<`/`<=` only for
/// non-matching values ordering before it.
pub fn compare_with_wildcard(value: &ValueObject, pattern: &str, token: CompareToken) -> ValueObject {
    if let Some(e) = value.error() {
        return ValueObject::Error(e);
    }
    if !has_wildcard(pattern) {
        return compare_scalar_token(value, &ValueObject::string(pattern_literal(pattern)), token);
    }

    let matched = match value {
        ValueObject::String(s) => wildcard_match(pattern, s.as_str()),
        _ => false,
    };
    let literal = ValueObject::string(pattern_literal(pattern));
    let ordering = compare_scalars(value, &literal);

    let result = match token {
        CompareToken::Equals => matched,
        CompareToken::NotEqual => !matched,
        CompareToken::GreaterThan | CompareToken::GreaterThanOrEqual => {
            matched || ordering == Ok(Ordering::Greater)
        }
        CompareToken::LessThan | CompareToken::LessThanOrEqual => {
            !matched && ordering == Ok(Ordering::Less)
        }
    };
    ValueObject::Boolean(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    const ALL_TOKENS: [CompareToken; 6] = [
        CompareToken::Equals,
        CompareToken::NotEqual,
        CompareToken::GreaterThanOrEqual,
        CompareToken::GreaterThan,
        CompareToken::LessThanOrEqual,
        CompareToken::LessThan,
    ];

    fn results(a: &ValueObject, b: &ValueObject) -> Vec<ValueObject> {
        ALL_TOKENS.iter().map(|t| compare(a, b, *t)).collect()
    }

    fn bools(values: &[bool]) -> Vec<ValueObject> {
        values.iter().map(|b| ValueObject::Boolean(*b)).collect()
    }

    #[test]
    fn test_parse_prefix() {
        assert_eq!(CompareToken::parse_prefix(">=10"), (CompareToken::GreaterThanOrEqual, "10"));
        assert_eq!(CompareToken::parse_prefix("<>a*"), (CompareToken::NotEqual, "a*"));
        assert_eq!(CompareToken::parse_prefix("<5"), (CompareToken::LessThan, "5"));
        assert_eq!(CompareToken::parse_prefix("te?t"), (CompareToken::Equals, "te?t"));
        assert_eq!(CompareToken::from_str(">="), Some(CompareToken::GreaterThanOrEqual));
        assert_eq!(CompareToken::from_str("=="), None);
    }

    #[test]
    fn test_string_comparison() {
        let a = ValueObject::string("a");
        let zh = ValueObject::string("中文");
        assert_eq!(results(&a, &zh), bools(&[false, true, false, false, true, true]));

        let upper = ValueObject::string("ABC");
        let lower = ValueObject::string("abc");
        assert_eq!(compare(&upper, &lower, CompareToken::Equals), ValueObject::Boolean(true));

        // Code point order after lowercasing
        let accented = ValueObject::string("É");
        assert_eq!(compare_scalars(&accented, &ValueObject::string("f")), Ok(Ordering::Greater));
        assert_eq!(compare_scalars(&accented, &ValueObject::string("é")), Ok(Ordering::Equal));
    }

    #[test]
    fn test_cross_type_order() {
        let text = ValueObject::string("a");
        let one = ValueObject::Number(1.0);
        let yes = ValueObject::Boolean(true);

        assert_eq!(results(&text, &one), bools(&[false, true, true, true, false, false]));
        assert_eq!(results(&one, &text), bools(&[false, true, false, false, true, true]));
        assert_eq!(results(&one, &yes), bools(&[false, true, false, false, true, true]));
        assert!(text.is_less_than(&yes));
    }

    #[test]
    fn test_blank_coerces_to_other_type() {
        let blank = ValueObject::Null;
        assert_eq!(compare_scalars(&blank, &ValueObject::Number(0.0)), Ok(Ordering::Equal));
        assert_eq!(compare_scalars(&blank, &ValueObject::string("")), Ok(Ordering::Equal));
        assert_eq!(compare_scalars(&blank, &ValueObject::Boolean(false)), Ok(Ordering::Equal));
        assert_eq!(compare_scalars(&ValueObject::Number(-1.0), &blank), Ok(Ordering::Less));
    }

    #[test]
    fn test_errors_propagate_left_first() {
        let na = ValueObject::Error(CellError::Na);
        let div = ValueObject::Error(CellError::Div0);
        assert_eq!(compare(&na, &div, CompareToken::Equals), na);
        assert_eq!(compare(&ValueObject::Number(1.0), &div, CompareToken::LessThan), div);
    }

    #[test]
    fn test_compare_broadcasts() {
        let array = ValueObject::Array(crate::value::ArrayValue::parse_literal("{1;4;44}").unwrap());
        let result = compare(&array, &ValueObject::Number(4.0), CompareToken::GreaterThanOrEqual);
        assert_eq!(
            result,
            ValueObject::Array(crate::value::ArrayValue::parse_literal("{FALSE;TRUE;TRUE}").unwrap())
        );
    }

    #[test]
    fn test_wildcard_match() {
        assert!(wildcard_match("test*", "Test12"));
        assert!(wildcard_match("te?t", "TEXT"));
        assert!(!wildcard_match("te?t", "tet"));
        assert!(wildcard_match("*", ""));
        assert!(wildcard_match("a*b*c", "aXXbYYc"));
        assert!(!wildcard_match("a*b*c", "aXXbYY"));
        assert!(wildcard_match("what~?", "what?"));
        assert!(!wildcard_match("what~?", "whats"));
        assert!(wildcard_match("~*", "*"));
        assert!(!has_wildcard("100~*"));
        assert!(has_wildcard("a?"));
    }

    #[test]
    fn test_compare_with_wildcard() {
        let t = |s: &str, p: &str, token| compare_with_wildcard(&ValueObject::string(s), p, token);
        assert_eq!(t("test1", "test*", CompareToken::Equals), ValueObject::Boolean(true));
        assert_eq!(t("Ada", "test*", CompareToken::NotEqual), ValueObject::Boolean(true));
        assert_eq!(t("Univer", "test*", CompareToken::GreaterThan), ValueObject::Boolean(true));
        assert_eq!(t("Ada", "test*", CompareToken::LessThan), ValueObject::Boolean(true));
        assert_eq!(t("test1", "test*", CompareToken::LessThan), ValueObject::Boolean(false));
        // No wildcard: plain comparison against the unescaped text
        assert_eq!(t("a*", "a~*", CompareToken::Equals), ValueObject::Boolean(true));
        assert_eq!(
            compare_with_wildcard(&ValueObject::Number(1.0), "1*", CompareToken::Equals),
            ValueObject::Boolean(false)
        );
    }

    fn scalar() -> impl Strategy<Value = ValueObject> {
        prop_oneof![
            Just(ValueObject::Null),
            (-1.0e6..1.0e6f64).prop_map(ValueObject::Number),
            "[a-zA-Z0-9 ]{0,8}".prop_map(ValueObject::string),
            any::<bool>().prop_map(ValueObject::Boolean),
        ]
    }

    proptest! {
        #[test]
        fn prop_equals_is_negation_of_not_equal(a in scalar(), b in scalar()) {
            let eq = compare(&a, &b, CompareToken::Equals);
            let ne = compare(&a, &b, CompareToken::NotEqual);
            match (eq, ne) {
                (ValueObject::Boolean(x), ValueObject::Boolean(y)) => prop_assert_eq!(x, !y),
                other => prop_assert!(false, "unexpected {:?}", other),
            }
        }

        #[test]
        fn prop_ordering_is_antisymmetric(a in scalar(), b in scalar()) {
            let ab = compare_scalars(&a, &b).unwrap();
            let ba = compare_scalars(&b, &a).unwrap();
            prop_assert_eq!(ab, ba.reverse());
        }

        #[test]
        fn prop_cross_type_order(n in -1.0e6..1.0e6f64, s in "[a-z]{1,8}", b in any::<bool>()) {
            let n = ValueObject::Number(n);
            let s = ValueObject::string(s);
            let b = ValueObject::Boolean(b);
            prop_assert!(n.is_less_than(&s));
            prop_assert!(s.is_less_than(&b));
            prop_assert!(b.is_greater_than(&n));
        }
    }
}
