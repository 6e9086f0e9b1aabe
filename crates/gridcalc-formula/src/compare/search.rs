//! Searching vectors of value objects

use std::cmp::Ordering;

use super::{compare_scalars, compare_with_wildcard, CompareToken};
use crate::value::ValueObject;

/// What a binary search looks for in sorted data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinarySearchType {
    /// Last position holding a value <= the target (ascending data)
    Min,
    /// Last position holding a value >= the target (descending data)
    Max,
}

/// What a linear search looks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSearchType {
    /// Exact match
    Normal,
    /// Largest value <= the target
    Min,
    /// Smallest value >= the target
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeClass {
    Number,
    String,
    Boolean,
}

fn type_class(value: &ValueObject) -> Option<TypeClass> {
    match value {
        ValueObject::Number(_) => Some(TypeClass::Number),
        ValueObject::String(_) => Some(TypeClass::String),
        ValueObject::Boolean(_) => Some(TypeClass::Boolean),
        _ => None,
    }
}

/// Binary search that tolerates blanks, errors and mixed types
///
/// Elements whose type differs from the target's are stepped over: each probe
/// uses the nearest comparable element, looking forward from the midpoint
/// first and then backward. A blank target searches for 0.
pub fn binary_search(vector: &[ValueObject], value: &ValueObject, search_type: BinarySearchType) -> Option<usize> {
    let target = match value {
        ValueObject::Null => ValueObject::Number(0.0),
        other => other.clone(),
    };
    let class = type_class(&target)?;
    let comparable = |v: &ValueObject| type_class(v) == Some(class);

    let mut lo = 0;
    let mut hi = vector.len();
    let mut found = None;

    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let probe = (mid..hi)
            .find(|&i| comparable(&vector[i]))
            .or_else(|| (lo..mid).rev().find(|&i| comparable(&vector[i])));
        let Some(probe) = probe else {
            break;
        };

        let Ok(ordering) = compare_scalars(&vector[probe], &target) else {
            break;
        };
        let keep = match search_type {
            BinarySearchType::Min => ordering != Ordering::Greater,
            BinarySearchType::Max => ordering != Ordering::Less,
        };
        if keep {
            found = Some(probe);
            lo = probe + 1;
        } else {
            hi = probe;
        }
    }

    found
}

/// Linear search in either direction
///
/// Blanks, errors and values of another type than the target are skipped.
/// For [`OrderSearchType::Min`] and [`OrderSearchType::Max`] ties keep the
/// first element met in scan order. With `wildcard`, text targets are
/// matched as wildcard patterns in [`OrderSearchType::Normal`] mode.
pub fn order_search(
    vector: &[ValueObject],
    value: &ValueObject,
    search_type: OrderSearchType,
    reverse: bool,
    wildcard: bool,
) -> Option<usize> {
    let class = type_class(value)?;
    let indices: Box<dyn Iterator<Item = usize>> = if reverse {
        Box::new((0..vector.len()).rev())
    } else {
        Box::new(0..vector.len())
    };

    let mut best: Option<usize> = None;
    for i in indices {
        let element = &vector[i];
        if type_class(element) != Some(class) {
            continue;
        }

        if search_type == OrderSearchType::Normal {
            let hit = match (wildcard, value) {
                (true, ValueObject::String(pattern)) => {
                    compare_with_wildcard(element, pattern.as_str(), CompareToken::Equals)
                        == ValueObject::Boolean(true)
                }
                _ => compare_scalars(element, value) == Ok(Ordering::Equal),
            };
            if hit {
                return Some(i);
            }
            continue;
        }

        let Ok(ordering) = compare_scalars(element, value) else {
            continue;
        };
        if ordering == Ordering::Equal {
            return Some(i);
        }
        let candidate = match search_type {
            OrderSearchType::Min => ordering == Ordering::Less,
            OrderSearchType::Max => ordering == Ordering::Greater,
            OrderSearchType::Normal => false,
        };
        if !candidate {
            continue;
        }
        let better = match best {
            None => true,
            Some(b) => {
                let against = compare_scalars(element, &vector[b]);
                match search_type {
                    OrderSearchType::Min => against == Ok(Ordering::Greater),
                    _ => against == Ok(Ordering::Less),
                }
            }
        };
        if better {
            best = Some(i);
        }
    }

    best
}
