//! Lookup and reference functions

use std::cmp::Ordering;
use std::mem::discriminant;

use gridcalc_core::CellError;

use super::{to_i64_trunc, unwrap_single};
use crate::compare::{
    binary_search, compare, compare_scalars, order_search, value_object_compare, BinarySearchType, CompareToken,
    OrderSearchType,
};
use crate::context::FunctionContext;
use crate::value::{ArrayValue, ReferenceValue, ValueObject};

fn vector_values(array: &ArrayValue) -> Vec<ValueObject> {
    array.values().cloned().collect()
}

/// Run `f` for a lookup value, or for each of its elements
fn map_lookup_value<F>(value: &ValueObject, f: F) -> ValueObject
where
    F: Fn(&ValueObject) -> ValueObject,
{
    match unwrap_single(value) {
        ValueObject::Array(a) => ValueObject::Array(a.map(|v| if v.is_error() { v.clone() } else { f(v) })),
        scalar => f(scalar),
    }
}

fn position_result(position: Option<usize>) -> ValueObject {
    match position {
        Some(i) => ValueObject::Number((i + 1) as f64),
        None => ValueObject::Error(CellError::Na),
    }
}

/// Position of the first (or last) `TRUE` of a mask along the vector axis
fn mask_position(mask: &ValueObject, last: bool) -> Option<usize> {
    let mask = match mask {
        ValueObject::Array(a) => a,
        ValueObject::Boolean(true) => return Some(0),
        _ => return None,
    };
    let (row, column) = if last {
        mask.last_true_position()?
    } else {
        mask.first_true_position()?
    };
    Some(mask.vector_index(row, column))
}

/// LOOKUP(lookup_value, lookup_vector, [result_vector])
/// LOOKUP(lookup_value, array)
///
/// Approximate match on ascending data: the last value <= the target of
/// the same type is found. A result vector must have the lookup vector's
/// length; the function node stretches result references beforehand.
pub fn fn_lookup(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    let lookup_value = &args[0];
    if lookup_value.is_error() {
        return lookup_value.clone();
    }

    let lookup = match &args[1] {
        ValueObject::Error(_) => return ValueObject::Error(CellError::Ref),
        ValueObject::Array(a) => a,
        _ => return ValueObject::Error(CellError::Value),
    };

    let result = args.get(2);
    if let Some(ValueObject::Error(e)) = result {
        return ValueObject::Error(*e);
    }

    if lookup.is_vector() {
        let result = match result {
            None => lookup.clone(),
            Some(ValueObject::Array(r)) if r.is_vector() => r.clone(),
            Some(_) => return ValueObject::Error(CellError::Ref),
        };
        if result.vector_len() != lookup.vector_len() {
            return ValueObject::Error(CellError::Ref);
        }
        let search = vector_values(lookup);
        return map_lookup_value(lookup_value, |v| lookup_in_vector(v, &search, &result));
    }

    // Array form: search the first row or column, return from the last
    if lookup.is_empty() {
        return ValueObject::Error(CellError::Na);
    }
    let rows = lookup.row_count();
    let columns = lookup.column_count();
    let (search, result) = if columns > rows {
        (lookup.slice(Some(0..1), None), lookup.slice(Some(rows - 1..rows), None))
    } else {
        (lookup.slice(None, Some(0..1)), lookup.slice(None, Some(columns - 1..columns)))
    };
    let (Some(search), Some(result)) = (search, result) else {
        return ValueObject::Error(CellError::Value);
    };
    let search = vector_values(&search);
    map_lookup_value(lookup_value, |v| lookup_in_vector(v, &search, &result))
}

fn lookup_in_vector(value: &ValueObject, search: &[ValueObject], result: &ArrayValue) -> ValueObject {
    match binary_search(search, value, BinarySearchType::Min) {
        Some(i) => result.vector_get(i).cloned().unwrap_or(ValueObject::Null),
        None => ValueObject::Error(CellError::Na),
    }
}

/// MATCH(lookup_value, lookup_array, [match_type])
///
/// match_type 1 (default): largest value <= target; 0: exact, with
/// wildcards for text; -1: smallest value >= target.
pub fn fn_match(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    let lookup_value = &args[0];
    if lookup_value.is_error() {
        return lookup_value.clone();
    }

    let lookup = match &args[1] {
        ValueObject::Error(_) => return ValueObject::Error(CellError::Ref),
        ValueObject::Array(a) => a,
        _ => return ValueObject::Error(CellError::Value),
    };
    if !lookup.is_vector() {
        return ValueObject::Error(CellError::Na);
    }

    let search_type = match args.get(2) {
        None | Some(ValueObject::Null) => OrderSearchType::Min,
        Some(ValueObject::Error(_)) => return ValueObject::Error(CellError::Na),
        Some(v) => match v.to_number() {
            Ok(n) if n > 0.0 => OrderSearchType::Min,
            Ok(n) if n < 0.0 => OrderSearchType::Max,
            Ok(_) => OrderSearchType::Normal,
            Err(_) => return ValueObject::Error(CellError::Value),
        },
    };

    let values = vector_values(lookup);
    map_lookup_value(lookup_value, |v| {
        let wildcard = search_type == OrderSearchType::Normal;
        position_result(order_search(&values, v, search_type, false, wildcard))
    })
}

/// XMATCH(lookup_value, lookup_array, [match_mode], [search_mode])
///
/// match_mode: 0 exact (default), -1 exact or next smaller, 1 exact or next
/// larger, 2 wildcard. search_mode: 1 first to last (default), -1 last to
/// first, 2 binary on ascending data, -2 binary on descending data. Binary
/// search modes are ignored in wildcard mode.
pub fn fn_xmatch(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    let lookup_value = &args[0];
    if lookup_value.is_error() {
        return lookup_value.clone();
    }

    let lookup = match &args[1] {
        ValueObject::Error(_) => return ValueObject::Error(CellError::Ref),
        ValueObject::Array(a) => a,
        _ => return ValueObject::Error(CellError::Value),
    };
    if !lookup.is_vector() {
        return ValueObject::Error(CellError::Value);
    }

    let match_mode = match mode_arg(args.get(2), 0, &[0, -1, 1, 2]) {
        Ok(mode) => mode,
        Err(e) => return ValueObject::Error(e),
    };
    let search_mode = match mode_arg(args.get(3), 1, &[1, -1, 2, -2]) {
        Ok(mode) => mode,
        Err(e) => return ValueObject::Error(e),
    };

    let values = vector_values(lookup);
    map_lookup_value(lookup_value, |v| {
        position_result(xmatch_position(v, lookup, &values, match_mode, search_mode))
    })
}

fn mode_arg(arg: Option<&ValueObject>, default: i64, allowed: &[i64]) -> Result<i64, CellError> {
    let mode = match arg {
        None | Some(ValueObject::Null) => default,
        Some(ValueObject::Error(_)) => return Err(CellError::Na),
        Some(v) => to_i64_trunc(v).map_err(|_| CellError::Value)?,
    };
    if allowed.contains(&mode) {
        Ok(mode)
    } else {
        Err(CellError::Value)
    }
}

fn xmatch_position(
    value: &ValueObject,
    lookup: &ArrayValue,
    values: &[ValueObject],
    match_mode: i64,
    search_mode: i64,
) -> Option<usize> {
    let reverse = search_mode == -1;

    if (search_mode == 2 || search_mode == -2) && match_mode != 2 {
        return binary_position(value, values, match_mode, search_mode == 2);
    }

    match match_mode {
        2 => {
            let mask = value_object_compare(&ValueObject::Array(lookup.clone()), value, Some(CompareToken::Equals));
            mask_position(&mask, reverse)
        }
        -1 => order_search(values, value, OrderSearchType::Min, reverse, false),
        1 => order_search(values, value, OrderSearchType::Max, reverse, false),
        _ => {
            let mask = compare(&ValueObject::Array(lookup.clone()), value, CompareToken::Equals);
            mask_position(&mask, reverse)
        }
    }
}

/// Binary search honouring the match mode
///
/// On ascending data the search lands on the last value <= the target; on
/// descending data on the last value >= the target. The neighbouring
/// comparable element supplies the "next larger" (ascending) or "next
/// smaller" (descending) answer.
///
/// Only elements of the lookup value's type count as that neighbour. A blank
/// lookup value searches as the number 0, so it moves on to numbers too.
fn binary_position(value: &ValueObject, values: &[ValueObject], match_mode: i64, ascending: bool) -> Option<usize> {
    let search_type = if ascending {
        BinarySearchType::Min
    } else {
        BinarySearchType::Max
    };
    let found = binary_search(values, value, search_type);

    let is_exact = |i: usize| compare_scalars(&values[i], value) == Ok(Ordering::Equal);
    let class = match value {
        ValueObject::Null => discriminant(&ValueObject::Number(0.0)),
        other => discriminant(other),
    };
    let next_comparable = |start: usize| (start..values.len()).find(|&i| discriminant(&values[i]) == class);
    let neighbour = || match found {
        Some(i) if is_exact(i) => Some(i),
        Some(i) => next_comparable(i + 1),
        None => next_comparable(0),
    };

    match (match_mode, ascending) {
        (0, _) => found.filter(|&i| is_exact(i)),
        (-1, true) | (1, false) => found,
        _ => neighbour(),
    }
}

/// INDEX(array, row_num, [column_num])
///
/// A zero row (or column) selects the whole column (or row).
pub fn fn_index(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    if let Some(e) = super::first_error_arg(args) {
        return ValueObject::Error(e);
    }

    let array = match &args[0] {
        ValueObject::Array(a) => a.clone(),
        scalar => ArrayValue::from_scalar(scalar.clone()),
    };
    if array.is_empty() {
        return ValueObject::Error(CellError::Ref);
    }

    let first = match to_i64_trunc(&args[1]) {
        Ok(n) => n,
        Err(_) => return ValueObject::Error(CellError::Value),
    };
    let second = match args.get(2) {
        Some(v) => match to_i64_trunc(v) {
            Ok(n) => Some(n),
            Err(_) => return ValueObject::Error(CellError::Value),
        },
        None => None,
    };

    // A single row indexed with one number is indexed by column
    let (row_num, col_num) = match second {
        None if array.row_count() == 1 => (1, first),
        None => (first, 1),
        Some(col) => (first, col),
    };
    if row_num < 0 || col_num < 0 {
        return ValueObject::Error(CellError::Value);
    }
    if row_num as usize > array.row_count() || col_num as usize > array.column_count() {
        return ValueObject::Error(CellError::Ref);
    }

    let rows = (row_num > 0).then(|| row_num as usize - 1..row_num as usize);
    let columns = (col_num > 0).then(|| col_num as usize - 1..col_num as usize);
    match array.slice(rows, columns) {
        Some(block) => match block.single() {
            Some(v) => v.clone(),
            None => ValueObject::Array(block),
        },
        None => ValueObject::Error(CellError::Ref),
    }
}

/// ROWS(array) - Returns the number of rows in a reference or array
pub fn fn_rows(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    match &args[0] {
        ValueObject::Error(e) => ValueObject::Error(*e),
        ValueObject::Array(a) => ValueObject::Number(a.row_count() as f64),
        // Single value = 1 row
        _ => ValueObject::Number(1.0),
    }
}

/// COLUMNS(array) - Returns the number of columns in a reference or array
pub fn fn_columns(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    match &args[0] {
        ValueObject::Error(e) => ValueObject::Error(*e),
        ValueObject::Array(a) => ValueObject::Number(a.column_count() as f64),
        // Single value = 1 column
        _ => ValueObject::Number(1.0),
    }
}

/// ROW([reference]) - Returns the row number of a reference
///
/// - ROW() returns the row of the calling cell (1-indexed)
/// - ROW(range) returns a column of the range's row numbers
pub fn fn_row(args: &[ValueObject], ctx: &FunctionContext) -> ValueObject {
    let Some(arg) = args.first() else {
        return ValueObject::Number((ctx.row + 1) as f64);
    };
    match arg {
        ValueObject::Error(e) => ValueObject::Error(*e),
        ValueObject::Array(a) => match a.origin() {
            Some(origin) => {
                let numbers = (0..a.row_count())
                    .map(|i| ValueObject::Number((origin.row as usize + i + 1) as f64))
                    .collect();
                collapse(ArrayValue::from_column(numbers))
            }
            None => ValueObject::Error(CellError::Value),
        },
        _ => ValueObject::Error(CellError::Value),
    }
}

/// COLUMN([reference]) - Returns the column number of a reference
///
/// - COLUMN() returns the column of the calling cell (1-indexed)
/// - COLUMN(range) returns a row of the range's column numbers
pub fn fn_column(args: &[ValueObject], ctx: &FunctionContext) -> ValueObject {
    let Some(arg) = args.first() else {
        return ValueObject::Number((ctx.column + 1) as f64);
    };
    match arg {
        ValueObject::Error(e) => ValueObject::Error(*e),
        ValueObject::Array(a) => match a.origin() {
            Some(origin) => {
                let numbers = (0..a.column_count())
                    .map(|i| ValueObject::Number((origin.column as usize + i + 1) as f64))
                    .collect();
                collapse(ArrayValue::from_row(numbers))
            }
            None => ValueObject::Error(CellError::Value),
        },
        _ => ValueObject::Error(CellError::Value),
    }
}

fn collapse(array: ArrayValue) -> ValueObject {
    match array.single() {
        Some(v) => v.clone(),
        None => ValueObject::Array(array),
    }
}

/// INDIRECT(ref_text, [a1])
///
/// Returns a reference on the calling sheet (or the sheet named in the
/// text). Only A1-style text is understood; `a1 = FALSE` yields `#REF!`.
pub fn fn_indirect(args: &[ValueObject], ctx: &FunctionContext) -> ValueObject {
    if let Some(e) = super::first_error_arg(args) {
        return ValueObject::Error(e);
    }
    if let Some(a1) = args.get(1) {
        match a1.to_bool() {
            Ok(true) => {}
            Ok(false) => return ValueObject::Error(CellError::Ref),
            Err(e) => return ValueObject::Error(e),
        }
    }

    let text = match unwrap_single(&args[0]).to_text() {
        Ok(text) => text,
        Err(e) => return ValueObject::Error(e),
    };
    match ReferenceValue::parse(&text) {
        Ok(reference) => ValueObject::Reference(reference.with_location(&ctx.unit_id, &ctx.sheet_id)),
        Err(_) => {
            log::warn!("INDIRECT could not parse reference text {:?}", text);
            ValueObject::Error(CellError::Ref)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ArrayOrigin;
    use pretty_assertions::assert_eq;

    fn arr(literal: &str) -> ArrayValue {
        ArrayValue::parse_literal(literal).unwrap()
    }

    fn ctx() -> FunctionContext {
        FunctionContext::simple()
    }

    fn num(n: f64) -> ValueObject {
        ValueObject::Number(n)
    }

    fn text(s: &str) -> ValueObject {
        ValueObject::string(s)
    }

    fn table() -> ArrayValue {
        arr("{
            1, \"First\", 100, 89;
            2, \"Second\", 68, 66;
            3, \"Third\", 100, 75;
            4, \"Fourth\", 93, 70;
            5, \"Fifth\", 87, 69;
            6, \"Sixth\", 96, 82
        }")
    }

    fn column(array: &ArrayValue, index: usize) -> ValueObject {
        ValueObject::Array(array.slice(None, Some(index..index + 1)).unwrap())
    }

    #[test]
    fn test_lookup_vector() {
        let lookup = ValueObject::Array(arr("{1;2;3;4;5}"));
        let result = ValueObject::Array(arr("{\"a\";\"b\";\"c\";\"d\";\"e\"}"));

        assert_eq!(fn_lookup(&[num(4.0), lookup.clone(), result.clone()], &ctx()), text("d"));
        assert_eq!(fn_lookup(&[num(4.5), lookup.clone(), result.clone()], &ctx()), text("d"));
        assert_eq!(fn_lookup(&[num(100.0), lookup.clone(), result.clone()], &ctx()), text("e"));
        assert_eq!(
            fn_lookup(&[num(0.0), lookup.clone(), result.clone()], &ctx()),
            ValueObject::Error(CellError::Na)
        );
        assert_eq!(fn_lookup(&[num(3.0), lookup.clone()], &ctx()), num(3.0));

        // Array-valued lookup value maps element-wise
        let many = ValueObject::Array(arr("{2;9}"));
        assert_eq!(
            fn_lookup(&[many, lookup, result], &ctx()),
            ValueObject::Array(arr("{\"b\";\"e\"}"))
        );
    }

    #[test]
    fn test_lookup_errors() {
        let lookup = ValueObject::Array(arr("{1;2;3}"));
        assert_eq!(
            fn_lookup(&[ValueObject::Error(CellError::Name), lookup.clone()], &ctx()),
            ValueObject::Error(CellError::Name)
        );
        assert_eq!(
            fn_lookup(&[num(1.0), ValueObject::Error(CellError::Na)], &ctx()),
            ValueObject::Error(CellError::Ref)
        );
        assert_eq!(fn_lookup(&[num(1.0), num(1.0)], &ctx()), ValueObject::Error(CellError::Value));

        // Result vector of another length, or not a vector at all
        let short = ValueObject::Array(arr("{\"a\";\"b\"}"));
        assert_eq!(fn_lookup(&[num(1.0), lookup.clone(), short], &ctx()), ValueObject::Error(CellError::Ref));
        let block = ValueObject::Array(arr("{1,2;3,4;5,6}"));
        assert_eq!(fn_lookup(&[num(1.0), lookup, block], &ctx()), ValueObject::Error(CellError::Ref));
    }

    #[test]
    fn test_lookup_array_form() {
        // Taller than wide: first column searched, last column returned
        let tall = ValueObject::Array(arr("{1,\"x\",10;2,\"y\",20;3,\"z\",30}"));
        assert_eq!(fn_lookup(&[num(2.0), tall], &ctx()), num(20.0));

        // Wider than tall: first row searched, last row returned
        let wide = ValueObject::Array(arr("{1,2,3;\"a\",\"b\",\"c\"}"));
        assert_eq!(fn_lookup(&[num(3.0), wide], &ctx()), text("c"));
    }

    #[test]
    fn test_lookup_empty_array() {
        let empty = ValueObject::Array(arr("{}"));
        assert_eq!(fn_lookup(&[num(1.0), empty], &ctx()), ValueObject::Error(CellError::Na));
        assert_eq!(
            fn_lookup(&[num(1.0), ValueObject::Array(ArrayValue::empty())], &ctx()),
            ValueObject::Error(CellError::Na)
        );
    }

    #[test]
    fn test_lookup_skips_other_types() {
        let lookup = ValueObject::Array(arr("{1;\"x\";3;TRUE;5}"));
        assert_eq!(fn_lookup(&[num(4.0), lookup.clone()], &ctx()), num(3.0));
        assert_eq!(fn_lookup(&[text("y"), lookup], &ctx()), text("x"));
    }

    #[test]
    fn test_match() {
        let names = column(&table(), 1);
        assert_eq!(fn_match(&[text("third"), names.clone(), num(0.0)], &ctx()), num(3.0));
        assert_eq!(fn_match(&[text("F*th"), names.clone(), num(0.0)], &ctx()), num(4.0));
        assert_eq!(
            fn_match(&[text("Zero"), names.clone(), num(0.0)], &ctx()),
            ValueObject::Error(CellError::Na)
        );

        let sorted = ValueObject::Array(arr("{10,20,30,40}"));
        assert_eq!(fn_match(&[num(25.0), sorted.clone()], &ctx()), num(2.0));
        assert_eq!(fn_match(&[num(5.0), sorted.clone()], &ctx()), ValueObject::Error(CellError::Na));

        let descending = ValueObject::Array(arr("{40,30,20,10}"));
        assert_eq!(fn_match(&[num(25.0), descending, num(-1.0)], &ctx()), num(2.0));

        assert_eq!(
            fn_match(&[num(1.0), sorted.clone(), ValueObject::Error(CellError::Div0)], &ctx()),
            ValueObject::Error(CellError::Na)
        );
        assert_eq!(
            fn_match(&[num(1.0), sorted, text("abc")], &ctx()),
            ValueObject::Error(CellError::Value)
        );
        assert_eq!(
            fn_match(&[num(1.0), ValueObject::Array(table())], &ctx()),
            ValueObject::Error(CellError::Na)
        );
    }

    #[test]
    fn test_xmatch_exact() {
        let names = column(&table(), 1);
        assert_eq!(fn_xmatch(&[text("Second"), names.clone()], &ctx()), num(2.0));

        let across = ValueObject::Array(table().transpose().slice(Some(1..2), None).unwrap());
        assert_eq!(fn_xmatch(&[text("Second"), across], &ctx()), num(2.0));

        assert_eq!(fn_xmatch(&[num(5.0), column(&table(), 0)], &ctx()), num(5.0));

        let wanted = ValueObject::Array(arr("{\"Sixth\";\"First\";\"Fourth\"}"));
        assert_eq!(fn_xmatch(&[wanted, names], &ctx()), ValueObject::Array(arr("{6;1;4}")));
    }

    #[test]
    fn test_xmatch_wildcard_and_approximate() {
        let names = column(&table(), 1);
        assert_eq!(fn_xmatch(&[text("s*"), names.clone(), num(2.0)], &ctx()), num(2.0));
        assert_eq!(fn_xmatch(&[text("???th"), names.clone(), num(2.0)], &ctx()), num(5.0));
        assert_eq!(fn_xmatch(&[text("???th"), names.clone(), num(2.0), num(-1.0)], &ctx()), num(6.0));
        // Binary search modes are ignored for wildcards
        assert_eq!(fn_xmatch(&[text("???th"), names, num(2.0), num(2.0)], &ctx()), num(5.0));

        let steps = ValueObject::Array(arr("{0;101;301;1000}"));
        assert_eq!(fn_xmatch(&[num(110.0), steps.clone(), num(-1.0)], &ctx()), num(2.0));
        assert_eq!(fn_xmatch(&[num(110.0), steps, num(1.0)], &ctx()), num(3.0));
    }

    #[test]
    fn test_xmatch_binary() {
        let sorted = ValueObject::Array(arr("{0;101;301;1000}"));
        assert_eq!(fn_xmatch(&[num(301.0), sorted.clone(), num(0.0), num(2.0)], &ctx()), num(3.0));
        assert_eq!(fn_xmatch(&[num(110.0), sorted.clone(), num(-1.0), num(2.0)], &ctx()), num(2.0));
        assert_eq!(fn_xmatch(&[num(110.0), sorted.clone(), num(1.0), num(2.0)], &ctx()), num(3.0));
        assert_eq!(
            fn_xmatch(&[num(110.0), sorted, num(0.0), num(2.0)], &ctx()),
            ValueObject::Error(CellError::Na)
        );

        // A blank target searches as 0 and never stops on blank elements
        let gapped = ValueObject::Array(arr("{5;;101}"));
        assert_eq!(fn_xmatch(&[ValueObject::Null, gapped.clone(), num(1.0), num(2.0)], &ctx()), num(1.0));
        assert_eq!(
            fn_xmatch(&[ValueObject::Null, gapped, num(0.0), num(2.0)], &ctx()),
            ValueObject::Error(CellError::Na)
        );
        let with_zero = ValueObject::Array(arr("{0;5}"));
        assert_eq!(fn_xmatch(&[ValueObject::Null, with_zero, num(0.0), num(2.0)], &ctx()), num(1.0));

        let descending = ValueObject::Array(arr("{1000;301;101;0}"));
        assert_eq!(fn_xmatch(&[num(110.0), descending.clone(), num(1.0), num(-2.0)], &ctx()), num(2.0));
        assert_eq!(fn_xmatch(&[num(110.0), descending, num(-1.0), num(-2.0)], &ctx()), num(3.0));

        let unsorted = ValueObject::Array(arr("{701;101;401;901;501;1000;601;0;201;301;801}"));
        assert_eq!(
            fn_xmatch(&[num(660.0), unsorted.clone(), num(0.0), num(2.0)], &ctx()),
            ValueObject::Error(CellError::Na)
        );
        assert_eq!(
            fn_xmatch(&[num(660.0), unsorted, num(0.0), num(-2.0)], &ctx()),
            ValueObject::Error(CellError::Na)
        );
    }

    #[test]
    fn test_xmatch_argument_errors() {
        let names = column(&table(), 1);
        assert_eq!(
            fn_xmatch(&[text("a"), ValueObject::Array(table())], &ctx()),
            ValueObject::Error(CellError::Value)
        );
        assert_eq!(
            fn_xmatch(&[text("a"), names.clone(), num(3.0)], &ctx()),
            ValueObject::Error(CellError::Value)
        );
        assert_eq!(
            fn_xmatch(&[text("a"), names.clone(), num(0.0), num(0.0)], &ctx()),
            ValueObject::Error(CellError::Value)
        );
        assert_eq!(
            fn_xmatch(&[text("a"), names, ValueObject::Error(CellError::Ref)], &ctx()),
            ValueObject::Error(CellError::Na)
        );
    }

    #[test]
    fn test_index() {
        let grid = ValueObject::Array(arr("{1,2,3;4,5,6}"));
        assert_eq!(fn_index(&[grid.clone(), num(2.0), num(3.0)], &ctx()), num(6.0));
        assert_eq!(fn_index(&[grid.clone(), num(0.0), num(2.0)], &ctx()), ValueObject::Array(arr("{2;5}")));
        assert_eq!(fn_index(&[grid.clone(), num(2.0), num(0.0)], &ctx()), ValueObject::Array(arr("{4,5,6}")));
        assert_eq!(fn_index(&[grid.clone(), num(3.0), num(1.0)], &ctx()), ValueObject::Error(CellError::Ref));
        assert_eq!(fn_index(&[grid, num(-1.0), num(1.0)], &ctx()), ValueObject::Error(CellError::Value));

        let row = ValueObject::Array(arr("{7,8,9}"));
        assert_eq!(fn_index(&[row, num(2.0)], &ctx()), num(8.0));
    }

    #[test]
    fn test_row_and_column() {
        let mut ctx = ctx();
        ctx.row = 4;
        ctx.column = 2;
        assert_eq!(fn_row(&[], &ctx), num(5.0));
        assert_eq!(fn_column(&[], &ctx), num(3.0));

        let origin = ArrayOrigin {
            unit_id: "book".into(),
            sheet_id: "s1".into(),
            row: 9,
            column: 1,
        };
        let block = ValueObject::Array(arr("{1,2;3,4}").with_origin(origin));
        assert_eq!(fn_row(&[block.clone()], &ctx), ValueObject::Array(arr("{10;11}")));
        assert_eq!(fn_column(&[block], &ctx), ValueObject::Array(arr("{2,3}")));
        assert_eq!(fn_row(&[num(1.0)], &ctx), ValueObject::Error(CellError::Value));

        assert_eq!(fn_rows(&[ValueObject::Array(arr("{1;2;3}"))], &ctx), num(3.0));
        assert_eq!(fn_columns(&[num(1.0)], &ctx), num(1.0));
    }

    #[test]
    fn test_indirect() {
        let mut ctx = ctx();
        ctx.unit_id = "book".into();
        ctx.sheet_id = "s1".into();

        let ValueObject::Reference(reference) = fn_indirect(&[text("B2:C3")], &ctx) else {
            panic!("expected reference");
        };
        assert_eq!(reference.sheet_id(), "s1");
        assert_eq!(reference.row_count(), 2);

        assert_eq!(fn_indirect(&[text("not a ref")], &ctx), ValueObject::Error(CellError::Ref));
        assert_eq!(
            fn_indirect(&[text("A1"), ValueObject::Boolean(false)], &ctx),
            ValueObject::Error(CellError::Ref)
        );
    }
}
