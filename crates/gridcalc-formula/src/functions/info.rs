//! Information functions

use gridcalc_core::CellError;

use crate::context::FunctionContext;
use crate::value::ValueObject;

fn test_value<F>(value: &ValueObject, predicate: F) -> ValueObject
where
    F: Fn(&ValueObject) -> bool,
{
    value.map(|v| ValueObject::Boolean(predicate(v)))
}

/// ISBLANK(value)
pub fn fn_isblank(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    test_value(&args[0], ValueObject::is_null)
}

/// ISNUMBER(value)
pub fn fn_isnumber(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    test_value(&args[0], |v| matches!(v, ValueObject::Number(_)))
}

/// ISTEXT(value)
pub fn fn_istext(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    test_value(&args[0], |v| matches!(v, ValueObject::String(_)))
}

/// ISERROR(value)
pub fn fn_iserror(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    test_value(&args[0], ValueObject::is_error)
}

/// ISNA(value)
pub fn fn_isna(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    test_value(&args[0], |v| matches!(v, ValueObject::Error(CellError::Na)))
}

/// NA()
pub fn fn_na(_args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    ValueObject::Error(CellError::Na)
}
