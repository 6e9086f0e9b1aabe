//! Logical functions

use crate::context::FunctionContext;
use crate::value::ValueObject;

/// IF(condition, [value_if_true], [value_if_false])
///
/// An array condition picks element-wise from the branches.
pub fn fn_if(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    let if_true = args.get(1).cloned().unwrap_or(ValueObject::Number(0.0));
    let if_false = args.get(2).cloned().unwrap_or(ValueObject::Boolean(false));

    match &args[0] {
        ValueObject::Array(condition) if condition.single().is_none() => {
            let picked = condition.map(|c| match c.to_bool() {
                Ok(true) => pick_scalar(&if_true),
                Ok(false) => pick_scalar(&if_false),
                Err(e) => ValueObject::Error(e),
            });
            ValueObject::Array(picked)
        }
        condition => match condition.to_bool() {
            Ok(true) => if_true,
            Ok(false) => if_false,
            Err(e) => ValueObject::Error(e),
        },
    }
}

// Branches of an element-wise IF contribute one scalar per element
fn pick_scalar(branch: &ValueObject) -> ValueObject {
    match branch {
        ValueObject::Array(a) => a.single().cloned().unwrap_or_else(|| branch.clone()),
        other => other.clone(),
    }
}

/// IFERROR(value, value_if_error)
pub fn fn_iferror(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    let fallback = &args[1];
    match &args[0] {
        ValueObject::Error(_) => fallback.clone(),
        ValueObject::Array(a) => ValueObject::Array(a.map(|v| {
            if v.is_error() {
                pick_scalar(fallback)
            } else {
                v.clone()
            }
        })),
        other => other.clone(),
    }
}

/// NOT(logical)
pub fn fn_not(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    args[0].map(|v| match v.to_bool() {
        Ok(b) => ValueObject::Boolean(!b),
        Err(e) => ValueObject::Error(e),
    })
}
