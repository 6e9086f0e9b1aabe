//! Operator executors
//!
//! Operators in a formula (`+`, `&`, `>=`, ...) are executed through these,
//! registered under the operator's name.

use crate::compare::{compare, CompareToken};
use crate::context::FunctionContext;
use crate::value::ValueObject;

pub fn fn_plus(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    args[0].plus(&args[1])
}

/// MINUS: subtraction, or negation with a single argument
pub fn fn_minus(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    match args {
        [value] => value.negate(),
        [left, right, ..] => left.minus(right),
        [] => ValueObject::Null,
    }
}

pub fn fn_multiply(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    args[0].multiply(&args[1])
}

pub fn fn_divided(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    args[0].divided(&args[1])
}

pub fn fn_power(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    args[0].power(&args[1])
}

/// CONCATENATE / `&`
pub fn fn_concatenate(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    let mut iter = args.iter();
    let Some(first) = iter.next() else {
        return ValueObject::string("");
    };
    iter.fold(first.clone(), |acc, next| acc.concatenate(next))
}

pub fn fn_equals(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    compare(&args[0], &args[1], CompareToken::Equals)
}

pub fn fn_not_equal(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    compare(&args[0], &args[1], CompareToken::NotEqual)
}

pub fn fn_greater_than(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    compare(&args[0], &args[1], CompareToken::GreaterThan)
}

pub fn fn_greater_than_or_equal(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    compare(&args[0], &args[1], CompareToken::GreaterThanOrEqual)
}

pub fn fn_less_than(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    compare(&args[0], &args[1], CompareToken::LessThan)
}

pub fn fn_less_than_or_equal(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    compare(&args[0], &args[1], CompareToken::LessThanOrEqual)
}

/// Executor name for an operator token
pub fn operator_function_name(token: &str) -> Option<&'static str> {
    let name = match token {
        "+" => "PLUS",
        "-" => "MINUS",
        "*" => "MULTIPLY",
        "/" => "DIVIDED",
        "^" => "POWER",
        "&" => "CONCATENATE",
        "=" => "EQUALS",
        "<>" => "NOT_EQUAL",
        ">" => "GREATER_THAN",
        ">=" => "GREATER_THAN_OR_EQUAL",
        "<" => "LESS_THAN",
        "<=" => "LESS_THAN_OR_EQUAL",
        _ => return None,
    };
    Some(name)
}
