//! Statistical functions

use crate::compare::value_object_compare;
use crate::context::FunctionContext;
use crate::value::ValueObject;

/// AVERAGE function
///
/// Arrays contribute their numbers only; scalar arguments are coerced, so
/// `AVERAGE("x")` is `#VALUE!` while text inside a range is skipped.
pub fn fn_average(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    let mut sum = ValueObject::Number(0.0);
    let mut count = ValueObject::Number(0.0);

    for arg in args {
        match arg {
            ValueObject::Error(_) => return arg.clone(),
            ValueObject::Array(a) => {
                let array_sum = a.sum();
                if array_sum.is_error() {
                    return array_sum;
                }
                sum = sum.plus(&array_sum);
                count = count.plus(&a.count());
            }
            ValueObject::Null => {}
            scalar => {
                let n = match scalar.to_number() {
                    Ok(n) => n,
                    Err(e) => return ValueObject::Error(e),
                };
                sum = sum.plus(&ValueObject::Number(n));
                count = count.plus(&ValueObject::Number(1.0));
            }
        }
    }

    sum.divided(&count)
}

/// MAX function
pub fn fn_max(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    extreme(args, f64::NEG_INFINITY, |candidate, best| candidate.is_greater_than(best), |a| a.max())
}

/// MIN function
pub fn fn_min(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    extreme(args, f64::INFINITY, |candidate, best| candidate.is_less_than(best), |a| a.min())
}

fn extreme<B, R>(args: &[ValueObject], seed: f64, better: B, reduce: R) -> ValueObject
where
    B: Fn(&ValueObject, &ValueObject) -> bool,
    R: Fn(&crate::value::ArrayValue) -> ValueObject,
{
    let mut best = ValueObject::Number(seed);

    for arg in args {
        let candidate = match arg {
            ValueObject::Error(_) => return arg.clone(),
            ValueObject::Array(a) => match reduce(a) {
                ValueObject::Null => continue,
                ValueObject::Error(e) => return ValueObject::Error(e),
                reduced => reduced,
            },
            ValueObject::Null => continue,
            scalar => match scalar.to_number() {
                Ok(n) => ValueObject::Number(n),
                Err(e) => return ValueObject::Error(e),
            },
        };
        if better(&candidate, &best) {
            best = candidate;
        }
    }

    match best {
        ValueObject::Number(n) if n.is_infinite() => ValueObject::Number(0.0),
        other => other,
    }
}

/// COUNT function: numbers in ranges, and scalar arguments that read as numbers
pub fn fn_count(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    let mut count = 0.0;

    for arg in args {
        match arg {
            ValueObject::Array(a) => {
                if let ValueObject::Number(n) = a.count() {
                    count += n;
                }
            }
            ValueObject::Null | ValueObject::Error(_) => {}
            scalar => {
                if scalar.to_number().is_ok() {
                    count += 1.0;
                }
            }
        }
    }

    ValueObject::Number(count)
}

/// COUNTA function: non-blank values
pub fn fn_counta(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    let mut count = 0.0;

    for arg in args {
        match arg {
            ValueObject::Array(a) => {
                if let ValueObject::Number(n) = a.counta() {
                    count += n;
                }
            }
            ValueObject::Null => {}
            _ => count += 1.0,
        }
    }

    ValueObject::Number(count)
}

/// COUNTIF(range, criteria)
pub fn fn_countif(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    let mask = value_object_compare(&args[0], &args[1], None);
    match mask {
        ValueObject::Array(a) => {
            let hits = a.values().filter(|v| matches!(v, ValueObject::Boolean(true))).count();
            ValueObject::Number(hits as f64)
        }
        ValueObject::Boolean(hit) => ValueObject::Number(if hit { 1.0 } else { 0.0 }),
        other => other,
    }
}
