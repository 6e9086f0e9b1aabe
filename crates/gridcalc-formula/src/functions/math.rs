//! Math functions

use gridcalc_core::CellError;

use super::{first_error_arg, map_numeric};
use crate::context::FunctionContext;
use crate::value::ValueObject;

/// SUM function
pub fn fn_sum(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    let mut sum = ValueObject::Number(0.0);

    for arg in args {
        let term = match arg {
            ValueObject::Array(a) => a.sum(),
            ValueObject::Null => continue,
            other => other.clone(),
        };
        sum = sum.plus(&term);
        if sum.is_error() {
            return sum;
        }
    }

    sum
}

/// ABS(number)
pub fn fn_abs(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    map_numeric(&args[0], |n| Ok(n.abs()))
}

/// SQRT(number)
pub fn fn_sqrt(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    map_numeric(&args[0], |n| if n < 0.0 { Err(CellError::Num) } else { Ok(n.sqrt()) })
}

/// ACOSH(number); `#NUM!` below 1
pub fn fn_acosh(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    map_numeric(&args[0], |n| if n < 1.0 { Err(CellError::Num) } else { Ok(n.acosh()) })
}

/// ATANH(number); `#NUM!` outside (-1, 1)
pub fn fn_atanh(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    map_numeric(&args[0], |n| {
        if n <= -1.0 || n >= 1.0 {
            Err(CellError::Num)
        } else {
            Ok(n.atanh())
        }
    })
}

/// RAND() - Returns a random number between 0 and 1
pub fn fn_rand(args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
    use rand::Rng;

    if let Some(e) = first_error_arg(args) {
        return ValueObject::Error(e);
    }
    let mut rng = rand::thread_rng();
    ValueObject::Number(rng.gen::<f64>())
}
