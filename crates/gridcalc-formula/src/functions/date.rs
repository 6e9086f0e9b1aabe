//! Date functions
//!
//! Dates are serial numbers: days since a base date. The 1900 date system
//! keeps the historical 1900 leap-year bug, so serial 60 is the fictional
//! 1900-02-29 and every later serial is one day ahead of the calendar. The
//! 1904 date system counts from 1904-01-01 as serial 0.

use chrono::{Datelike, Duration, Local, NaiveDate, Timelike};
use gridcalc_core::CellError;

use super::{first_error_arg, to_i64_trunc};
use crate::context::FunctionContext;
use crate::value::ValueObject;

const LEAP_BUG_SERIAL: i64 = 60;

fn base_1900() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1899, 12, 31)
}

fn base_1904() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1904, 1, 1)
}

/// Serial number of a calendar date
fn serial_from_date(date: NaiveDate, date_1904: bool) -> Option<i64> {
    if date_1904 {
        return Some((date - base_1904()?).num_days());
    }
    let days = (date - base_1900()?).num_days();
    // Dates from 1900-03-01 on are shifted by the fictional leap day
    Some(if days >= LEAP_BUG_SERIAL { days + 1 } else { days })
}

/// Year, month and day of a serial number
fn parts_from_serial(serial: i64, date_1904: bool) -> Option<(i32, u32, u32)> {
    if serial < 0 {
        return None;
    }
    let date = if date_1904 {
        base_1904()?.checked_add_signed(Duration::days(serial))?
    } else if serial == LEAP_BUG_SERIAL {
        return Some((1900, 2, 29));
    } else {
        let adjusted = if serial > LEAP_BUG_SERIAL { serial - 1 } else { serial };
        base_1900()?.checked_add_signed(Duration::days(adjusted))?
    };
    if date.year() > 9999 {
        return None;
    }
    Some((date.year(), date.month(), date.day()))
}

/// DATE(year, month, day)
///
/// Years 0..1899 are offset by 1900. Months and days outside their ranges
/// roll over into neighbouring years and months.
pub fn fn_date(args: &[ValueObject], ctx: &FunctionContext) -> ValueObject {
    if let Some(e) = first_error_arg(args) {
        return ValueObject::Error(e);
    }

    let parts: Result<Vec<i64>, CellError> = args.iter().map(to_i64_trunc).collect();
    let (mut year, month, day) = match parts.as_deref() {
        Ok([year, month, day]) => (*year, *month, *day),
        Ok(_) => return ValueObject::Error(CellError::Value),
        Err(e) => return ValueObject::Error(*e),
    };

    if (0..1900).contains(&year) {
        year += 1900;
    }
    if !(0..=9999).contains(&year) {
        return ValueObject::Error(CellError::Num);
    }

    // Zero-based month index so negative months borrow from earlier years
    let Some(total_months) = month
        .checked_sub(1)
        .and_then(|m| year.checked_mul(12)?.checked_add(m))
    else {
        return ValueObject::Error(CellError::Num);
    };
    let norm_month = total_months.rem_euclid(12) as u32 + 1;
    let first = i32::try_from(total_months.div_euclid(12))
        .ok()
        .and_then(|norm_year| NaiveDate::from_ymd_opt(norm_year, norm_month, 1));
    let Some(first) = first else {
        return ValueObject::Error(CellError::Num);
    };
    // The 1900 serial of February 1900 days past the 28th walks through the
    // fictional leap day, so offset from the serial rather than the date
    let serial = serial_from_date(first, ctx.date_1904)
        .and_then(|s| day.checked_sub(1).and_then(|d| s.checked_add(d)));
    match serial {
        Some(s) if s >= 0 && parts_from_serial(s, ctx.date_1904).is_some() => ValueObject::Number(s as f64),
        _ => ValueObject::Error(CellError::Num),
    }
}

fn date_part<F>(args: &[ValueObject], ctx: &FunctionContext, pick: F) -> ValueObject
where
    F: Fn((i32, u32, u32)) -> f64,
{
    args[0].map(|v| {
        let serial = match v.to_number() {
            Ok(n) => n.floor() as i64,
            Err(e) => return ValueObject::Error(e),
        };
        match parts_from_serial(serial, ctx.date_1904) {
            Some(parts) => ValueObject::Number(pick(parts)),
            None => ValueObject::Error(CellError::Num),
        }
    })
}

/// YEAR(serial)
pub fn fn_year(args: &[ValueObject], ctx: &FunctionContext) -> ValueObject {
    date_part(args, ctx, |(y, _, _)| y as f64)
}

/// MONTH(serial)
pub fn fn_month(args: &[ValueObject], ctx: &FunctionContext) -> ValueObject {
    date_part(args, ctx, |(_, m, _)| m as f64)
}

/// DAY(serial)
pub fn fn_day(args: &[ValueObject], ctx: &FunctionContext) -> ValueObject {
    date_part(args, ctx, |(_, _, d)| d as f64)
}

/// TODAY() - the current date as a serial number
pub fn fn_today(_args: &[ValueObject], ctx: &FunctionContext) -> ValueObject {
    let today = Local::now().date_naive();
    match serial_from_date(today, ctx.date_1904) {
        Some(serial) => ValueObject::Number(serial as f64),
        None => ValueObject::Error(CellError::Num),
    }
}

/// NOW() - the current date and time; the time is the fraction of the day
pub fn fn_now(_args: &[ValueObject], ctx: &FunctionContext) -> ValueObject {
    let now = Local::now();
    let Some(serial) = serial_from_date(now.date_naive(), ctx.date_1904) else {
        return ValueObject::Error(CellError::Num);
    };
    let seconds = now.num_seconds_from_midnight() as f64;
    ValueObject::Number(serial as f64 + seconds / 86400.0)
}
