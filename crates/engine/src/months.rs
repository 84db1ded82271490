//! Calendar month helpers.

use chrono::{Datelike, NaiveDate};

use crate::{EngineError, ResultEngine};

fn invalid_month(year: i32, month: u32) -> EngineError {
    EngineError::InvalidArgument(format!("invalid month: {year}-{month:02}"))
}

/// First day of the month.
pub fn month_start(year: i32, month: u32) -> ResultEngine<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| invalid_month(year, month))
}

/// Last day of the month.
pub fn month_end(year: i32, month: u32) -> ResultEngine<NaiveDate> {
    let (next_year, next_month) = next_month(year, month)?;
    month_start(next_year, next_month)?
        .pred_opt()
        .ok_or_else(|| invalid_month(year, month))
}

/// Inclusive `(first, last)` day range of the month.
pub fn month_range(year: i32, month: u32) -> ResultEngine<(NaiveDate, NaiveDate)> {
    Ok((month_start(year, month)?, month_end(year, month)?))
}

pub fn previous_month(year: i32, month: u32) -> ResultEngine<(i32, u32)> {
    match month {
        1 => Ok((year - 1, 12)),
        2..=12 => Ok((year, month - 1)),
        _ => Err(invalid_month(year, month)),
    }
}

pub fn next_month(year: i32, month: u32) -> ResultEngine<(i32, u32)> {
    match month {
        12 => Ok((year + 1, 1)),
        1..=11 => Ok((year, month + 1)),
        _ => Err(invalid_month(year, month)),
    }
}

/// Whether `date` falls in the given month.
pub fn is_in_month(date: NaiveDate, year: i32, month: u32) -> bool {
    date.year() == year && date.month() == month
}
