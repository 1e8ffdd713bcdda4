//! Pure derivation functions: one published value each.
//!
//! Every function reads a [`LocalTime`] (and, where names are involved, the
//! [`DerivationConfig`]) and nothing else, so two calls with the same inputs
//! always agree. Functions that can meet an out-of-range field return a
//! `Result` so one bad field cannot take the other values down with it.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::clock::LocalTime;
use crate::config::{DerivationConfig, WeekdayStart};
use crate::error::{EngineError, Result};

fn out_of_range(field: &'static str, value: impl Into<i64>) -> EngineError {
    EngineError::FieldOutOfRange {
        field,
        value: value.into(),
    }
}

/// 0 -> 12, 13..=23 -> 1..=11.
fn hour_12(hour: u32) -> u32 {
    match hour % 12 {
        0 => 12,
        h => h,
    }
}

fn meridiem(hour: u32) -> &'static str {
    if hour < 12 {
        "AM"
    } else {
        "PM"
    }
}

/// `HH:MM`
pub fn clock_24h(lt: &LocalTime) -> String {
    format!("{:02}:{:02}", lt.hour, lt.minute)
}

/// `HH:MM:SS`
pub fn clock_24h_sec(lt: &LocalTime) -> String {
    format!("{:02}:{:02}:{:02}", lt.hour, lt.minute, lt.second)
}

/// `hh:MM AM` / `hh:MM PM`. Midnight is `12:00 AM`, noon `12:00 PM`.
pub fn clock_12h(lt: &LocalTime) -> String {
    format!(
        "{:02}:{:02} {}",
        hour_12(lt.hour),
        lt.minute,
        meridiem(lt.hour)
    )
}

/// `hh:MM:SS AM` / `hh:MM:SS PM`.
pub fn clock_12h_sec(lt: &LocalTime) -> String {
    format!(
        "{:02}:{:02}:{:02} {}",
        hour_12(lt.hour),
        lt.minute,
        lt.second,
        meridiem(lt.hour)
    )
}

/// Month name for the current month.
pub fn current_month(lt: &LocalTime, config: &DerivationConfig) -> Result<String> {
    config
        .locale
        .month(lt.month)
        .map(str::to_string)
        .ok_or_else(|| out_of_range("month", lt.month))
}

fn month_short(lt: &LocalTime, config: &DerivationConfig) -> Result<String> {
    config
        .locale
        .month_short(lt.month)
        .map(str::to_string)
        .ok_or_else(|| out_of_range("month", lt.month))
}

pub fn weekday_long(lt: &LocalTime, config: &DerivationConfig) -> Result<String> {
    config
        .locale
        .weekday(lt.weekday)
        .map(str::to_string)
        .ok_or_else(|| out_of_range("weekday", lt.weekday))
}

pub fn weekday_short(lt: &LocalTime, config: &DerivationConfig) -> Result<String> {
    config
        .locale
        .weekday_short(lt.weekday)
        .map(str::to_string)
        .ok_or_else(|| out_of_range("weekday", lt.weekday))
}

/// `"December 1, 2024"`
pub fn date_long(lt: &LocalTime, config: &DerivationConfig) -> Result<String> {
    Ok(format!(
        "{} {}, {}",
        current_month(lt, config)?,
        lt.day,
        lt.year
    ))
}

/// `MM/DD/YY`
pub fn date_short(lt: &LocalTime) -> String {
    format!(
        "{:02}/{:02}/{:02}",
        lt.month,
        lt.day,
        lt.year.rem_euclid(100)
    )
}

/// `YYYY/MM/DD`
pub fn date_iso(lt: &LocalTime) -> String {
    format!("{:04}/{:02}/{:02}", lt.year, lt.month, lt.day)
}

/// `"Sunday, December 1, 2024"`
pub fn date_pretty(lt: &LocalTime, config: &DerivationConfig) -> Result<String> {
    Ok(format!(
        "{}, {}",
        weekday_long(lt, config)?,
        date_long(lt, config)?
    ))
}

/// `"Sun, Dec 1, 2024"`
pub fn date_pretty_short(lt: &LocalTime, config: &DerivationConfig) -> Result<String> {
    Ok(format!(
        "{}, {} {}, {}",
        weekday_short(lt, config)?,
        month_short(lt, config)?,
        lt.day,
        lt.year
    ))
}

/// Day number within the week, 1-7, counted from the configured start day.
pub fn day_of_week(lt: &LocalTime, config: &DerivationConfig) -> Result<u32> {
    if lt.weekday > 6 {
        return Err(out_of_range("weekday", lt.weekday));
    }
    Ok(match config.weekday_start {
        WeekdayStart::Monday => lt.weekday + 1,
        WeekdayStart::Sunday => (lt.weekday + 1) % 7 + 1,
    })
}

/// ISO-8601 week number.
pub fn iso_week(lt: &LocalTime) -> Result<u32> {
    lt.date()
        .map(|d| d.iso_week().week())
        .ok_or_else(|| out_of_range("day", lt.day))
}

/// Saturday or Sunday.
pub fn is_weekend(lt: &LocalTime) -> bool {
    lt.weekday >= 5
}

/// Whether DST is in effect, exactly as the clock source resolved it.
pub fn dst_active(lt: &LocalTime) -> bool {
    lt.is_dst
}

/// Facts about the current month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthDetails {
    pub name: String,
    pub number: u32,
    pub zero_padded: String,
    pub length: u32,
    pub first_weekday: String,
}

pub fn month_details(lt: &LocalTime, config: &DerivationConfig) -> Result<MonthDetails> {
    let first = NaiveDate::from_ymd_opt(lt.year, lt.month, 1)
        .ok_or_else(|| out_of_range("month", lt.month))?;
    let next_first = if lt.month == 12 {
        NaiveDate::from_ymd_opt(lt.year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(lt.year, lt.month + 1, 1)
    }
    .ok_or_else(|| out_of_range("year", lt.year))?;
    let first_weekday = config
        .locale
        .weekday(first.weekday().num_days_from_monday())
        .unwrap_or_default()
        .to_string();

    Ok(MonthDetails {
        name: current_month(lt, config)?,
        number: lt.month,
        zero_padded: format!("{:02}", lt.month),
        length: (next_first - first).num_days() as u32,
        first_weekday,
    })
}
