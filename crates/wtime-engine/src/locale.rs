//! Month and weekday name tables.
//!
//! A [`LocaleTable`] is always complete: overrides are validated once, when
//! the configuration is resolved, and every missing or blank entry is filled
//! from the built-in English table.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::WeekdayStart;
use crate::error::EngineError;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const MONTHS_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const WEEKDAYS_SHORT: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Name overrides as supplied in configuration.
///
/// Weekday lists start at the configured [`WeekdayStart`], so a Sunday-start
/// configuration lists Sunday first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleOverride {
    pub months: Vec<String>,
    pub months_short: Vec<String>,
    pub weekdays: Vec<String>,
    pub weekdays_short: Vec<String>,
}

/// Fixed-size name tables. Weekdays are stored Monday-first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocaleTable {
    months: [String; 12],
    months_short: [String; 12],
    weekdays: [String; 7],
    weekdays_short: [String; 7],
}

impl Default for LocaleTable {
    fn default() -> Self {
        Self::english()
    }
}

impl LocaleTable {
    pub fn english() -> Self {
        Self {
            months: MONTHS.map(String::from),
            months_short: MONTHS_SHORT.map(String::from),
            weekdays: WEEKDAYS.map(String::from),
            weekdays_short: WEEKDAYS_SHORT.map(String::from),
        }
    }

    /// Build a complete table from an override.
    ///
    /// Returns the table together with one `LocaleTableIncomplete` per entry
    /// that fell back to English. Each fallback is also logged. Entries past
    /// the table size are ignored.
    pub fn from_override(
        over: &LocaleOverride,
        weekday_start: WeekdayStart,
    ) -> (Self, Vec<EngineError>) {
        let mut fallbacks = Vec::new();
        // Weekday overrides are listed from the configured start day; rotate
        // them into Monday-first storage.
        let shift = match weekday_start {
            WeekdayStart::Monday => 0,
            WeekdayStart::Sunday => 1,
        };

        let table = Self {
            months: fill("months", &over.months, &MONTHS, 0, &mut fallbacks),
            months_short: fill("months_short", &over.months_short, &MONTHS_SHORT, 0, &mut fallbacks),
            weekdays: fill("weekdays", &over.weekdays, &WEEKDAYS, shift, &mut fallbacks),
            weekdays_short: fill(
                "weekdays_short",
                &over.weekdays_short,
                &WEEKDAYS_SHORT,
                shift,
                &mut fallbacks,
            ),
        };

        for fallback in &fallbacks {
            warn!("{fallback}");
        }

        (table, fallbacks)
    }

    /// Name of `month` (1-12).
    pub fn month(&self, month: u32) -> Option<&str> {
        index_of(month, 1, 12).map(|i| self.months[i].as_str())
    }

    /// Abbreviated name of `month` (1-12).
    pub fn month_short(&self, month: u32) -> Option<&str> {
        index_of(month, 1, 12).map(|i| self.months_short[i].as_str())
    }

    /// Name of `weekday` (0 = Monday).
    pub fn weekday(&self, weekday: u32) -> Option<&str> {
        index_of(weekday, 0, 6).map(|i| self.weekdays[i].as_str())
    }

    /// Abbreviated name of `weekday` (0 = Monday).
    pub fn weekday_short(&self, weekday: u32) -> Option<&str> {
        index_of(weekday, 0, 6).map(|i| self.weekdays_short[i].as_str())
    }
}

fn index_of(value: u32, first: u32, last: u32) -> Option<usize> {
    (first..=last)
        .contains(&value)
        .then(|| (value - first) as usize)
}

/// Fill an `N`-entry table from `given`, whose entry `j` belongs at storage
/// index `(j + N - shift) % N`. Reported indices are positions in `given`.
fn fill<const N: usize>(
    table: &'static str,
    given: &[String],
    english: &[&str; N],
    shift: usize,
    fallbacks: &mut Vec<EngineError>,
) -> [String; N] {
    let mut out = english.map(String::from);
    if given.is_empty() {
        return out;
    }
    for j in 0..N {
        let slot = (j + N - shift) % N;
        match given.get(j).map(|s| s.trim()).filter(|s| !s.is_empty()) {
            Some(name) => out[slot] = name.to_string(),
            None => fallbacks.push(EngineError::LocaleTableIncomplete { table, index: j }),
        }
    }
    out
}
