//! Meteorological seasons.
//!
//! Seasons change on the first of December, March, June and September.
//! Day-of-month never matters for which season it is; the southern
//! hemisphere swaps Winter with Summer and Spring with Fall.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::clock::LocalTime;
use crate::config::Hemisphere;
use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    pub fn as_str(self) -> &'static str {
        match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
        }
    }

    /// The season two steps away (Winter <-> Summer, Spring <-> Fall).
    pub fn opposite(self) -> Self {
        match self {
            Season::Winter => Season::Summer,
            Season::Spring => Season::Fall,
            Season::Summer => Season::Winter,
            Season::Fall => Season::Spring,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Season for a calendar month (1-12), or `None` if `month` is out of range.
pub fn season_for(month: u32, hemisphere: Hemisphere) -> Option<Season> {
    let north = match month {
        12 | 1 | 2 => Season::Winter,
        3..=5 => Season::Spring,
        6..=8 => Season::Summer,
        9..=11 => Season::Fall,
        _ => return None,
    };
    Some(match hemisphere {
        Hemisphere::North => north,
        Hemisphere::South => north.opposite(),
    })
}

/// Where the current season stands and what comes next.
///
/// Bounds are local dates: `start` inclusive, `end` exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeasonOutlook {
    pub season: Season,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub next_season: Season,
    pub next_start: NaiveDate,
    pub next_end: NaiveDate,
    /// Seconds from `local` until local midnight at `end`.
    pub seconds_until_change: i64,
    pub countdown: String,
}

/// Compute the season outlook for a local time.
///
/// # Errors
/// Returns `EngineError::FieldOutOfRange` if `local` does not hold a valid
/// calendar date and time.
pub fn season_outlook(local: &LocalTime, hemisphere: Hemisphere) -> Result<SeasonOutlook> {
    let date = local.date().ok_or(EngineError::FieldOutOfRange {
        field: "date",
        value: i64::from(local.day),
    })?;
    let time = NaiveTime::from_hms_opt(local.hour, local.minute, local.second).ok_or(
        EngineError::FieldOutOfRange {
            field: "time",
            value: i64::from(local.hour),
        },
    )?;
    let now = NaiveDateTime::new(date, time);

    // Quarters begin in months 12, 3, 6 and 9; January and February belong to
    // the quarter that began the previous December.
    let (start_year, start_month) = match local.month {
        12 => (local.year, 12),
        1 | 2 => (local.year - 1, 12),
        m => (local.year, m - m % 3),
    };

    let start = first_of_month(start_year, start_month, 0)?;
    let end = first_of_month(start_year, start_month, 3)?;
    let next_end = first_of_month(start_year, start_month, 6)?;

    let season = quarter_season(start_month, hemisphere)?;
    let next_season = quarter_season(end_month(start_month), hemisphere)?;

    let change_at = end.and_time(NaiveTime::MIN);
    let seconds_until_change = (change_at - now).num_seconds().max(0);

    Ok(SeasonOutlook {
        season,
        start,
        end,
        next_season,
        next_start: end,
        next_end,
        seconds_until_change,
        countdown: humanize_seconds(seconds_until_change),
    })
}

fn end_month(start_month: u32) -> u32 {
    (start_month + 2) % 12 + 1
}

fn quarter_season(month: u32, hemisphere: Hemisphere) -> Result<Season> {
    season_for(month, hemisphere).ok_or(EngineError::FieldOutOfRange {
        field: "month",
        value: i64::from(month),
    })
}

/// First day of the month `months_after` months past `year`-`month`.
fn first_of_month(year: i32, month: u32, months_after: u32) -> Result<NaiveDate> {
    let total = i64::from(year) * 12 + i64::from(month) - 1 + i64::from(months_after);
    let y = i32::try_from(total.div_euclid(12)).map_err(|_| EngineError::FieldOutOfRange {
        field: "year",
        value: total.div_euclid(12),
    })?;
    let m = (total.rem_euclid(12) + 1) as u32;
    NaiveDate::from_ymd_opt(y, m, 1).ok_or(EngineError::FieldOutOfRange {
        field: "year",
        value: i64::from(y),
    })
}

/// Compact duration text: `"2d 3h 4m"`. Seconds only appear when no larger
/// unit does; zero and negative durations render as `"0s"`.
pub fn humanize_seconds(total: i64) -> String {
    let total = total.max(0);
    let days = total / 86_400;
    let hours = total % 86_400 / 3_600;
    let minutes = total % 3_600 / 60;
    let seconds = total % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    if seconds > 0 && parts.is_empty() {
        parts.push(format!("{seconds}s"));
    }

    if parts.is_empty() {
        "0s".to_string()
    } else {
        parts.join(" ")
    }
}
