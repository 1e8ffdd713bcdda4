//! Clock source: the current instant resolved against a named timezone.
//!
//! Reading "now" goes through the [`ClockSource`] trait so the refresh loop and
//! the tests can swap the system clock for a [`ManualClock`]. Timezone rules
//! come from `chrono-tz`; the engine never computes DST on its own, it only
//! reads the offset components the zone reports for an instant.

use std::sync::{Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Datelike, Duration, NaiveDate, Offset, Timelike, Utc};
use chrono_tz::{OffsetComponents, Tz};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// An instant broken down into wall-clock fields for one timezone.
///
/// `weekday` counts from Monday (0) to Sunday (6). `utc_offset_minutes` and
/// `is_dst` are read from the zone's rule table at `instant`. Zones with a
/// negative DST save (Europe/Dublin, Africa/Casablanca) report `is_dst` for
/// their shifted period, which for Dublin is winter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalTime {
    pub instant: DateTime<Utc>,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub weekday: u32,
    pub utc_offset_minutes: i32,
    pub is_dst: bool,
}

impl LocalTime {
    /// The local calendar date, if the fields form a valid one.
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}

/// Parse an IANA timezone identifier.
///
/// # Errors
/// Returns `EngineError::InvalidTimezone` if `timezone_id` is not known to `chrono-tz`.
pub fn parse_timezone(timezone_id: &str) -> Result<Tz> {
    timezone_id
        .parse()
        .map_err(|_| EngineError::InvalidTimezone(timezone_id.to_string()))
}

/// Resolve `instant` against `tz` into local wall-clock fields.
pub fn resolve_local(tz: &Tz, instant: DateTime<Utc>) -> LocalTime {
    let local = instant.with_timezone(tz);
    let offset = local.offset();

    LocalTime {
        instant,
        year: local.year(),
        month: local.month(),
        day: local.day(),
        hour: local.hour(),
        minute: local.minute(),
        second: local.second(),
        weekday: local.weekday().num_days_from_monday(),
        utc_offset_minutes: offset.fix().local_minus_utc() / 60,
        is_dst: offset.dst_offset() != Duration::zero(),
    }
}

/// Supplies the current instant.
///
/// Implementations only read time; clock jumps (NTP corrections, manual
/// changes) are passed through as-is.
pub trait ClockSource: Send + Sync {
    /// The current instant in UTC.
    ///
    /// # Errors
    /// Returns `EngineError::ClockUnavailable` when the time source cannot be read.
    fn now_utc(&self) -> Result<DateTime<Utc>>;

    /// The current instant resolved against `timezone_id`.
    ///
    /// # Errors
    /// `InvalidTimezone` for an unknown zone, `ClockUnavailable` when the time
    /// source cannot be read.
    fn now_local(&self, timezone_id: &str) -> Result<LocalTime> {
        let tz = parse_timezone(timezone_id)?;
        let instant = self.now_utc()?;
        Ok(resolve_local(&tz, instant))
    }
}

/// Reads the operating system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now_utc(&self) -> Result<DateTime<Utc>> {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| EngineError::ClockUnavailable(e.to_string()))?;
        let secs = i64::try_from(since_epoch.as_secs())
            .map_err(|e| EngineError::ClockUnavailable(e.to_string()))?;
        DateTime::from_timestamp(secs, since_epoch.subsec_nanos()).ok_or_else(|| {
            EngineError::ClockUnavailable(format!("system time {secs}s is out of range"))
        })
    }
}

#[derive(Debug)]
struct ManualState {
    now: DateTime<Utc>,
    available: bool,
}

/// A clock that only moves when told to. Used for `--at` rendering and tests.
#[derive(Debug)]
pub struct ManualClock {
    state: Mutex<ManualState>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            state: Mutex::new(ManualState {
                now,
                available: true,
            }),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).now = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.now += by;
    }

    /// While unavailable, `now_utc` fails with `ClockUnavailable`.
    pub fn set_available(&self, available: bool) {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).available = available;
    }
}

impl ClockSource for ManualClock {
    fn now_utc(&self) -> Result<DateTime<Utc>> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.available {
            Ok(state.now)
        } else {
            Err(EngineError::ClockUnavailable(
                "manual clock marked unavailable".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn resolves_new_york_summer_as_dst() {
        let tz = parse_timezone("America/New_York").unwrap();
        let lt = resolve_local(&tz, Utc.with_ymd_and_hms(2024, 7, 4, 16, 30, 5).unwrap());
        assert_eq!((lt.year, lt.month, lt.day), (2024, 7, 4));
        assert_eq!((lt.hour, lt.minute, lt.second), (12, 30, 5));
        assert_eq!(lt.utc_offset_minutes, -240);
        assert!(lt.is_dst);
        // Thursday
        assert_eq!(lt.weekday, 3);
    }

    #[test]
    fn resolves_new_york_winter_as_standard() {
        let tz = parse_timezone("America/New_York").unwrap();
        let lt = resolve_local(&tz, Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap());
        assert_eq!(lt.utc_offset_minutes, -300);
        assert!(!lt.is_dst);
    }

    #[test]
    fn negative_dst_zone_reports_winter_as_dst() {
        // tzdata models Irish time as IST in summer and a -1h "DST" in winter.
        let tz = parse_timezone("Europe/Dublin").unwrap();
        let winter = resolve_local(&tz, Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap());
        let summer = resolve_local(&tz, Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap());
        assert_eq!(winter.utc_offset_minutes, 0);
        assert_eq!(summer.utc_offset_minutes, 60);
        assert!(winter.is_dst);
        assert!(!summer.is_dst);
    }

    #[test]
    fn half_hour_offsets_are_kept_in_minutes() {
        let tz = parse_timezone("Asia/Kolkata").unwrap();
        let lt = resolve_local(&tz, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(lt.utc_offset_minutes, 330);
        assert_eq!((lt.hour, lt.minute), (5, 30));
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        let err = parse_timezone("Mars/Olympus_Mons").unwrap_err();
        assert!(matches!(err, EngineError::InvalidTimezone(ref id) if id == "Mars/Olympus_Mons"));
        assert!(!err.is_transient());
    }

    #[test]
    fn now_local_checks_timezone_before_reading_clock() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        clock.set_available(false);
        let err = clock.now_local("Not/AZone").unwrap_err();
        assert!(matches!(err, EngineError::InvalidTimezone(_)));
    }

    #[test]
    fn manual_clock_moves_only_when_told() {
        let start = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now_utc().unwrap(), start);
        clock.advance(Duration::seconds(1));
        let lt = clock.now_local("UTC").unwrap();
        assert_eq!((lt.year, lt.month, lt.day), (2025, 1, 1));

        clock.set_available(false);
        let err = clock.now_utc().unwrap_err();
        assert!(err.is_transient());
    }

    #[test]
    fn system_clock_reads_a_plausible_time() {
        let now = SystemClock.now_utc().unwrap();
        assert!(now.year() >= 2024);
    }
}
