//! DST transition search.
//!
//! `chrono-tz` answers "what is the offset at instant T" but not "when does
//! the offset next change", so transitions are located by scanning one day at
//! a time and then bisecting down to the second. Results are rounded up to the
//! next whole minute.

use chrono::{DateTime, Duration, FixedOffset, Offset, SubsecRound, TimeZone, Utc};
use chrono_tz::{OffsetComponents, Tz};
use serde::Serialize;

/// How far either side of an instant to look for an offset change.
pub const SEARCH_DAYS: u32 = 400;

fn offset_at(tz: &Tz, at: DateTime<Utc>) -> i32 {
    tz.offset_from_utc_datetime(&at.naive_utc())
        .fix()
        .local_minus_utc()
}

fn is_dst_at(tz: &Tz, at: DateTime<Utc>) -> bool {
    tz.offset_from_utc_datetime(&at.naive_utc()).dst_offset() != Duration::zero()
}

fn localize(tz: &Tz, at: DateTime<Utc>) -> DateTime<FixedOffset> {
    let offset = tz.offset_from_utc_datetime(&at.naive_utc()).fix();
    at.with_timezone(&offset)
}

fn ceil_to_minute(at: DateTime<Utc>) -> DateTime<Utc> {
    let rem = at.timestamp().rem_euclid(60);
    if rem == 0 {
        at
    } else {
        at + Duration::seconds(60 - rem)
    }
}

/// First whole second in `(low, high]` whose offset differs from `low`'s.
/// Requires the offsets at `low` and `high` to differ.
fn bisect(tz: &Tz, mut low: DateTime<Utc>, mut high: DateTime<Utc>) -> DateTime<Utc> {
    let low_offset = offset_at(tz, low);
    while high - low > Duration::seconds(1) {
        let mid = low + Duration::seconds((high - low).num_seconds() / 2);
        if offset_at(tz, mid) == low_offset {
            low = mid;
        } else {
            high = mid;
        }
    }
    high
}

/// The next instant after `from` at which the UTC offset changes.
pub fn next_offset_change(tz: &Tz, from: DateTime<Utc>, max_days: u32) -> Option<DateTime<Utc>> {
    let from = from.trunc_subsecs(0);
    let base = offset_at(tz, from);
    let mut cursor = from;
    for _ in 0..max_days {
        let next = cursor + Duration::days(1);
        if offset_at(tz, next) != base {
            return Some(ceil_to_minute(bisect(tz, cursor, next)));
        }
        cursor = next;
    }
    None
}

/// The instant at which the offset in force at `from` took effect.
pub fn previous_offset_change(
    tz: &Tz,
    from: DateTime<Utc>,
    max_days: u32,
) -> Option<DateTime<Utc>> {
    let from = from.trunc_subsecs(0);
    let base = offset_at(tz, from);
    let mut cursor = from;
    for _ in 0..max_days {
        let prev = cursor - Duration::days(1);
        if offset_at(tz, prev) != base {
            return Some(ceil_to_minute(bisect(tz, prev, cursor)));
        }
        cursor = prev;
    }
    None
}

/// DST state around an instant. All instants are local time with offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DstSchedule {
    pub timezone: String,
    pub dst_in_effect: bool,
    /// When the current DST period began, or when the most recent one began
    /// if DST is not in effect.
    pub season_start: Option<DateTime<FixedOffset>>,
    /// When the current DST period ends, or when the most recent one ended.
    pub season_end: Option<DateTime<FixedOffset>>,
    pub next_start: Option<DateTime<FixedOffset>>,
    pub next_end: Option<DateTime<FixedOffset>>,
    /// The next offset change of any kind.
    pub next_change: Option<DateTime<FixedOffset>>,
    /// DST state right after `next_change`.
    pub next_state: Option<bool>,
}

pub fn dst_schedule(tz: &Tz, now: DateTime<Utc>) -> DstSchedule {
    let minute = Duration::minutes(1);
    let dst_now = is_dst_at(tz, now);
    let prev_change = previous_offset_change(tz, now, SEARCH_DAYS);
    let next_change = next_offset_change(tz, now, SEARCH_DAYS);
    let next_state = next_change.map(|t| is_dst_at(tz, t + minute));
    let after = |t: DateTime<Utc>| next_offset_change(tz, t + minute, SEARCH_DAYS);

    let (season_start, season_end, next_start) = if dst_now {
        let next_start = next_change.and_then(after);
        (prev_change, next_change, next_start)
    } else {
        let next_start = next_change.filter(|_| next_state == Some(true));
        // The last change switched DST off: that is the end of the last period.
        match prev_change.filter(|t| is_dst_at(tz, *t - minute)) {
            Some(end) => {
                let start = previous_offset_change(tz, end - minute, SEARCH_DAYS);
                (start, Some(end), next_start)
            }
            None => (None, None, next_start),
        }
    };
    let next_end = next_start.and_then(after);

    let local = |t: Option<DateTime<Utc>>| t.map(|t| localize(tz, t));
    DstSchedule {
        timezone: tz.name().to_string(),
        dst_in_effect: dst_now,
        season_start: local(season_start),
        season_end: local(season_end),
        next_start: local(next_start),
        next_end: local(next_end),
        next_change: local(next_change),
        next_state,
    }
}
