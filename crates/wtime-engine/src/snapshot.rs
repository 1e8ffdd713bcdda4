//! Snapshots of every published value and the field-by-field diff between
//! consecutive snapshots.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use tracing::warn;

use crate::clock::LocalTime;
use crate::config::DerivationConfig;
use crate::derive;
use crate::error::{EngineError, Result};
use crate::season::{season_for, Season};

/// Stable identifier of a published value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueKey {
    Clock12h,
    Clock12hSec,
    Clock24h,
    Clock24hSec,
    DateLong,
    DateShort,
    CurrentMonth,
    WeekdayLong,
    WeekdayShort,
    Season,
    DstActive,
    DayOfMonth,
    MonthNumber,
    Year,
    DayOfWeek,
    DateIso,
    DatePretty,
    DatePrettyShort,
    IsoWeek,
    IsWeekday,
    IsWeekend,
}

impl ValueKey {
    pub const ALL: [ValueKey; 21] = [
        ValueKey::Clock12h,
        ValueKey::Clock12hSec,
        ValueKey::Clock24h,
        ValueKey::Clock24hSec,
        ValueKey::DateLong,
        ValueKey::DateShort,
        ValueKey::CurrentMonth,
        ValueKey::WeekdayLong,
        ValueKey::WeekdayShort,
        ValueKey::Season,
        ValueKey::DstActive,
        ValueKey::DayOfMonth,
        ValueKey::MonthNumber,
        ValueKey::Year,
        ValueKey::DayOfWeek,
        ValueKey::DateIso,
        ValueKey::DatePretty,
        ValueKey::DatePrettyShort,
        ValueKey::IsoWeek,
        ValueKey::IsWeekday,
        ValueKey::IsWeekend,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ValueKey::Clock12h => "clock_12h",
            ValueKey::Clock12hSec => "clock_12h_sec",
            ValueKey::Clock24h => "clock_24h",
            ValueKey::Clock24hSec => "clock_24h_sec",
            ValueKey::DateLong => "date_long",
            ValueKey::DateShort => "date_short",
            ValueKey::CurrentMonth => "current_month",
            ValueKey::WeekdayLong => "weekday_long",
            ValueKey::WeekdayShort => "weekday_short",
            ValueKey::Season => "season",
            ValueKey::DstActive => "dst_active",
            ValueKey::DayOfMonth => "day_of_month",
            ValueKey::MonthNumber => "month_number",
            ValueKey::Year => "year",
            ValueKey::DayOfWeek => "day_of_week",
            ValueKey::DateIso => "date_iso",
            ValueKey::DatePretty => "date_pretty",
            ValueKey::DatePrettyShort => "date_pretty_short",
            ValueKey::IsoWeek => "iso_week",
            ValueKey::IsWeekday => "is_weekday",
            ValueKey::IsWeekend => "is_weekend",
        }
    }
}

impl fmt::Display for ValueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ValueKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A published value. Equality is by rendered content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Number(i64),
    Flag(bool),
    Season(Season),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{n}"),
            Value::Flag(b) => write!(f, "{b}"),
            Value::Season(s) => write!(f, "{s}"),
        }
    }
}

fn derive_value(key: ValueKey, lt: &LocalTime, config: &DerivationConfig) -> Result<Value> {
    let value = match key {
        ValueKey::Clock12h => Value::Text(derive::clock_12h(lt)),
        ValueKey::Clock12hSec => Value::Text(derive::clock_12h_sec(lt)),
        ValueKey::Clock24h => Value::Text(derive::clock_24h(lt)),
        ValueKey::Clock24hSec => Value::Text(derive::clock_24h_sec(lt)),
        ValueKey::DateLong => Value::Text(derive::date_long(lt, config)?),
        ValueKey::DateShort => Value::Text(derive::date_short(lt)),
        ValueKey::CurrentMonth => Value::Text(derive::current_month(lt, config)?),
        ValueKey::WeekdayLong => Value::Text(derive::weekday_long(lt, config)?),
        ValueKey::WeekdayShort => Value::Text(derive::weekday_short(lt, config)?),
        ValueKey::Season => Value::Season(season_for(lt.month, config.hemisphere).ok_or(
            EngineError::FieldOutOfRange {
                field: "month",
                value: i64::from(lt.month),
            },
        )?),
        ValueKey::DstActive => Value::Flag(derive::dst_active(lt)),
        ValueKey::DayOfMonth => Value::Number(i64::from(lt.day)),
        ValueKey::MonthNumber => Value::Number(i64::from(lt.month)),
        ValueKey::Year => Value::Number(i64::from(lt.year)),
        ValueKey::DayOfWeek => Value::Number(i64::from(derive::day_of_week(lt, config)?)),
        ValueKey::DateIso => Value::Text(derive::date_iso(lt)),
        ValueKey::DatePretty => Value::Text(derive::date_pretty(lt, config)?),
        ValueKey::DatePrettyShort => Value::Text(derive::date_pretty_short(lt, config)?),
        ValueKey::IsoWeek => Value::Number(i64::from(derive::iso_week(lt)?)),
        ValueKey::IsWeekday => Value::Flag(!derive::is_weekend(lt)),
        ValueKey::IsWeekend => Value::Flag(derive::is_weekend(lt)),
    };
    Ok(value)
}

/// Every published value for one evaluation.
///
/// A value that fails to derive is left out (and logged); the rest are
/// still published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedSnapshot {
    pub tick_at: DateTime<Utc>,
    pub values: BTreeMap<ValueKey, Value>,
}

impl DerivedSnapshot {
    pub fn derive(lt: &LocalTime, config: &DerivationConfig) -> Self {
        let mut values = BTreeMap::new();
        for key in ValueKey::ALL {
            match derive_value(key, lt, config) {
                Ok(value) => {
                    values.insert(key, value);
                }
                Err(e) => warn!(key = key.as_str(), "value not derived: {e}"),
            }
        }
        Self {
            tick_at: lt.instant,
            values,
        }
    }

    pub fn get(&self, key: ValueKey) -> Option<&Value> {
        self.values.get(&key)
    }

    /// Rendered text of a value, if present.
    pub fn text(&self, key: ValueKey) -> Option<String> {
        self.get(key).map(Value::to_string)
    }
}

/// One changed value, as delivered to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeNotification {
    pub key: ValueKey,
    /// `None` when the key had no previous value (first tick, or the previous
    /// derivation failed).
    pub old_value: Option<Value>,
    pub new_value: Value,
    pub tick_at: DateTime<Utc>,
}

/// Changes from `previous` to `next`, one per key whose value differs.
///
/// Keys missing from `next` produce no notification: a failed derivation
/// keeps the last published value in place.
pub fn diff(previous: Option<&DerivedSnapshot>, next: &DerivedSnapshot) -> Vec<ChangeNotification> {
    next.values
        .iter()
        .filter_map(|(key, new_value)| {
            let old_value = previous.and_then(|p| p.values.get(key));
            (old_value != Some(new_value)).then(|| ChangeNotification {
                key: *key,
                old_value: old_value.cloned(),
                new_value: new_value.clone(),
                tick_at: next.tick_at,
            })
        })
        .collect()
}
