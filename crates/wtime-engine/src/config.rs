//! Engine configuration.
//!
//! [`EngineConfig`] is the host-facing input (serde, all fields optional).
//! [`EngineConfig::resolve`] validates it into a [`DerivationConfig`], the
//! value every derivation function takes.

use std::path::Path;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::clock::parse_timezone;
use crate::error::{EngineError, Result};
use crate::locale::{LocaleOverride, LocaleTable};

/// Which half of the globe the seasons are reported for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Hemisphere {
    #[default]
    North,
    South,
}

/// First day of the week, for `day_of_week` numbering and weekday overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WeekdayStart {
    #[default]
    Monday,
    Sunday,
}

impl std::str::FromStr for Hemisphere {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "north" => Ok(Hemisphere::North),
            "south" => Ok(Hemisphere::South),
            other => Err(EngineError::Config(format!(
                "unknown hemisphere '{other}', expected North or South"
            ))),
        }
    }
}

impl std::str::FromStr for WeekdayStart {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "monday" => Ok(WeekdayStart::Monday),
            "sunday" => Ok(WeekdayStart::Sunday),
            other => Err(EngineError::Config(format!(
                "unknown weekday start '{other}', expected Monday or Sunday"
            ))),
        }
    }
}

/// Configuration as supplied by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// IANA timezone identifier.
    pub timezone_id: String,
    pub hemisphere: Hemisphere,
    pub weekday_start: WeekdayStart,
    /// Optional month/weekday name overrides. `None` means built-in English.
    pub locale: Option<LocaleOverride>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timezone_id: "UTC".to_string(),
            hemisphere: Hemisphere::default(),
            weekday_start: WeekdayStart::default(),
            locale: None,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Validate the timezone and build the complete locale table.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidTimezone` if `timezone_id` is unknown.
    /// Incomplete locale overrides are not errors; they are logged and filled
    /// from English.
    pub fn resolve(&self) -> Result<(Tz, DerivationConfig)> {
        let tz = parse_timezone(&self.timezone_id)?;
        let locale = match &self.locale {
            Some(over) => LocaleTable::from_override(over, self.weekday_start).0,
            None => LocaleTable::english(),
        };
        Ok((
            tz,
            DerivationConfig {
                locale,
                hemisphere: self.hemisphere,
                weekday_start: self.weekday_start,
            },
        ))
    }
}

/// Validated input shared by all derivation functions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivationConfig {
    pub locale: LocaleTable,
    pub hemisphere: Hemisphere,
    pub weekday_start: WeekdayStart,
}
