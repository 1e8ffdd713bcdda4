//! # wtime-engine
//!
//! Derived clock, calendar, season and DST values for one timezone, kept
//! current by a once-per-second refresh loop.
//!
//! The engine turns "now, in zone Z" into a [`DerivedSnapshot`] of formatted
//! clock strings, date strings, month and weekday names, the meteorological
//! season and the DST flag, then reports which of those values changed since
//! the previous tick. Time is read through an injected [`ClockSource`], so
//! every derivation can be driven from a [`ManualClock`] in tests.
//!
//! ## Modules
//!
//! - [`clock`] — clock sources and local-time resolution via `chrono-tz`
//! - [`config`] — host configuration and its validated form
//! - [`locale`] — month and weekday name tables with English fallback
//! - [`derive`] — one pure function per published value
//! - [`season`] — meteorological seasons and the season outlook
//! - [`snapshot`] — published keys, snapshots and diffing
//! - [`scheduler`] — the refresh loop (`start` / `stop`)
//! - [`transition`] — DST transition search and schedule
//! - [`error`] — Error types

pub mod clock;
pub mod config;
pub mod derive;
pub mod error;
pub mod locale;
pub mod scheduler;
pub mod season;
pub mod snapshot;
pub mod transition;

pub use clock::{parse_timezone, resolve_local, ClockSource, LocalTime, ManualClock, SystemClock};
pub use config::{DerivationConfig, EngineConfig, Hemisphere, WeekdayStart};
pub use error::EngineError;
pub use locale::{LocaleOverride, LocaleTable};
pub use scheduler::{start, stop, ChangeSink, RefreshHandle, Refresher, REFRESH_PERIOD};
pub use season::{season_for, season_outlook, Season, SeasonOutlook};
pub use snapshot::{diff, ChangeNotification, DerivedSnapshot, Value, ValueKey};
pub use transition::{dst_schedule, DstSchedule};
