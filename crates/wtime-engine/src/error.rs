//! Error types for wtime-engine operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// The configured timezone is not a known IANA identifier. Fatal to setup.
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// The underlying time source could not be read. Transient.
    #[error("Clock unavailable: {0}")]
    ClockUnavailable(String),

    /// A locale override is missing a name; the English entry is used instead.
    #[error("Locale table incomplete: {table}[{index}] missing, using English fallback")]
    LocaleTableIncomplete { table: &'static str, index: usize },

    /// A local-time field lies outside its calendar range.
    #[error("Field out of range: {field}={value}")]
    FieldOutOfRange { field: &'static str, value: i64 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Transient faults skip one tick and are retried on the next one.
    pub fn is_transient(&self) -> bool {
        matches!(self, EngineError::ClockUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
