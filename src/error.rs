use thiserror::Error;

use crate::breakpoints::IndexKey;

/// A value that cannot be placed in any band of a classifiable index.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifyError {
    #[error("invalid {key} value {value}: must be a finite, non-negative number")]
    InvalidValue { key: IndexKey, value: f64 },
}

/// The breakpoint table produced a band the palette has no entry for.
///
/// Only reachable when the two tables are out of step, so callers treat it as
/// a programming error rather than bad input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaletteError {
    #[error("severity index {index} is outside the palette (0..{len})")]
    OutOfRange { index: usize, len: usize },
}

/// Errors raised while turning a decoded feed payload into a `CityReport`.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed reported status '{status}': {message}")]
    Status { status: String, message: String },
    #[error("feed has no numeric AQI value")]
    MissingAqi,
    #[error("current readings are malformed: {0}")]
    MalformedReadings(String),
    #[error("unparseable report timestamp '{0}'")]
    BadTimestamp(String),
    #[error("failed to decode feed payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors raised while rendering a city.
///
/// `Classify` and `Feed` only abort the block of the city they belong to;
/// `Palette` aborts the whole report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Classify(#[from] ClassifyError),
    #[error(transparent)]
    Feed(#[from] FeedError),
    #[error(transparent)]
    Palette(#[from] PaletteError),
}

/// Invalid process configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}
