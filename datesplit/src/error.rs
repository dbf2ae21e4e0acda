//! Error types for the datesplit pipeline.
//!
//! - [`DateParseError`] - a single value could not be read as a date/time
//! - [`CsvError`] - reading or writing CSV failed
//! - [`ConfigError`] - environment configuration is invalid
//! - [`PipelineError`] - top-level run errors
//!
//! Lower layers convert into [`PipelineError`] through `From`, so `?` works
//! across the whole run. Per-cell date failures never reach the pipeline level:
//! the row transformer recovers from them locally.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Date Parsing Errors
// =============================================================================

/// Errors raised while parsing a date/time string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateParseError {
    /// The value is missing, so there is nothing to parse.
    #[error("No value to parse")]
    Missing,

    /// No date or time token was found.
    #[error("String does not contain a date: {0:?}")]
    NoDate(String),

    /// A token could not be understood and fuzzy parsing is off.
    #[error("Unknown token {token:?} in {input:?}")]
    UnknownToken { input: String, token: String },

    /// The components were recognized but do not form a valid date/time.
    #[error("Value out of range in {input:?}: {message}")]
    OutOfRange { input: String, message: String },

    /// Two tokens claim the same component.
    #[error("Conflicting {component} in {input:?}")]
    Conflict { input: String, component: &'static str },
}

// =============================================================================
// CSV Errors
// =============================================================================

/// Errors while reading the source CSV or writing the output CSV.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Underlying IO failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV record.
    #[error("Invalid CSV format: {0}")]
    Format(#[from] csv::Error),

    /// The file does not even contain a header row.
    #[error("CSV file is empty")]
    EmptyFile,
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while loading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is set but its value cannot be used.
    #[error("Invalid value for {name}: {value:?} ({message})")]
    InvalidValue {
        name: &'static str,
        value: String,
        message: String,
    },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level errors returned by [`crate::transform::pipeline::run`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The source file cannot be opened or read.
    #[error("Please provide a valid file path")]
    InvalidPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV reading or writing failed mid-run.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The finished output could not be moved into place.
    #[error("Failed to write {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<std::io::Error> for PipelineError {
    fn from(e: std::io::Error) -> Self {
        PipelineError::Csv(CsvError::Io(e))
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for date parsing.
pub type DateResult<T> = Result<T, DateParseError>;

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
