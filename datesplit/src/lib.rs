//! # datesplit - expand date columns of CSV files
//!
//! Columns whose first value reads as a date are replaced by four columns
//! (year, month name, day, time of day) so that natural-language query tools
//! can match on them. Every other column is copied unchanged.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌───────────────┐
//! │  CSV File   │────▶│   Parser    │────▶│  Transform  │────▶│ processed.csv │
//! │ (any enc.)  │     │  (batches)  │     │ (schema+row)│     │    (UTF-8)    │
//! └─────────────┘     └─────────────┘     └─────────────┘     └───────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use datesplit::run;
//! use std::path::Path;
//!
//! let summary = run(Path::new("sample311.csv")).unwrap();
//! println!("Expanded {} date columns", summary.date_columns.len());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`config`] - Environment configuration
//! - [`logs`] - Run logging
//! - [`dates`] - Date parsing, classification and date parts
//! - [`parser`] - Batched CSV reading and writing
//! - [`transform`] - Schema mapping, row expansion and the pipeline

// Core modules
pub mod config;
pub mod error;
pub mod logs;

// Dates
pub mod dates;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ConfigError, CsvError, DateParseError, PipelineError, PipelineResult};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{Config, DEFAULT_BATCH_SIZE, OUTPUT_FILE};

// =============================================================================
// Re-exports - Dates
// =============================================================================

pub use dates::{
    is_date_like,
    month_name,
    time_of_day,
    DateParser,
    DateParts,
    MONTH_NAMES,
};

// =============================================================================
// Re-exports - CSV
// =============================================================================

pub use parser::{
    cell_kind,
    detect_delimiter,
    detect_encoding,
    CellKind,
    CsvSink,
    CsvSource,
    Row,
    SourceInfo,
};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    build_mapping,
    classify_sample,
    transform_row,
    ColumnDescriptor,
    SchemaMapping,
    TransformedRow,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{run, run_with_config, transform_stream, RunSummary};
