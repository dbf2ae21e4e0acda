//! Batch pipeline: read, classify once, expand, write.
//!
//! # Example
//!
//! ```rust,ignore
//! use datesplit::transform::pipeline::run;
//! use std::path::Path;
//!
//! let summary = run(Path::new("sample311.csv"))?;
//! println!("{} rows, {} date columns", summary.rows, summary.date_columns.len());
//! ```
//!
//! Output is staged in a temporary file next to the destination and only
//! moved into place once every batch has been written, so a failed run never
//! leaves a partial `processed.csv`.

use serde::Serialize;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::config::{Config, OUTPUT_FILE};
use crate::dates::DateParser;
use crate::error::{CsvError, CsvResult, PipelineError, PipelineResult};
use crate::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::parser::{CsvSink, CsvSource, Row, SourceInfo};

use super::row::transform_row;
use super::schema::{build_mapping, SchemaMapping};

/// Date cell failures logged individually before only counting.
const MAX_LOGGED_FAILURES: usize = 10;

/// What a run did.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub source: SourceInfo,
    pub output: Option<PathBuf>,
    pub rows: usize,
    pub batches: usize,
    pub date_columns: Vec<String>,
    /// Date cells left blank because they were empty
    pub missing_dates: usize,
    /// Date cells left blank because the text was not a date
    pub malformed_dates: usize,
}

impl RunSummary {
    fn new(source: SourceInfo) -> Self {
        Self {
            source,
            output: None,
            rows: 0,
            batches: 0,
            date_columns: Vec::new(),
            missing_dates: 0,
            malformed_dates: 0,
        }
    }
}

/// Expand `source_path` into `processed.csv` in the working directory.
pub fn run(source_path: &Path) -> PipelineResult<RunSummary> {
    run_with_config(source_path, Path::new(OUTPUT_FILE), &Config::default())
}

/// Expand `source_path` into `output_path`.
///
/// Fails with [`PipelineError::InvalidPath`] before touching the output when
/// the source cannot be opened or read.
pub fn run_with_config(
    source_path: &Path,
    output_path: &Path,
    config: &Config,
) -> PipelineResult<RunSummary> {
    log_info(format!("📖 Reading {}", source_path.display()));
    let mut source = CsvSource::open(source_path).map_err(|e| match e {
        CsvError::Io(source) => PipelineError::InvalidPath {
            path: source_path.to_path_buf(),
            source,
        },
        other => PipelineError::Csv(other),
    })?;
    log_success(format!("Detected encoding: {}", source.info().encoding));
    log_success(format!("Detected separator: '{}'", format_delimiter(source.info().delimiter)));

    let staging_dir = output_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let staging = tempfile::Builder::new()
        .prefix(".datesplit-")
        .suffix(".csv.tmp")
        .tempfile_in(staging_dir)?;

    let mut sink = CsvSink::new(staging);
    let parser = DateParser::new();
    let mut summary = transform_stream(&mut source, &mut sink, config.batch_size, &parser)?;
    let staging = sink.finish()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        staging
            .as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))?;
    }

    staging
        .persist(output_path)
        .map_err(|e| PipelineError::Persist {
            path: output_path.to_path_buf(),
            source: e.error,
        })?;

    log_success(format!("💾 Output written to: {}", output_path.display()));
    summary.output = Some(output_path.to_path_buf());
    Ok(summary)
}

/// Stream every row of `source` into `sink`.
///
/// The first batch decides the schema; the expanded header is written before
/// any data row. Each batch is fully written before the next is read.
pub fn transform_stream<R: Read, W: Write>(
    source: &mut CsvSource<R>,
    sink: &mut CsvSink<W>,
    batch_size: usize,
    parser: &DateParser,
) -> CsvResult<RunSummary> {
    let batch_size = batch_size.max(1);
    let mut summary = RunSummary::new(source.info().clone());

    let mut batch = source.next_batch(batch_size)?;
    let (mapping, header) = build_mapping(source.headers(), batch.first(), parser);
    sink.write_row(&header)?;
    log_mapping(&mapping);
    summary.date_columns = mapping.date_columns().map(|c| c.name.clone()).collect();

    while !batch.is_empty() {
        summary.batches += 1;
        write_batch(&batch, &mapping, parser, sink, &mut summary)?;
        log_info(format!(
            "⚙️  Batch {}: {} rows ({} total)",
            summary.batches,
            batch.len(),
            summary.rows
        ));
        batch = source.next_batch(batch_size)?;
    }

    if summary.missing_dates + summary.malformed_dates > 0 {
        log_warning(format!(
            "{} date cells left blank ({} empty, {} unreadable)",
            summary.missing_dates + summary.malformed_dates,
            summary.missing_dates,
            summary.malformed_dates
        ));
    }
    log_success(format!("Wrote {} rows", summary.rows));
    Ok(summary)
}

fn write_batch<W: Write>(
    batch: &[Row],
    mapping: &SchemaMapping,
    parser: &DateParser,
    sink: &mut CsvSink<W>,
    summary: &mut RunSummary,
) -> CsvResult<()> {
    for row in batch {
        let out = transform_row(row, mapping, parser);
        sink.write_row(&out.fields)?;
        summary.rows += 1;

        for failure in &out.failures {
            if failure.is_missing() {
                summary.missing_dates += 1;
            } else {
                summary.malformed_dates += 1;
            }
            if summary.missing_dates + summary.malformed_dates <= MAX_LOGGED_FAILURES {
                let column = &mapping.columns()[failure.position].name;
                log_warning(format!(
                    "Row {}, column '{}': {}",
                    summary.rows, column, failure.error
                ));
            }
        }
    }
    Ok(())
}

fn log_mapping(mapping: &SchemaMapping) {
    log_info(format!("📋 {} columns:", mapping.columns().len()));
    for column in mapping.columns() {
        let kind = if column.is_date { "date" } else { "plain" };
        log_info_indent(format!("[{:2}] {} ({})", column.position + 1, column.name, kind), 1);
    }
    if let Ok(json) = serde_json::to_string(mapping) {
        log_info(format!("Schema: {}", json));
    }
}

/// Format delimiter for display
fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}
