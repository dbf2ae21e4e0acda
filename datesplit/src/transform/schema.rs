//! Column classification and the expanded header.
//!
//! The mapping is built once from the header and the first data row, then
//! reused unchanged for every row of the file.

use serde::Serialize;

use crate::dates::{DateParser, PART_SUFFIXES};
use crate::parser::{cell_kind, Row};

/// One source column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    pub name: String,
    /// Zero-based index in the source row
    pub position: usize,
    pub is_date: bool,
}

impl ColumnDescriptor {
    /// Output header(s) for this column.
    pub fn output_headers(&self) -> Vec<String> {
        if self.is_date {
            PART_SUFFIXES
                .iter()
                .map(|suffix| format!("{} {}", self.name, suffix))
                .collect()
        } else {
            vec![self.name.clone()]
        }
    }

    /// Number of output fields this column produces.
    pub fn output_width(&self) -> usize {
        if self.is_date {
            PART_SUFFIXES.len()
        } else {
            1
        }
    }
}

/// All source columns in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaMapping {
    columns: Vec<ColumnDescriptor>,
}

impl SchemaMapping {
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// First column with the given name.
    pub fn get(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn date_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|c| c.is_date)
    }

    /// Number of fields in every output row.
    pub fn output_width(&self) -> usize {
        self.columns.iter().map(ColumnDescriptor::output_width).sum()
    }

    pub fn expanded_header(&self) -> Vec<String> {
        self.columns
            .iter()
            .flat_map(ColumnDescriptor::output_headers)
            .collect()
    }
}

/// Whether a column whose first value is `sample` holds dates.
///
/// Only textual samples are considered; numbers, booleans and missing values
/// never make a date column. Parsing is strict here.
pub fn classify_sample(sample: &str, parser: &DateParser) -> bool {
    cell_kind(sample).is_text() && parser.is_date_like(sample, false)
}

/// Build the mapping from the header row and the first data row.
///
/// Without a first row every column is a plain column.
pub fn build_mapping(
    header: &[String],
    first_row: Option<&Row>,
    parser: &DateParser,
) -> (SchemaMapping, Vec<String>) {
    let columns: Vec<ColumnDescriptor> = header
        .iter()
        .enumerate()
        .map(|(position, name)| {
            let is_date = first_row
                .and_then(|row| row.get(position))
                .is_some_and(|sample| classify_sample(sample, parser));
            ColumnDescriptor {
                name: name.clone(),
                position,
                is_date,
            }
        })
        .collect();

    let mapping = SchemaMapping::new(columns);
    let header = mapping.expanded_header();
    (mapping, header)
}
