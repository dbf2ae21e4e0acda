//! Per-row expansion of date columns.

use crate::dates::{DateParser, DateParts, PART_SUFFIXES};
use crate::error::{DateParseError, DateResult};
use crate::parser::{cell_kind, CellKind, Row};

use super::schema::SchemaMapping;

/// A date cell that could not be expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellFailure {
    /// Source column position
    pub position: usize,
    pub error: DateParseError,
}

impl CellFailure {
    /// The cell had no value at all.
    pub fn is_missing(&self) -> bool {
        self.error == DateParseError::Missing
    }
}

/// Output fields for one source row, plus any date cells left blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformedRow {
    pub fields: Vec<String>,
    pub failures: Vec<CellFailure>,
}

/// Expand one date cell into year, month, day and time of day.
///
/// Missing values and text that does not parse even fuzzily are both errors;
/// the caller decides what to emit instead.
pub fn expand_date_cell(raw: &str, parser: &DateParser) -> DateResult<[String; 4]> {
    if cell_kind(raw) == CellKind::Missing {
        return Err(DateParseError::Missing);
    }
    let parsed = parser.parse(raw, true)?;
    Ok(DateParts::from_datetime(&parsed).into_fields())
}

/// Transform one source row.
///
/// Date columns become four fields, or four empty fields when the value
/// cannot be read as a date. Other columns are copied as written.
pub fn transform_row(row: &Row, mapping: &SchemaMapping, parser: &DateParser) -> TransformedRow {
    let mut fields = Vec::with_capacity(mapping.output_width());
    let mut failures = Vec::new();

    for column in mapping.columns() {
        let raw = row.get(column.position).map(String::as_str).unwrap_or("");

        if !column.is_date {
            fields.push(raw.to_string());
            continue;
        }

        match expand_date_cell(raw, parser) {
            Ok(parts) => fields.extend(parts),
            Err(error) => {
                fields.extend(std::iter::repeat(String::new()).take(PART_SUFFIXES.len()));
                failures.push(CellFailure {
                    position: column.position,
                    error,
                });
            }
        }
    }

    TransformedRow { fields, failures }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::schema::ColumnDescriptor;
    use chrono::NaiveDate;

    fn parser() -> DateParser {
        DateParser::with_reference(
            NaiveDate::from_ymd_opt(2024, 3, 10)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        )
    }

    fn mapping() -> SchemaMapping {
        SchemaMapping::new(vec![
            ColumnDescriptor {
                name: "Date".into(),
                position: 0,
                is_date: true,
            },
            ColumnDescriptor {
                name: "Amount".into(),
                position: 1,
                is_date: false,
            },
        ])
    }

    fn row(values: &[&str]) -> Row {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_morning_row() {
        let out = transform_row(&row(&["2023-05-14T09:15:00", "42"]), &mapping(), &parser());
        assert_eq!(out.fields, vec!["2023", "May", "14", "Morning", "42"]);
        assert!(out.failures.is_empty());
    }

    #[test]
    fn test_night_row_without_padding() {
        let out = transform_row(&row(&["2023-12-01T22:00:00", "7"]), &mapping(), &parser());
        assert_eq!(out.fields, vec!["2023", "December", "1", "Night", "7"]);
    }

    #[test]
    fn test_date_without_time_has_empty_bucket() {
        let out = transform_row(&row(&["2023-07-04", "1"]), &mapping(), &parser());
        assert_eq!(out.fields, vec!["2023", "July", "4", "", "1"]);
    }

    #[test]
    fn test_malformed_date_blanks_only_its_fields() {
        let out = transform_row(&row(&["notadate", "5"]), &mapping(), &parser());
        assert_eq!(out.fields, vec!["", "", "", "", "5"]);
        assert_eq!(out.failures.len(), 1);
        assert!(!out.failures[0].is_missing());
        assert_eq!(out.failures[0].position, 0);
    }

    #[test]
    fn test_missing_date_blanks_only_its_fields() {
        let out = transform_row(&row(&["", "5"]), &mapping(), &parser());
        assert_eq!(out.fields, vec!["", "", "", "", "5"]);
        assert!(out.failures[0].is_missing());
    }

    #[test]
    fn test_fuzzy_parsing_in_rows() {
        let out = transform_row(
            &row(&["closed May 5 2022 at 4:45 pm", "x"]),
            &mapping(),
            &parser(),
        );
        assert_eq!(out.fields, vec!["2022", "May", "5", "Evening", "x"]);
    }

    #[test]
    fn test_fullwidth_digits_blank_the_date() {
        let out = transform_row(&row(&["２０２３年５月１４日", "2"]), &mapping(), &parser());
        assert_eq!(out.fields, vec!["", "", "", "", "2"]);
        assert!(!out.failures[0].is_missing());
    }

    #[test]
    fn test_plain_values_pass_through_verbatim() {
        let out = transform_row(&row(&["2023-01-01", " 0042.50 "]), &mapping(), &parser());
        assert_eq!(out.fields[4], " 0042.50 ");
    }

    #[test]
    fn test_output_width_matches_mapping() {
        let m = mapping();
        for values in [["2023-01-01", "1"], ["", ""], ["bad", "x"]] {
            let out = transform_row(&row(&values), &m, &parser());
            assert_eq!(out.fields.len(), m.output_width());
        }
    }
}
