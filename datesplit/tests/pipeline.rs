//! End-to-end runs against files on disk.

use datesplit::{run_with_config, Config, PipelineError};
use std::fs;
use tempfile::tempdir;

fn config(batch_size: usize) -> Config {
    Config::default().with_batch_size(batch_size)
}

#[test]
fn test_expands_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("sample311.csv");
    let output = dir.path().join("processed.csv");
    fs::write(
        &input,
        "Unique Key,Created Date,Complaint Type,Incident Zip\n\
         101,05/14/2023 09:15:00 AM,Noise,10001\n\
         102,12/01/2023 10:00:00 PM,\"Heat, Hot Water\",11201\n\
         103,,Noise,10001\n",
    )
    .unwrap();

    let summary = run_with_config(&input, &output, &config(2)).unwrap();

    let written = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Unique Key,Created Date Year,Created Date Month,Created Date Day,Created Date Time Of Day,Complaint Type,Incident Zip",
            "101,2023,May,14,Morning,Noise,10001",
            "102,2023,December,1,Night,\"Heat, Hot Water\",11201",
            "103,,,,,Noise,10001",
        ]
    );
    assert_eq!(summary.rows, 3);
    assert_eq!(summary.batches, 2);
    assert_eq!(summary.missing_dates, 1);
    assert_eq!(summary.output.as_deref(), Some(output.as_path()));
}

#[test]
fn test_fullwidth_date_row_is_blanked() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("export.csv");
    let output = dir.path().join("processed.csv");
    fs::write(&input, "Date,Amount\n2023-05-14,1\n２０２３年５月１４日,2\n").unwrap();

    let summary = run_with_config(&input, &output, &config(10)).unwrap();

    let written = fs::read_to_string(&output).unwrap();
    assert_eq!(
        written,
        "Date Year,Date Month,Date Day,Date Time Of Day,Amount\n2023,May,14,,1\n,,,,2\n"
    );
    assert_eq!(summary.malformed_dates, 1);
}

#[test]
fn test_invalid_path_leaves_no_output() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("processed.csv");

    let err = run_with_config(&dir.path().join("missing.csv"), &output, &config(10)).unwrap_err();

    assert!(matches!(err, PipelineError::InvalidPath { .. }));
    assert_eq!(err.to_string(), "Please provide a valid file path");
    assert!(!output.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_directory_is_not_a_valid_source() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("processed.csv");

    let err = run_with_config(dir.path(), &output, &config(10)).unwrap_err();

    assert!(matches!(err, PipelineError::InvalidPath { .. }));
    assert!(!output.exists());
}

#[test]
fn test_replaces_previous_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.csv");
    let output = dir.path().join("processed.csv");
    fs::write(&output, "stale\n").unwrap();
    fs::write(&input, "Date,Amount\n2023-05-14T09:15:00,42\n").unwrap();

    run_with_config(&input, &output, &config(10)).unwrap();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "Date Year,Date Month,Date Day,Date Time Of Day,Amount\n2023,May,14,Morning,42\n"
    );
}

#[test]
fn test_empty_source_is_an_error_without_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("empty.csv");
    let output = dir.path().join("processed.csv");
    fs::write(&input, "").unwrap();

    let err = run_with_config(&input, &output, &config(10)).unwrap_err();

    assert!(matches!(err, PipelineError::Csv(_)));
    assert!(!output.exists());
}

#[test]
fn test_semicolon_source_writes_commas() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.csv");
    let output = dir.path().join("processed.csv");
    fs::write(&input, "Datum;Betrag\n14.05.2023 18:05;3,50\n").unwrap();

    run_with_config(&input, &output, &config(10)).unwrap();

    let written = fs::read_to_string(&output).unwrap();
    assert_eq!(
        written,
        "Datum Year,Datum Month,Datum Day,Datum Time Of Day,Betrag\n2023,May,14,Evening,\"3,50\"\n"
    );
}
