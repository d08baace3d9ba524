use std::fs;
use std::path::{Path, PathBuf};

use calamine::{open_workbook, Data, Reader, Xlsx};
use clap::Parser;
use squirrel_tally::{run_job, Args, TallyError};

const CENSUS_CSV: &str = r#"Area Name,Area ID,Park Name,Number of Squirrels,"Total Time (in minutes, if available)"
UPPER MANHATTAN,A,Fort Tryon Park,9,45
UPPER MANHATTAN,A,J. Hood Wright Park,5,
CENTRAL MANHATTAN,B,Central Park,14,~60
,C,Unlisted Park,100,100
LOWER MANHATTAN,C,Battery Park,14,22.5
"#;

fn args(root: &Path, csv_file: &str) -> Args {
    Args::try_parse_from([
        "squirrel-tally",
        "--storage-account",
        "censusdata",
        "--input-container",
        "raw",
        "--output-container",
        "reports",
        "--csv-file",
        csv_file,
        "--storage-root",
        root.to_str().unwrap(),
    ])
    .unwrap()
}

fn seed_input(root: &Path, name: &str, contents: &str) -> PathBuf {
    let container = root.join("censusdata").join("raw");
    fs::create_dir_all(&container).unwrap();
    let path = container.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn sheet_rows(path: &Path) -> Vec<Vec<Data>> {
    let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
    let range = workbook.worksheet_range("Sheet1").unwrap();
    range.rows().map(|row| row.to_vec()).collect()
}

#[test]
fn aggregates_census_into_workbook() {
    let root = tempfile::tempdir().unwrap();
    seed_input(root.path(), "census.csv", CENSUS_CSV);

    let result = run_job(&args(root.path(), "census.csv")).unwrap();

    let expected_path = root.path().join("censusdata/reports/squirrel_output.xlsx");
    assert_eq!(result.output_path, expected_path);
    assert_eq!(result.read_stats.rows_read, 5);
    assert_eq!(result.read_stats.coerced_cells, 1);
    assert_eq!(result.aggregation_stats.rows_dropped, 1);
    assert_eq!(result.aggregation_stats.distinct_areas, 3);
    assert_eq!(result.aggregation_stats.total_squirrels, 42);

    let rows = sheet_rows(&expected_path);
    let s = |v: &str| Data::String(v.to_string());
    assert_eq!(
        rows,
        vec![
            vec![s("Area Name"), s("Total Squirrels"), s("Total Observation Time")],
            vec![s("UPPER MANHATTAN"), Data::Float(14.0), Data::Float(45.0)],
            vec![s("CENTRAL MANHATTAN"), Data::Float(14.0), Data::Float(0.0)],
            vec![s("LOWER MANHATTAN"), Data::Float(14.0), Data::Float(22.5)],
        ]
    );
}

#[test]
fn rerunning_overwrites_with_identical_output() {
    let root = tempfile::tempdir().unwrap();
    seed_input(root.path(), "census.csv", CENSUS_CSV);

    let first = run_job(&args(root.path(), "census.csv")).unwrap();
    let first_rows = sheet_rows(&first.output_path);
    let second = run_job(&args(root.path(), "census.csv")).unwrap();

    assert_eq!(first.rows, second.rows);
    assert_eq!(first_rows, sheet_rows(&second.output_path));
}

#[test]
fn nested_output_file_gets_its_directory() {
    let root = tempfile::tempdir().unwrap();
    seed_input(root.path(), "census.csv", CENSUS_CSV);

    let job_args = Args {
        output_file: "2018/summary.xlsx".to_string(),
        ..args(root.path(), "census.csv")
    };
    let result = run_job(&job_args).unwrap();
    assert!(result.output_path.ends_with("reports/2018/summary.xlsx"));
    assert!(result.output_path.is_file());
}

#[test]
fn header_only_csv_writes_header_only_sheet() {
    let root = tempfile::tempdir().unwrap();
    seed_input(
        root.path(),
        "empty.csv",
        "Area Name,Number of Squirrels,\"Total Time (in minutes, if available)\"\n",
    );

    let result = run_job(&args(root.path(), "empty.csv")).unwrap();
    assert!(result.rows.is_empty());
    assert_eq!(sheet_rows(&result.output_path).len(), 1);
}

#[test]
fn missing_column_fails_without_output() {
    let root = tempfile::tempdir().unwrap();
    seed_input(root.path(), "bad.csv", "Area Name,Number of Squirrels\nCentral Park,3\n");

    let err = run_job(&args(root.path(), "bad.csv")).unwrap_err();
    match err.downcast_ref::<TallyError>() {
        Some(TallyError::Schema { missing }) => {
            assert_eq!(missing, &vec!["Total Time (in minutes, if available)".to_string()]);
        }
        other => panic!("expected schema error, got {other:?}"),
    }
    assert!(!root
        .path()
        .join("censusdata/reports/squirrel_output.xlsx")
        .exists());
}

#[test]
fn missing_input_container_fails() {
    let root = tempfile::tempdir().unwrap();
    assert!(run_job(&args(root.path(), "census.csv")).is_err());
}
