use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Instant;

use csv::StringRecord;
use tracing::{info, warn};

use crate::error::{Result, TallyError};
use crate::records::InputRow;
use crate::schema::{self, Cell, ColumnIndex};
use crate::stats::ReadStats;

pub fn read_rows(path: &Path) -> Result<(Vec<InputRow>, ReadStats)> {
    info!(action = "open", component = "csv_reader", path = ?path, "Opening census CSV");
    let file = File::open(path).map_err(|source| TallyError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_rows_from(file)
}

/// Reads census rows from any CSV source.
///
/// The header must contain every required column; other columns are ignored.
/// Cells that do not fit their column type are read as null and counted in
/// [`ReadStats::coerced_cells`].
pub fn read_rows_from<R: Read>(input: R) -> Result<(Vec<InputRow>, ReadStats)> {
    let start_time = Instant::now();

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let headers: StringRecord = reader
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).into_owned())
        .collect();
    let columns = ColumnIndex::resolve(&headers)?;
    info!(
        action = "resolve",
        component = "csv_reader",
        area_name = columns.area_name,
        squirrel_count = columns.squirrel_count,
        observation_minutes = columns.observation_minutes,
        "Resolved required columns"
    );

    let mut rows = Vec::new();
    let mut stats = ReadStats::default();

    // Byte records: invalid UTF-8 in ignored columns must not fail the read,
    // and required cells decode with U+FFFD replacement.
    for result in reader.byte_records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let field = |index: usize| String::from_utf8_lossy(record.get(index).unwrap_or_default());
        let count_cell = field(columns.squirrel_count);
        let minutes_cell = field(columns.observation_minutes);

        let squirrel_count = coerce(
            schema::parse_count(&count_cell),
            schema::SQUIRREL_COUNT,
            &count_cell,
            line,
            &mut stats,
        );
        let observation_minutes = coerce(
            schema::parse_minutes(&minutes_cell),
            schema::OBSERVATION_MINUTES,
            &minutes_cell,
            line,
            &mut stats,
        );

        rows.push(InputRow {
            area_name: schema::parse_area(&field(columns.area_name)),
            squirrel_count,
            observation_minutes,
        });
        stats.rows_read += 1;
    }

    info!(
        action = "complete",
        component = "csv_reader",
        rows_read = stats.rows_read,
        coerced_cells = stats.coerced_cells,
        duration_ms = start_time.elapsed().as_millis(),
        "Finished reading CSV"
    );

    Ok((rows, stats))
}

fn coerce<T>(cell: Cell<T>, column: &str, raw: &str, line: u64, stats: &mut ReadStats) -> Option<T> {
    if let Cell::Unparseable = cell {
        stats.coerced_cells += 1;
        warn!(
            action = "coerce",
            component = "csv_reader",
            line,
            column,
            value = raw,
            "Unparseable value read as null"
        );
    }
    cell.into_option()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "Area Name,Area ID,Number of Squirrels,\"Total Time (in minutes, if available)\"\n";

    fn read(body: &str) -> Result<(Vec<InputRow>, ReadStats)> {
        read_rows_from(format!("{HEADER}{body}").as_bytes())
    }

    #[test]
    fn reads_typed_rows() {
        let (rows, stats) = read("Central Park,A,5,10\nBattery Park,B,8,20.5\n").unwrap();
        assert_eq!(
            rows,
            vec![
                InputRow::new("Central Park", Some(5), Some(10.0)),
                InputRow::new("Battery Park", Some(8), Some(20.5)),
            ]
        );
        assert_eq!(stats, ReadStats { rows_read: 2, coerced_cells: 0 });
    }

    #[test]
    fn blank_cells_are_null() {
        let (rows, stats) = read(",A,,\n").unwrap();
        assert_eq!(rows, vec![InputRow::default()]);
        assert_eq!(stats.coerced_cells, 0);
    }

    #[test]
    fn unparseable_cells_are_counted() {
        let (rows, stats) = read("Central Park,A,many,~30\n").unwrap();
        assert_eq!(rows, vec![InputRow::new("Central Park", None, None)]);
        assert_eq!(stats.coerced_cells, 2);
    }

    #[test]
    fn short_records_fill_with_null() {
        let (rows, _) = read("Central Park,A,3\n").unwrap();
        assert_eq!(rows, vec![InputRow::new("Central Park", Some(3), None)]);
    }

    #[test]
    fn quoted_fields_may_contain_commas() {
        let (rows, _) = read("\"Park, Central\",A,2,\"15\"\n").unwrap();
        assert_eq!(rows, vec![InputRow::new("Park, Central", Some(2), Some(15.0))]);
    }

    #[test]
    fn invalid_utf8_is_decoded_lossily() {
        let mut input = HEADER.as_bytes().to_vec();
        input.extend_from_slice(b"Central Park,Caf\xE9,5,10\nBattery \xE9,B,2,\n");

        let (rows, stats) = read_rows_from(input.as_slice()).unwrap();
        assert_eq!(
            rows,
            vec![
                InputRow::new("Central Park", Some(5), Some(10.0)),
                InputRow::new("Battery \u{FFFD}", Some(2), None),
            ]
        );
        assert_eq!(stats.coerced_cells, 0);
    }

    #[test]
    fn missing_column_is_a_schema_error() {
        let err = read_rows_from("Area Name,Number of Squirrels\nCentral Park,1\n".as_bytes()).unwrap_err();
        match err {
            TallyError::Schema { missing } => assert_eq!(missing, vec![schema::OBSERVATION_MINUTES]),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn header_only_input_gives_no_rows() {
        let (rows, stats) = read("").unwrap();
        assert!(rows.is_empty());
        assert_eq!(stats.rows_read, 0);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_rows(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, TallyError::Io { .. }));
    }
}
