/// Index table output.
///
/// Rows are years, columns the 12 calendar months, cells the index value or
/// empty for a missing month. The same table is written to every configured
/// directory.

use std::path::PathBuf;

use crate::model::{MONTH_LABELS, MonthlyTable, SoiError};
use crate::output::staged::OutputBatch;

/// Renders `table` as CSV text with a `year,Jan,...,Dec` header.
pub fn render_table_csv(table: &MonthlyTable) -> Result<String, SoiError> {
    let output_error = |message: String| SoiError::Output {
        path: "<memory>".to_string(),
        message,
    };

    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["year"];
    header.extend(MONTH_LABELS);
    writer
        .write_record(&header)
        .map_err(|e| output_error(e.to_string()))?;

    for (year, row) in table.rows() {
        let mut record = Vec::with_capacity(13);
        record.push(year.to_string());
        record.extend(row.iter().map(|v| v.map(|x| x.to_string()).unwrap_or_default()));
        writer
            .write_record(&record)
            .map_err(|e| output_error(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| output_error(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| output_error(e.to_string()))
}

/// Writes `contents` to `<dir>/<file_name>` for every dir, creating
/// directories as needed. Returns the written paths; on error none of them
/// is written.
pub fn write_to_dirs(contents: &str, dirs: &[PathBuf], file_name: &str) -> Result<Vec<PathBuf>, SoiError> {
    let mut batch = OutputBatch::new();
    batch.add(contents, dirs, file_name);
    batch.commit()
}

/// Renders the table once and fans it out to every directory.
pub fn write_table(table: &MonthlyTable, dirs: &[PathBuf], file_name: &str) -> Result<Vec<PathBuf>, SoiError> {
    let csv_text = render_table_csv(table)?;
    write_to_dirs(&csv_text, dirs, file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> MonthlyTable {
        let mut table = MonthlyTable::new("SOI");
        let mut row = [Some(0.5); 12];
        row[1] = Some(-1.25);
        row[11] = None;
        table.insert(2023, row);
        table.insert(2024, [None; 12]);
        table
    }

    #[test]
    fn test_csv_has_header_and_one_row_per_year() {
        let text = render_table_csv(&sample_table()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "year,Jan,Feb,Mar,Apr,May,Jun,Jul,Aug,Sep,Oct,Nov,Dec");
        assert_eq!(lines[1], "2023,0.5,-1.25,0.5,0.5,0.5,0.5,0.5,0.5,0.5,0.5,0.5,");
    }

    #[test]
    fn test_missing_cells_are_empty() {
        let text = render_table_csv(&sample_table()).unwrap();
        let last = text.lines().last().unwrap();
        assert_eq!(last, "2024,,,,,,,,,,,,");
    }

    #[test]
    fn test_table_is_written_to_every_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = vec![tmp.path().join("a"), tmp.path().join("nested/b")];
        let written = write_table(&sample_table(), &dirs, "SOI.csv").unwrap();
        assert_eq!(written.len(), 2);
        for path in &written {
            let text = std::fs::read_to_string(path).unwrap();
            assert!(text.starts_with("year,Jan"));
        }
    }

    #[test]
    fn test_unwritable_dir_is_output_error() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        // A regular file where a directory is expected
        let result = write_table(&sample_table(), &[blocker.join("sub")], "SOI.csv");
        assert!(matches!(result, Err(SoiError::Output { .. })));
    }

    #[test]
    fn test_failed_fan_out_leaves_earlier_dirs_untouched() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let dirs = vec![tmp.path().join("first"), blocker.join("second")];

        assert!(write_table(&sample_table(), &dirs, "SOI.csv").is_err());
        assert!(!tmp.path().join("first/SOI.csv").exists());
    }
}
