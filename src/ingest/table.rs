/// BOM monthly MSLP table parser
///
/// The Bureau publishes each station as a plain-text table wrapped in a fixed
/// HTML preamble and footer. Between them, every line is one year:
///
/// ```text
/// 1951  1012.3  1011.4  1011.9  1012.2  1013.0  1013.6  1014.1  1014.4  1013.9  1013.0  1012.8  1012.1
/// ```
///
/// The last row covers the current year and is usually ragged: months not yet
/// published are written as `*`, sometimes glued to a tab. Rows are decoded
/// by a strict decoder first; only the final row may fall back to the
/// permissive decoder, which rewrites markers to the sentinel before
/// re-tokenizing.

use crate::model::{MISSING_SENTINEL, MonthlyRow, MonthlyTable, SoiError};
use crate::stations::Station;

/// Placeholder written for months with no published mean yet.
pub const PLACEHOLDER_MARKER: char = '*';

/// Year + 12 months.
const FIELDS_PER_ROW: usize = 13;

// ---------------------------------------------------------------------------
// Row decoding
// ---------------------------------------------------------------------------

/// A decoded table row.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRow {
    pub year: i32,
    pub values: MonthlyRow,
}

/// Outcome of decoding one line of the table.
#[derive(Debug, Clone, PartialEq)]
pub enum RowDecode {
    /// Decoded as-is by the strict decoder.
    WellFormed(DecodedRow),
    /// Decoded only after marker substitution and permissive re-tokenizing.
    Repaired(DecodedRow),
    Unrecoverable { reason: String },
}

/// Decodes one data line. The permissive fallback is only attempted when
/// `is_last_row` is set.
pub fn decode_row(line: &str, is_last_row: bool) -> RowDecode {
    match decode_strict(line) {
        Ok(row) => RowDecode::WellFormed(row),
        Err(strict_reason) if is_last_row => match decode_permissive(line) {
            Ok(row) => RowDecode::Repaired(row),
            Err(reason) => RowDecode::Unrecoverable {
                reason: format!("{} (after repair: {})", strict_reason, reason),
            },
        },
        Err(reason) => RowDecode::Unrecoverable { reason },
    }
}

/// Whitespace split; 13 numeric fields plus at most one trailing annotation.
fn decode_strict(line: &str) -> Result<DecodedRow, String> {
    let mut tokens: Vec<&str> = line.split_whitespace().collect();

    if tokens.len() == FIELDS_PER_ROW + 1 && !looks_numeric(tokens[FIELDS_PER_ROW]) {
        tokens.pop(); // provisional-data annotation
    }
    if tokens.len() != FIELDS_PER_ROW {
        return Err(format!(
            "expected {} fields, found {}",
            FIELDS_PER_ROW,
            tokens.len()
        ));
    }
    if tokens.iter().any(|t| t.contains(PLACEHOLDER_MARKER)) {
        return Err("placeholder marker in well-formed row".to_string());
    }

    fields_to_row(&tokens)
}

/// Marker substitution, split on any whitespace run, empty tokens dropped.
fn decode_permissive(line: &str) -> Result<DecodedRow, String> {
    let sentinel = format!(" {} ", MISSING_SENTINEL);
    let repaired = line.replace(PLACEHOLDER_MARKER, &sentinel);

    let tokens: Vec<&str> = repaired
        .split(|c: char| c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.len() != FIELDS_PER_ROW {
        return Err(format!(
            "expected {} fields, found {}",
            FIELDS_PER_ROW,
            tokens.len()
        ));
    }

    fields_to_row(&tokens)
}

fn fields_to_row(tokens: &[&str]) -> Result<DecodedRow, String> {
    let year: i32 = tokens[0]
        .parse()
        .map_err(|_| format!("invalid year '{}'", tokens[0]))?;

    let mut values: MonthlyRow = [None; 12];
    for (cell, token) in values.iter_mut().zip(&tokens[1..]) {
        *cell = parse_value(token)?;
    }

    Ok(DecodedRow { year, values })
}

/// Converts one monthly token. Missing-value markers and the sentinel map to
/// `None`; anything else that isn't a number is an error.
pub fn parse_value(token: &str) -> Result<Option<f64>, String> {
    if is_missing_marker(token) {
        return Ok(None);
    }
    match token.parse::<f64>() {
        Ok(v) if is_sentinel(v) => Ok(None),
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(format!("malformed value '{}'", token)),
    }
}

fn is_missing_marker(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c == PLACEHOLDER_MARKER)
}

fn is_sentinel(v: f64) -> bool {
    (v - MISSING_SENTINEL).abs() < 1e-6
}

fn looks_numeric(token: &str) -> bool {
    token.parse::<f64>().is_ok() || is_missing_marker(token)
}

// ---------------------------------------------------------------------------
// Table parsing
// ---------------------------------------------------------------------------

/// Parses a full station table into a `MonthlyTable`.
///
/// Strips `station.header_lines` leading and `station.footer_lines` trailing
/// lines, ignores blank lines in between, and decodes each remaining line.
/// Any unrecoverable row, a repeated or out-of-order year, or a table without
/// data rows aborts with `SoiError::Parse`.
pub fn parse_station_table(station: &Station, text: &str) -> Result<MonthlyTable, SoiError> {
    let (table, _) = parse_station_table_with_report(station, text)?;
    Ok(table)
}

/// Same as `parse_station_table`, also reporting whether the final row had to
/// be repaired.
pub fn parse_station_table_with_report(
    station: &Station,
    text: &str,
) -> Result<(MonthlyTable, bool), SoiError> {
    let lines: Vec<&str> = text.lines().collect();

    let end = lines.len().saturating_sub(station.footer_lines);
    let data: Vec<(usize, &str)> = lines
        .iter()
        .enumerate()
        .take(end)
        .skip(station.header_lines)
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| (i + 1, *line))
        .collect();

    if data.is_empty() {
        return Err(SoiError::Parse {
            station: station.name.to_string(),
            line: 0,
            content: String::new(),
            reason: format!(
                "no data rows after skipping {} header and {} footer lines ({} lines total)",
                station.header_lines,
                station.footer_lines,
                lines.len()
            ),
        });
    }

    let mut table = MonthlyTable::new(station.name);
    let mut last_repaired = false;
    let last_index = data.len() - 1;

    for (idx, (line_no, line)) in data.iter().enumerate() {
        let parse_error = |reason: String| SoiError::Parse {
            station: station.name.to_string(),
            line: *line_no,
            content: line.to_string(),
            reason,
        };

        let row = match decode_row(line, idx == last_index) {
            RowDecode::WellFormed(row) => row,
            RowDecode::Repaired(row) => {
                last_repaired = true;
                row
            }
            RowDecode::Unrecoverable { reason } => return Err(parse_error(reason)),
        };

        if let Some(previous) = table.last_year() {
            if row.year <= previous {
                return Err(parse_error(format!(
                    "year {} does not follow {}",
                    row.year, previous
                )));
            }
        }
        table.insert(row.year, row.values);
    }

    Ok((table, last_repaired))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stations::{DARWIN, TAHITI};

    fn wrap(rows: &[&str]) -> String {
        let mut text = String::new();
        for i in 0..16 {
            text.push_str(&format!("<header line {}>\r\n", i));
        }
        for row in rows {
            text.push_str(row);
            text.push_str("\r\n");
        }
        text.push_str("</pre>\r\n</body>\r\n</html>\r\n");
        text
    }

    const ROW_1951: &str = "1951  1012.3  1011.4  1011.9  1012.2  1013.0  1013.6  1014.1  1014.4  1013.9  1013.0  1012.8  1012.1";
    const ROW_1952: &str = "1952  1011.8  1011.6  1012.4  1012.9  1013.3  1013.8  1014.0  1014.2  1013.7  1013.1  1012.6  1011.9";

    // --- Row decoding -------------------------------------------------------

    #[test]
    fn test_well_formed_row_decodes_strictly() {
        match decode_row(ROW_1951, false) {
            RowDecode::WellFormed(row) => {
                assert_eq!(row.year, 1951);
                assert_eq!(row.values[0], Some(1012.3));
                assert_eq!(row.values[11], Some(1012.1));
            }
            other => panic!("expected WellFormed, got {:?}", other),
        }
    }

    #[test]
    fn test_sentinel_in_well_formed_row_becomes_missing() {
        let line = "1960  1012.3  -999.9  1011.9  1012.2  1013.0  1013.6  1014.1  1014.4  1013.9  1013.0  1012.8  1012.1";
        match decode_row(line, false) {
            RowDecode::WellFormed(row) => assert_eq!(row.values[1], None),
            other => panic!("expected WellFormed, got {:?}", other),
        }
    }

    #[test]
    fn test_trailing_annotation_is_ignored() {
        let line = format!("{}  #", ROW_1951);
        assert!(matches!(decode_row(&line, false), RowDecode::WellFormed(_)));
    }

    #[test]
    fn test_ragged_last_row_with_markers_is_repaired() {
        let line = "2024 1011.2 1010.9 1011.7 1012.4 1013.1 *\t*\t*\t*\t*\t*\t*";
        match decode_row(line, true) {
            RowDecode::Repaired(row) => {
                assert_eq!(row.year, 2024);
                assert_eq!(row.values[4], Some(1013.1));
                assert!(row.values[5..].iter().all(|v| v.is_none()));
            }
            other => panic!("expected Repaired, got {:?}", other),
        }
    }

    #[test]
    fn test_markers_glued_to_values_are_repaired() {
        let line = "2024  1011.2  1010.9**********";
        match decode_row(line, true) {
            RowDecode::Repaired(row) => {
                assert_eq!(row.values[1], Some(1010.9));
                assert_eq!(row.values.iter().filter(|v| v.is_none()).count(), 10);
            }
            other => panic!("expected Repaired, got {:?}", other),
        }
    }

    #[test]
    fn test_ragged_row_is_unrecoverable_when_not_last() {
        let line = "2024 1011.2 1010.9 *\t*\t*\t*\t*\t*\t*\t*\t*\t*";
        assert!(matches!(
            decode_row(line, false),
            RowDecode::Unrecoverable { .. }
        ));
    }

    #[test]
    fn test_short_last_row_is_unrecoverable() {
        let line = "2024 1011.2 1010.9 *";
        match decode_row(line, true) {
            RowDecode::Unrecoverable { reason } => {
                assert!(reason.contains("expected 13 fields"), "reason: {}", reason)
            }
            other => panic!("expected Unrecoverable, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_number_is_not_treated_as_missing() {
        assert_eq!(parse_value("*"), Ok(None));
        assert_eq!(parse_value("-999.9"), Ok(None));
        assert_eq!(parse_value("1013.4"), Ok(Some(1013.4)));
        assert!(parse_value("10l3.4").is_err());
        assert!(parse_value("NaN").is_err());
    }

    // --- Table parsing ------------------------------------------------------

    #[test]
    fn test_parse_table_strips_header_and_footer() {
        let text = wrap(&[ROW_1951, ROW_1952]);
        let table = parse_station_table(&TAHITI, &text).expect("table should parse");
        assert_eq!(table.label, "Tahiti");
        assert_eq!(table.years().collect::<Vec<_>>(), vec![1951, 1952]);
        assert_eq!(table.get(1952, 7), Some(1014.0));
    }

    #[test]
    fn test_parsed_rows_never_contain_sentinel() {
        let last = "1953  1012.0  -999.9  *\t*\t*\t*\t*\t*\t*\t*\t*\t*";
        let text = wrap(&[ROW_1951, ROW_1952, last]);
        let (table, repaired) =
            parse_station_table_with_report(&DARWIN, &text).expect("table should parse");
        assert!(repaired, "last row should be reported as repaired");
        for (_, row) in table.rows() {
            assert_eq!(row.len(), 12);
            assert!(row.iter().flatten().all(|v| *v != MISSING_SENTINEL));
        }
        assert_eq!(table.get(1953, 1), Some(1012.0));
        assert_eq!(table.get(1953, 2), None);
        assert_eq!(table.missing_count(), 11);
    }

    #[test]
    fn test_unrecoverable_row_reports_line_and_content() {
        let bad = "1952  1011.8  1011.6";
        let text = wrap(&[ROW_1951, bad, ROW_1951]);
        match parse_station_table(&TAHITI, &text) {
            Err(SoiError::Parse { line, content, station, .. }) => {
                assert_eq!(line, 18, "16 header lines, then the second data row");
                assert_eq!(content, bad);
                assert_eq!(station, "Tahiti");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_order_year_is_rejected() {
        let text = wrap(&[ROW_1952, ROW_1951]);
        assert!(matches!(
            parse_station_table(&TAHITI, &text),
            Err(SoiError::Parse { .. })
        ));
    }

    #[test]
    fn test_table_without_data_rows_is_rejected() {
        let text = wrap(&[]);
        assert!(matches!(
            parse_station_table(&TAHITI, &text),
            Err(SoiError::Parse { line: 0, .. })
        ));
        assert!(parse_station_table(&TAHITI, "").is_err());
    }

    #[test]
    fn test_blank_lines_inside_data_region_are_ignored() {
        let text = wrap(&[ROW_1951, "   ", ROW_1952]);
        let table = parse_station_table(&TAHITI, &text).expect("table should parse");
        assert_eq!(table.len(), 2);
    }
}
