//! Reads CSV and spreadsheet files into ordered header/value rows.
//!
//! The first row of the file (first sheet for workbooks) is the header row.
//! Every cell is rendered as text; empty cells are left out of the row and
//! rows with no non-empty cell are skipped.

use std::io::Read;
use std::path::Path;

use calamine::{open_workbook_auto, Data, DataType, Reader};
use chrono::NaiveTime;

use crate::error::IngestError;

/// One input line as `(header, value)` pairs in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    cells: Vec<(String, String)>,
}

impl RawRow {
    #[must_use]
    pub fn from_pairs<H, V>(pairs: impl IntoIterator<Item = (H, V)>) -> Self
    where
        H: Into<String>,
        V: Into<String>,
    {
        Self {
            cells: pairs
                .into_iter()
                .map(|(h, v)| (h.into(), v.into()))
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(h, v)| (h.as_str(), v.as_str()))
    }

    /// Value of the first cell whose header matches exactly.
    #[must_use]
    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputFormat {
    Csv,
    Spreadsheet,
}

fn detect_format(path: &Path) -> Result<InputFormat, IngestError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("csv") => Ok(InputFormat::Csv),
        Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => Ok(InputFormat::Spreadsheet),
        _ => Err(IngestError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Reads every data row of a CSV or spreadsheet file.
///
/// # Errors
///
/// Returns [`IngestError`] if the extension is not supported, the file cannot
/// be opened or parsed, a workbook has no sheets, or there is no header row.
pub fn read_rows(path: &Path) -> Result<Vec<RawRow>, IngestError> {
    let rows = match detect_format(path)? {
        InputFormat::Csv => {
            let file = std::fs::File::open(path).map_err(|e| IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            })?;
            read_csv(file)?
        }
        InputFormat::Spreadsheet => read_spreadsheet(path)?,
    };
    tracing::info!(path = %path.display(), rows = rows.len(), "loaded input rows");
    Ok(rows)
}

/// Reads comma-separated text with a header row.
///
/// # Errors
///
/// Returns [`IngestError::Csv`] on malformed input and
/// [`IngestError::MissingHeader`] when the input is empty.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<RawRow>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(IngestError::MissingHeader);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row = build_row(
            &headers,
            record.iter().map(|v| Some(v.to_string()).filter(|v| !v.is_empty())),
        );
        if !row.is_empty() {
            rows.push(row);
        }
    }
    Ok(rows)
}

fn read_spreadsheet(path: &Path) -> Result<Vec<RawRow>, IngestError> {
    let spreadsheet_err = |source| IngestError::Spreadsheet {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = open_workbook_auto(path).map_err(spreadsheet_err)?;
    let Some(first_sheet) = workbook.sheet_names().first().cloned() else {
        return Err(IngestError::EmptyWorkbook {
            path: path.to_path_buf(),
        });
    };
    let range = workbook
        .worksheet_range(&first_sheet)
        .map_err(spreadsheet_err)?;

    let mut lines = range.rows();
    let headers: Vec<String> = lines
        .next()
        .ok_or(IngestError::MissingHeader)?
        .iter()
        .map(|cell| cell_text(cell).unwrap_or_default())
        .collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(IngestError::MissingHeader);
    }

    Ok(lines
        .map(|line| build_row(&headers, line.iter().map(cell_text)))
        .filter(|row| !row.is_empty())
        .collect())
}

/// Pairs values with headers, dropping empty cells, blank headers, and cells
/// past the header width.
fn build_row(headers: &[String], values: impl Iterator<Item = Option<String>>) -> RawRow {
    let cells = headers
        .iter()
        .zip(values)
        .filter(|(header, _)| !header.trim().is_empty())
        .filter_map(|(header, value)| value.map(|v| (header.clone(), v)))
        .collect();
    RawRow { cells }
}

/// Renders a spreadsheet cell as text; `None` for empty cells.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(s.clone()),
        // f64's Display drops a zero fraction, so 123.0 renders as "123".
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) if !dt.is_duration() => Some(
            cell.as_datetime()
                .map_or_else(|| cell.to_string(), |value| {
                    if value.time() == NaiveTime::MIN {
                        value.format("%Y-%m-%d").to_string()
                    } else {
                        value.format("%Y-%m-%d %H:%M:%S").to_string()
                    }
                }),
        ),
        Data::DateTimeIso(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_format_by_extension() {
        assert_eq!(detect_format(Path::new("rows.csv")).unwrap(), InputFormat::Csv);
        assert_eq!(detect_format(Path::new("ROWS.CSV")).unwrap(), InputFormat::Csv);
        assert_eq!(
            detect_format(Path::new("rows.xlsx")).unwrap(),
            InputFormat::Spreadsheet
        );
        assert_eq!(
            detect_format(Path::new("rows.xls")).unwrap(),
            InputFormat::Spreadsheet
        );
    }

    #[test]
    fn detect_format_rejects_other_extensions() {
        for name in ["rows.txt", "rows.json", "rows"] {
            let err = detect_format(Path::new(name)).unwrap_err();
            assert!(
                matches!(err, IngestError::UnsupportedFormat { .. }),
                "{name}: {err:?}"
            );
        }
    }

    #[test]
    fn read_csv_keeps_column_order_and_text() {
        let input = "APN,County,State,Owner\n123-456.789,Lee,fl,Smith\n";
        let rows = read_csv(input.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        let pairs: Vec<_> = rows[0].iter().collect();
        assert_eq!(
            pairs,
            vec![
                ("APN", "123-456.789"),
                ("County", "Lee"),
                ("State", "fl"),
                ("Owner", "Smith")
            ]
        );
    }

    #[test]
    fn read_csv_omits_empty_cells_and_short_rows() {
        let input = "apn,address,county,state\nAAA,,Lee\n";
        let rows = read_csv(input.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("apn"), Some("AAA"));
        assert_eq!(rows[0].get("address"), None);
        assert_eq!(rows[0].get("county"), Some("Lee"));
        assert_eq!(rows[0].get("state"), None);
    }

    #[test]
    fn read_csv_skips_blank_lines() {
        let input = "apn,county\nAAA,Lee\n,\n\nBBB,Lee\n";
        let rows = read_csv(input.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get("apn"), Some("BBB"));
    }

    #[test]
    fn read_csv_ignores_cells_past_header_width() {
        let input = "apn\nAAA,extra\n";
        let rows = read_csv(input.as_bytes()).unwrap();
        assert_eq!(rows[0].len(), 1);
    }

    #[test]
    fn read_csv_strips_byte_order_mark() {
        let input = "\u{feff}apn,county\nAAA,Lee\n";
        let rows = read_csv(input.as_bytes()).unwrap();
        assert_eq!(rows[0].get("apn"), Some("AAA"));
    }

    #[test]
    fn read_csv_empty_input_has_no_header() {
        let err = read_csv("".as_bytes()).unwrap_err();
        assert!(matches!(err, IngestError::MissingHeader), "got: {err:?}");
    }

    #[test]
    fn read_csv_header_only_yields_no_rows() {
        let rows = read_csv("apn,county\n".as_bytes()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn cell_text_renders_numbers_without_fraction() {
        assert_eq!(cell_text(&Data::Float(123.0)).as_deref(), Some("123"));
        assert_eq!(cell_text(&Data::Float(12.5)).as_deref(), Some("12.5"));
        assert_eq!(cell_text(&Data::Int(42)).as_deref(), Some("42"));
        assert_eq!(cell_text(&Data::Bool(true)).as_deref(), Some("TRUE"));
        assert_eq!(cell_text(&Data::Empty), None);
        assert_eq!(cell_text(&Data::String(String::new())), None);
    }

    #[test]
    fn spreadsheet_dates_render_as_calendar_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dates.xlsx");
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        let date = rust_xlsxwriter::Format::new().set_num_format("yyyy-mm-dd");
        let stamp = rust_xlsxwriter::Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");
        sheet.write_string(0, 0, "apn").unwrap();
        sheet.write_string(0, 1, "recorded").unwrap();
        sheet.write_string(1, 0, "AAA").unwrap();
        sheet.write_number_with_format(1, 1, 45292.0, &date).unwrap();
        sheet.write_string(2, 0, "BBB").unwrap();
        sheet.write_number_with_format(2, 1, 45292.5, &stamp).unwrap();
        workbook.save(&path).unwrap();

        let rows = read_rows(&path).unwrap();
        assert_eq!(rows[0].get("recorded"), Some("2024-01-01"));
        assert_eq!(rows[1].get("recorded"), Some("2024-01-01 12:00:00"));
    }

    #[test]
    fn empty_first_sheet_has_no_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.xlsx");
        let mut workbook = rust_xlsxwriter::Workbook::new();
        workbook.add_worksheet();
        workbook.save(&path).unwrap();

        let err = read_rows(&path).unwrap_err();
        assert!(matches!(err, IngestError::MissingHeader), "got: {err:?}");
    }

    #[test]
    fn blank_header_row_in_spreadsheet_has_no_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank_header.xlsx");
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "   ").unwrap();
        workbook.save(&path).unwrap();

        let err = read_rows(&path).unwrap_err();
        assert!(matches!(err, IngestError::MissingHeader), "got: {err:?}");
    }

    #[test]
    fn read_rows_missing_file_is_read_error() {
        let err = read_rows(Path::new("/nonexistent/utilix/rows.csv")).unwrap_err();
        assert!(matches!(err, IngestError::FileRead { .. }), "got: {err:?}");
    }
}
