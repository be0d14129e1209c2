//! Flattens batch results into a table and writes it as xlsx or csv.
//!
//! Failures flatten to the same columns as successes: the apn, `false` for
//! the three core availability flags, and empty cells everywhere else.

use std::collections::BTreeSet;
use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use utilix_core::{LookupResult, ParcelUtilityInfo};

use crate::error::ExportError;

pub const DEFAULT_OUTPUT_FILE: &str = "utilix_results.xlsx";
pub const RESULTS_SHEET: &str = "UTILIX Results";

/// Longest string an xlsx cell can hold, in characters.
pub const XLSX_MAX_CELL_CHARS: usize = 32_767;

const FIXED_COLUMNS: [&str; 13] = [
    "row",
    "apn",
    "electric_available",
    "electric_provider",
    "water_available",
    "water_provider",
    "sewer_available",
    "sewer_provider",
    "well_available",
    "well_use",
    "septic_present",
    "sewer_connected",
    "water_connected",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Bool(bool),
    Number(f64),
}

impl Cell {
    fn text(value: Option<&str>) -> Self {
        value.map_or(Cell::Empty, |v| Cell::Text(v.to_string()))
    }

    fn flag(value: Option<bool>) -> Self {
        value.map_or(Cell::Empty, Cell::Bool)
    }

    fn from_json(value: Option<&serde_json::Value>) -> Self {
        match value {
            None | Some(serde_json::Value::Null) => Cell::Empty,
            Some(serde_json::Value::Bool(b)) => Cell::Bool(*b),
            Some(serde_json::Value::Number(n)) => n.as_f64().map_or(Cell::Empty, Cell::Number),
            Some(serde_json::Value::String(s)) => Cell::Text(s.clone()),
            Some(other) => Cell::Text(other.to_string()),
        }
    }

    fn to_csv_field(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Bool(true) => "TRUE".to_string(),
            Cell::Bool(false) => "FALSE".to_string(),
            Cell::Number(n) => n.to_string(),
        }
    }
}

/// Results flattened to one row per lookup with a uniform column set.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl ResultTable {
    #[must_use]
    pub fn from_results(results: &[LookupResult]) -> Self {
        let extra_columns: BTreeSet<&str> = results
            .iter()
            .filter_map(|r| match r {
                LookupResult::Success { info, .. } => Some(info.extra.keys()),
                LookupResult::Failure { .. } => None,
            })
            .flatten()
            .map(String::as_str)
            .filter(|key| !FIXED_COLUMNS.contains(key))
            .collect();

        let columns = FIXED_COLUMNS
            .iter()
            .copied()
            .chain(extra_columns.iter().copied())
            .map(str::to_string)
            .collect();

        let rows = results
            .iter()
            .map(|result| {
                let info = result.utility_info();
                #[allow(clippy::cast_precision_loss)]
                let row_number = result.row_index() as f64;
                let mut row = fixed_cells(row_number, &info);
                row.extend(
                    extra_columns
                        .iter()
                        .map(|key| Cell::from_json(info.extra.get(*key))),
                );
                row
            })
            .collect();

        Self { columns, rows }
    }

    /// Writes the table as an xlsx workbook or csv file, chosen by extension.
    /// An existing file at `path` is overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::UnsupportedFormat`] for other extensions, or the
    /// underlying writer error.
    pub fn write(&self, path: &Path) -> Result<(), ExportError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("xlsx") => self.write_xlsx(path),
            Some("csv") => self.write_csv(path),
            _ => Err(ExportError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    fn write_xlsx(&self, path: &Path) -> Result<(), ExportError> {
        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();
        let sheet = workbook.add_worksheet();
        sheet.set_name(RESULTS_SHEET)?;

        for (col, name) in self.columns.iter().enumerate() {
            sheet.write_string_with_format(0, column_number(col)?, name.as_str(), &header_format)?;
        }

        for (idx, cells) in self.rows.iter().enumerate() {
            let row = u32::try_from(idx + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
            for (col, cell) in cells.iter().enumerate() {
                let col = column_number(col)?;
                match cell {
                    Cell::Empty => {}
                    Cell::Text(s) => {
                        let text = xlsx_cell_text(s).unwrap_or_else(|cut| {
                            tracing::warn!(
                                row,
                                column = %self.columns[usize::from(col)],
                                chars = s.chars().count(),
                                "text exceeds xlsx cell limit; truncating"
                            );
                            cut
                        });
                        sheet.write_string(row, col, text)?;
                    }
                    Cell::Bool(b) => {
                        sheet.write_boolean(row, col, *b)?;
                    }
                    Cell::Number(n) => {
                        sheet.write_number(row, col, *n)?;
                    }
                }
            }
        }

        sheet.autofit();
        workbook.save(path)?;
        Ok(())
    }

    fn write_csv(&self, path: &Path) -> Result<(), ExportError> {
        let file_err = |source| ExportError::FileWrite {
            path: path.to_path_buf(),
            source,
        };
        let file = std::fs::File::create(path).map_err(file_err)?;
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(&self.columns)?;
        for cells in &self.rows {
            writer.write_record(cells.iter().map(Cell::to_csv_field))?;
        }
        writer.flush().map_err(file_err)?;
        Ok(())
    }
}

/// `Ok` with the whole string when it fits in one cell, `Err` with the
/// longest prefix that does.
fn xlsx_cell_text(s: &str) -> Result<&str, &str> {
    match s.char_indices().nth(XLSX_MAX_CELL_CHARS) {
        None => Ok(s),
        Some((end, _)) => Err(&s[..end]),
    }
}

fn column_number(col: usize) -> Result<u16, XlsxError> {
    u16::try_from(col).map_err(|_| XlsxError::RowColumnLimitError)
}

fn fixed_cells(row_number: f64, info: &ParcelUtilityInfo) -> Vec<Cell> {
    vec![
        Cell::Number(row_number),
        Cell::Text(info.apn.clone()),
        Cell::Bool(info.electric_available),
        Cell::text(info.electric_provider.as_deref()),
        Cell::Bool(info.water_available),
        Cell::text(info.water_provider.as_deref()),
        Cell::Bool(info.sewer_available),
        Cell::text(info.sewer_provider.as_deref()),
        Cell::flag(info.well_available),
        Cell::text(info.well_use.as_deref()),
        Cell::flag(info.septic_present),
        Cell::flag(info.sewer_connected),
        Cell::flag(info.water_connected),
    ]
}

/// Flattens `results` and writes them to `path`, returning the number of data rows.
///
/// # Errors
///
/// See [`ResultTable::write`].
pub fn export_results(results: &[LookupResult], path: &Path) -> Result<usize, ExportError> {
    let table = ResultTable::from_results(results);
    table.write(path)?;
    tracing::info!(path = %path.display(), rows = table.rows.len(), "wrote lookup results");
    Ok(table.rows.len())
}
