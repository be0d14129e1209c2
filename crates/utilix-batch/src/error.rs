use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading an input file, before any row is normalized.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported input file type: {path} (expected csv, xlsx, xlsm, xlsb, xls, or ods)")]
    UnsupportedFormat { path: PathBuf },

    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to read spreadsheet {path}: {source}")]
    Spreadsheet {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("workbook has no sheets: {path}")]
    EmptyWorkbook { path: PathBuf },

    #[error("input has no header row")]
    MissingHeader,
}

/// Errors raised while writing the result table.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("unsupported output file type: {path} (expected xlsx or csv)")]
    UnsupportedFormat { path: PathBuf },

    #[error("failed to write workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
