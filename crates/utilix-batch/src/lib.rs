pub mod error;
pub mod export;
pub mod ingest;
pub mod normalize;
pub mod pacing;
pub mod runner;

pub use error::{ExportError, IngestError};
pub use export::{export_results, Cell, ResultTable, DEFAULT_OUTPUT_FILE, RESULTS_SHEET};
pub use ingest::{read_csv, read_rows, RawRow};
pub use normalize::normalize_rows;
pub use pacing::{FixedDelay, Pacer};
pub use runner::{BatchReport, BatchRunner};
