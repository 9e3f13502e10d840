//! Single-quote downloads: a one-row CSV and a two-sheet XLSX workbook.

pub mod csv_export;
pub mod xlsx;

use chrono::{DateTime, Utc};

pub use csv_export::to_csv;
pub use xlsx::to_spreadsheet;

pub const CSV_CONTENT_TYPE: &str = "text/csv";
pub const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("zip write failed: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("xml write failed: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// `calculation_YYYYMMDD_HHMMSS.<extension>`
pub fn export_filename(at: DateTime<Utc>, extension: &str) -> String {
    format!("calculation_{}.{}", at.format("%Y%m%d_%H%M%S"), extension)
}
