//! Error types for invoice-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Which input table a schema problem was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingIn {
    /// Only invoice A lacks the column
    A,
    /// Only invoice B lacks the column
    B,
    /// Neither invoice has the column
    Both,
}

impl std::fmt::Display for MissingIn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissingIn::A => write!(f, "invoice A"),
            MissingIn::B => write!(f, "invoice B"),
            MissingIn::Both => write!(f, "both invoices"),
        }
    }
}

/// Errors that can occur in invoice-core
#[derive(Debug, Error)]
pub enum Error {
    /// The key column is absent from one or both inputs
    #[error("'{key}' must be present in both files (missing from {missing_in}). Please check column names.")]
    MissingKeyColumn { key: String, missing_in: MissingIn },

    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV parsing error from the csv crate
    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Spreadsheet reading error from calamine
    #[error("failed to read spreadsheet '{path}': {source}")]
    Spreadsheet {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    /// Input is readable but has no usable header row
    #[error("invalid input '{path}': {message}")]
    InvalidInput { path: PathBuf, message: String },

    /// File extension is not a supported tabular format
    #[error("unsupported file format '{path}' (expected .xlsx, .xls, .xlsb, .ods or .csv)")]
    UnsupportedFormat { path: PathBuf },

    /// Failed to write the xlsx report
    #[error("failed to write report '{path}': {source}")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for the schema check that gates every comparison
    pub fn is_schema_error(&self) -> bool {
        matches!(self, Error::MissingKeyColumn { .. })
    }
}
