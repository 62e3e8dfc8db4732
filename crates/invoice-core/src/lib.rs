//! invoice-core: Core library for comparing two invoice tables
//!
//! This library provides functionality to:
//! - Load invoice tables from spreadsheets (xlsx, xls, ods) or CSV files
//! - Normalize headers and check that the key column exists on both sides
//! - Outer-join the two tables on the key column
//! - Flag quantity and price differences and items missing from either side
//! - Write a highlighted comparison report (xlsx), or plain csv/json

pub mod classify;
pub mod compare;
pub mod config;
pub mod error;
pub mod highlight;
pub mod joiner;
pub mod parser;
pub mod report;
pub mod schema;
pub mod table;

pub use classify::{classify, ComparedFields, DiscrepancyFlags};
pub use compare::{compare_files, compare_tables, CombinedRecord, Comparison, ComparisonSummary};
pub use config::CompareConfig;
pub use error::{Error, MissingIn, Result};
pub use highlight::{band_for, Band};
pub use joiner::{outer_join, JoinedRow, JoinedTable};
pub use parser::{load_table, parse_csv, parse_csv_str, parse_spreadsheet};
pub use report::{
    write_csv, write_json, write_report, write_xlsx, xlsx_bytes, ExportResult, ReportCell,
    ReportColumn, ReportFormat, ReportLayout, DEFAULT_REPORT_NAME,
};
pub use schema::{normalize_columns, validate_key};
pub use table::{CellValue, Column, Row, Table};
