//! Readers that turn invoice files (spreadsheets or CSV) into tables

use crate::error::{Error, Result};
use crate::table::{CellValue, Column, Row, Table};
use calamine::{open_workbook_auto, Data, Reader};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Spreadsheet extensions handed to calamine
const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// Load an invoice table, choosing the reader from the file extension
pub fn load_table<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if ext == "csv" {
        parse_csv(path)
    } else if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
        parse_spreadsheet(path)
    } else {
        Err(Error::UnsupportedFormat {
            path: path.to_path_buf(),
        })
    }
}

/// Parse the first worksheet of a spreadsheet file into a Table
pub fn parse_spreadsheet<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let mut workbook = open_workbook_auto(path).map_err(|e| Error::Spreadsheet {
        path: path.to_path_buf(),
        source: e,
    })?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| Error::InvalidInput {
            path: path.to_path_buf(),
            message: "workbook contains no sheets".to_string(),
        })?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| Error::Spreadsheet {
            path: path.to_path_buf(),
            source: e,
        })?;
    log::debug!(
        "reading sheet '{}' of {} ({}x{})",
        sheet_name,
        path.display(),
        range.height(),
        range.width()
    );

    let mut rows = range.rows();
    let header = rows.next().ok_or_else(|| Error::InvalidInput {
        path: path.to_path_buf(),
        message: format!("sheet '{}' has no header row", sheet_name),
    })?;
    let headers: Vec<String> = header
        .iter()
        .map(|d| match d {
            Data::String(s) => s.clone(),
            other => data_to_cell(other).to_string_value(),
        })
        .collect();

    let records = rows.map(|r| {
        let cells = r.iter().map(data_to_cell).collect();
        let text = r.iter().map(data_source_text).collect();
        Row::with_source_text(cells, text)
    });
    build_table(path.to_path_buf(), headers, records)
}

/// Convert a calamine cell into a CellValue.
///
/// Text is trimmed the same way CSV fields are; the untrimmed text is kept
/// by [`data_source_text`].
fn data_to_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                CellValue::Empty
            } else {
                CellValue::String(trimmed.to_string())
            }
        }
        // Dates, booleans and error cells keep their display text
        other => CellValue::parse(&other.to_string()),
    }
}

/// Exact text of a string cell; typed cells have none
fn data_source_text(data: &Data) -> Option<String> {
    match data {
        Data::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// Parse a CSV file into a Table
pub fn parse_csv<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    read_csv(BufReader::new(file), path.to_path_buf())
}

/// Parse CSV from a string (useful for testing)
pub fn parse_csv_str(content: &str, source_name: &str) -> Result<Table> {
    read_csv(content.as_bytes(), PathBuf::from(source_name))
}

fn read_csv<R: std::io::Read>(reader: R, path: PathBuf) -> Result<Table> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // Allow varying number of fields
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(|e| Error::Csv {
            path: path.clone(),
            source: e,
        })?
        .iter()
        .map(str::to_string)
        .collect();

    let mut records = Vec::new();
    for result in csv_reader.records() {
        let record = result.map_err(|e| Error::Csv {
            path: path.clone(),
            source: e,
        })?;
        let cells = record.iter().map(CellValue::parse).collect();
        let text = record.iter().map(|field| Some(field.to_string())).collect();
        records.push(Row::with_source_text(cells, text));
    }

    build_table(path, headers, records)
}

/// Assemble a Table from a header and raw cell rows.
///
/// Rows shorter than the header are padded with empty cells, longer rows are
/// truncated. Rows with no values at all are skipped.
fn build_table<I>(path: PathBuf, headers: Vec<String>, records: I) -> Result<Table>
where
    I: IntoIterator<Item = Row>,
{
    let columns: Vec<Column> = headers
        .into_iter()
        .enumerate()
        .map(|(i, name)| Column::new(name, i))
        .collect();

    if columns.is_empty() || columns.iter().all(|c| c.name.trim().is_empty()) {
        return Err(Error::InvalidInput {
            path,
            message: "no columns found in header row".to_string(),
        });
    }

    let mut rows = Vec::new();
    for (row_idx, mut row) in records.into_iter().enumerate() {
        if row.cells.iter().all(CellValue::is_empty) {
            continue;
        }

        if row.cells.len() > columns.len() {
            log::warn!(
                "row {} in {} has more cells than columns, truncating",
                row_idx + 1,
                path.display()
            );
        }
        row.cells.resize(columns.len(), CellValue::Empty);
        if !row.source_text.is_empty() {
            row.source_text.resize(columns.len(), None);
        }

        rows.push(row);
    }

    log::debug!(
        "loaded {} rows x {} columns from {}",
        rows.len(),
        columns.len(),
        path.display()
    );

    Ok(Table {
        columns,
        rows,
        source_path: path,
    })
}
