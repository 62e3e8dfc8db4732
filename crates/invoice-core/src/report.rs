//! Comparison report layout and writers (xlsx, csv, json)

use crate::compare::{CombinedRecord, Comparison, ComparisonSummary};
use crate::error::{Error, Result};
use crate::highlight::{band_for, Band};
use crate::table::CellValue;
use chrono::{DateTime, Utc};
use rust_xlsxwriter::{Color, Format, Workbook, Worksheet, XlsxError};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default file name of the downloadable report
pub const DEFAULT_REPORT_NAME: &str = "Invoice_Comparison.xlsx";
/// Worksheet name used in the xlsx report
pub const SHEET_NAME: &str = "Comparison";

pub const QTY_DIFF_HEADER: &str = "Qty Diff";
pub const PRICE_DIFF_HEADER: &str = "Price Diff";
pub const MISSING_IN_A_HEADER: &str = "Missing In A";
pub const MISSING_IN_B_HEADER: &str = "Missing In B";

/// Largest integer magnitude an xlsx number (f64) holds exactly
const MAX_EXACT_XLSX_INTEGER: u64 = 1 << 53;

/// Identity of one report column. Value columns carry the position of the
/// source column in [`Comparison::columns`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportColumn {
    Key,
    ValueA(usize),
    ValueB(usize),
    QtyDiff,
    PriceDiff,
    MissingInA,
    MissingInB,
}

/// One cell of a report row
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReportCell<'a> {
    /// A value from one side; `None` when absent
    Value(Option<&'a CellValue>),
    /// A discrepancy flag
    Flag(bool),
}

impl ReportCell<'_> {
    /// Plain-text rendering used by csv output and previews
    pub fn text(&self) -> String {
        match self {
            ReportCell::Value(Some(v)) => v.to_string_value(),
            ReportCell::Value(None) => String::new(),
            ReportCell::Flag(true) => "True".to_string(),
            ReportCell::Flag(false) => "False".to_string(),
        }
    }
}

/// Column order of a report: key, `<col>_A`/`<col>_B` pairs, then the flags
#[derive(Debug, Clone)]
pub struct ReportLayout {
    pub columns: Vec<ReportColumn>,
    headers: Vec<String>,
    quantity: Option<usize>,
}

impl ReportLayout {
    /// Build the layout for a comparison
    pub fn new(comparison: &Comparison) -> Self {
        let mut columns = vec![ReportColumn::Key];
        let mut headers = vec![comparison.key_column().to_string()];

        for (i, (header_a, header_b)) in comparison.side_headers().into_iter().enumerate() {
            columns.push(ReportColumn::ValueA(i));
            headers.push(header_a);
            columns.push(ReportColumn::ValueB(i));
            headers.push(header_b);
        }

        for (column, header) in [
            (ReportColumn::QtyDiff, QTY_DIFF_HEADER),
            (ReportColumn::PriceDiff, PRICE_DIFF_HEADER),
            (ReportColumn::MissingInA, MISSING_IN_A_HEADER),
            (ReportColumn::MissingInB, MISSING_IN_B_HEADER),
        ] {
            columns.push(column);
            headers.push(header.to_string());
        }

        Self {
            columns,
            headers,
            quantity: comparison.column_position(&comparison.config.quantity_column),
        }
    }

    /// Header row
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Value of one cell
    pub fn cell<'a>(&self, record: &'a CombinedRecord, column: ReportColumn) -> ReportCell<'a> {
        match column {
            ReportColumn::Key => ReportCell::Value(Some(&record.key)),
            ReportColumn::ValueA(i) => ReportCell::Value(record.values_a.get(i).and_then(Option::as_ref)),
            ReportColumn::ValueB(i) => ReportCell::Value(record.values_b.get(i).and_then(Option::as_ref)),
            ReportColumn::QtyDiff => ReportCell::Flag(record.flags.qty_diff),
            ReportColumn::PriceDiff => ReportCell::Flag(record.flags.price_diff),
            ReportColumn::MissingInA => ReportCell::Flag(record.flags.missing_in_a),
            ReportColumn::MissingInB => ReportCell::Flag(record.flags.missing_in_b),
        }
    }

    /// Highlight band of one cell
    pub fn band(&self, record: &CombinedRecord, column: ReportColumn) -> Band {
        band_for(&record.flags, column, self.quantity)
    }

    /// All cells of a record as text, in column order
    pub fn row_text(&self, record: &CombinedRecord) -> Vec<String> {
        self.columns
            .iter()
            .map(|&c| self.cell(record, c).text())
            .collect()
    }
}

/// Output format of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Xlsx,
    Csv,
    Json,
}

impl ReportFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse().ok())
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xlsx" => Ok(ReportFormat::Xlsx),
            "csv" => Ok(ReportFormat::Csv),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("unknown format '{}' (expected xlsx, csv or json)", other)),
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Xlsx => write!(f, "xlsx"),
            ReportFormat::Csv => write!(f, "csv"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

/// Result of writing a report
#[derive(Debug, Clone)]
pub struct ExportResult {
    /// File that was written
    pub path: PathBuf,
    /// Format used
    pub format: ReportFormat,
    /// Number of data rows written
    pub rows_written: usize,
    /// Number of cells given a highlight fill (xlsx only)
    pub highlighted_cells: usize,
}

/// Write a report in the given format
pub fn write_report<P: AsRef<Path>>(
    comparison: &Comparison,
    path: P,
    format: ReportFormat,
) -> Result<ExportResult> {
    let path = path.as_ref();
    let highlighted_cells = match format {
        ReportFormat::Xlsx => write_xlsx(comparison, path)?,
        ReportFormat::Csv => {
            write_csv(comparison, path)?;
            0
        }
        ReportFormat::Json => {
            write_json(comparison, path)?;
            0
        }
    };

    log::info!(
        "wrote {} report with {} rows to {}",
        format,
        comparison.record_count(),
        path.display()
    );

    Ok(ExportResult {
        path: path.to_path_buf(),
        format,
        rows_written: comparison.record_count(),
        highlighted_cells,
    })
}

/// Write the highlighted xlsx report. Returns the number of highlighted cells.
pub fn write_xlsx<P: AsRef<Path>>(comparison: &Comparison, path: P) -> Result<usize> {
    let path = path.as_ref();
    let to_err = |source| Error::ReportWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = Workbook::new();
    let highlighted = fill_worksheet(workbook.add_worksheet(), comparison).map_err(to_err)?;
    workbook.save(path).map_err(to_err)?;
    Ok(highlighted)
}

/// Render the highlighted xlsx report into memory
pub fn xlsx_bytes(comparison: &Comparison) -> Result<Vec<u8>> {
    let to_err = |source| Error::ReportWrite {
        path: PathBuf::from(DEFAULT_REPORT_NAME),
        source,
    };

    let mut workbook = Workbook::new();
    fill_worksheet(workbook.add_worksheet(), comparison).map_err(to_err)?;
    workbook.save_to_buffer().map_err(to_err)
}

fn band_format(band: Band) -> Option<Format> {
    band.color()
        .map(|rgb| Format::new().set_background_color(Color::RGB(rgb)))
}

fn fill_worksheet(
    worksheet: &mut Worksheet,
    comparison: &Comparison,
) -> std::result::Result<usize, XlsxError> {
    let layout = ReportLayout::new(comparison);
    worksheet.set_name(SHEET_NAME)?;

    let header_format = Format::new().set_bold();
    for (col, header) in layout.headers().iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header, &header_format)?;
    }
    worksheet.set_freeze_panes(1, 0)?;

    let formats = [Band::PriceDiff, Band::QtyDiff, Band::Missing].map(|b| (b, band_format(b)));
    let format_for = |band: Band| {
        formats
            .iter()
            .find(|(b, _)| *b == band)
            .and_then(|(_, f)| f.as_ref())
    };

    let mut highlighted = 0;
    for (row_idx, record) in comparison.records.iter().enumerate() {
        let row = (row_idx + 1) as u32;
        for (col_idx, &column) in layout.columns.iter().enumerate() {
            let col = col_idx as u16;
            let band = layout.band(record, column);
            if band.is_highlighted() {
                highlighted += 1;
            }
            write_cell(worksheet, row, col, layout.cell(record, column), format_for(band))?;
        }
    }

    worksheet.autofit();
    Ok(highlighted)
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: ReportCell<'_>,
    format: Option<&Format>,
) -> std::result::Result<(), XlsxError> {
    match (cell, format) {
        (ReportCell::Flag(flag), Some(f)) => {
            worksheet.write_boolean_with_format(row, col, flag, f)?;
        }
        (ReportCell::Flag(flag), None) => {
            worksheet.write_boolean(row, col, flag)?;
        }
        (ReportCell::Value(Some(value)), format) => match (value, format) {
            // Wider integers would lose digits as numbers
            (CellValue::Integer(i), Some(f)) if i.unsigned_abs() > MAX_EXACT_XLSX_INTEGER => {
                worksheet.write_string_with_format(row, col, i.to_string(), f)?;
            }
            (CellValue::Integer(i), None) if i.unsigned_abs() > MAX_EXACT_XLSX_INTEGER => {
                worksheet.write_string(row, col, i.to_string())?;
            }
            (CellValue::Integer(i), Some(f)) => {
                worksheet.write_number_with_format(row, col, *i as f64, f)?;
            }
            (CellValue::Integer(i), None) => {
                worksheet.write_number(row, col, *i as f64)?;
            }
            (CellValue::Float(n), Some(f)) => {
                worksheet.write_number_with_format(row, col, *n, f)?;
            }
            (CellValue::Float(n), None) => {
                worksheet.write_number(row, col, *n)?;
            }
            (CellValue::String(s), Some(f)) => {
                worksheet.write_string_with_format(row, col, s, f)?;
            }
            (CellValue::String(s), None) => {
                worksheet.write_string(row, col, s)?;
            }
            (CellValue::Empty, Some(f)) => {
                worksheet.write_blank(row, col, f)?;
            }
            (CellValue::Empty, None) => {}
        },
        // Absent values stay blank; a blank still shows the fill
        (ReportCell::Value(None), Some(f)) => {
            worksheet.write_blank(row, col, f)?;
        }
        (ReportCell::Value(None), None) => {}
    }
    Ok(())
}

/// Write the report as plain csv (no highlighting)
pub fn write_csv<P: AsRef<Path>>(comparison: &Comparison, path: P) -> Result<()> {
    let path = path.as_ref();
    let to_err = |source| Error::Csv {
        path: path.to_path_buf(),
        source,
    };

    let layout = ReportLayout::new(comparison);
    let mut writer = csv::Writer::from_path(path).map_err(to_err)?;
    writer.write_record(layout.headers()).map_err(to_err)?;
    for record in &comparison.records {
        writer.write_record(layout.row_text(record)).map_err(to_err)?;
    }
    writer.flush()?;
    Ok(())
}

/// JSON report document
#[derive(Debug, Serialize)]
pub struct ReportDocument<'a> {
    pub generated_at: DateTime<Utc>,
    pub summary: ComparisonSummary,
    pub comparison: &'a Comparison,
}

impl<'a> ReportDocument<'a> {
    pub fn new(comparison: &'a Comparison) -> Self {
        Self {
            generated_at: Utc::now(),
            summary: comparison.summary(),
            comparison,
        }
    }
}

/// Write the comparison, its summary and a timestamp as pretty JSON
pub fn write_json<P: AsRef<Path>>(comparison: &Comparison, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &ReportDocument::new(comparison))?;
    Ok(())
}
