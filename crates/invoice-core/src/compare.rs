//! The comparison pipeline: normalize, validate, join, classify

use crate::classify::{classify, ComparedFields, DiscrepancyFlags};
use crate::config::CompareConfig;
use crate::error::Result;
use crate::joiner::{outer_join, SUFFIX_A, SUFFIX_B};
use crate::parser::load_table;
use crate::schema::{normalize_columns, validate_key};
use crate::table::{CellValue, Table};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A joined invoice line with its discrepancy flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedRecord {
    /// Key value
    pub key: CellValue,
    /// Values from invoice A, aligned to `Comparison::columns`
    pub values_a: Vec<Option<CellValue>>,
    /// Values from invoice B, aligned to `Comparison::columns`
    pub values_b: Vec<Option<CellValue>>,
    /// Discrepancy flags
    pub flags: DiscrepancyFlags,
}

/// Counts of each discrepancy kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub records: usize,
    pub qty_diffs: usize,
    pub price_diffs: usize,
    pub missing_in_a: usize,
    pub missing_in_b: usize,
    /// Records with at least one flag set
    pub with_discrepancies: usize,
}

/// Result of comparing two invoices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    /// Column names used for this run
    pub config: CompareConfig,
    /// Non-key columns (union of both inputs)
    pub columns: Vec<String>,
    /// One record per matched pair or unmatched row
    pub records: Vec<CombinedRecord>,
}

impl Comparison {
    /// Name of the key column
    pub fn key_column(&self) -> &str {
        &self.config.key_column
    }

    /// Get the number of records
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Position of a non-key column
    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Suffixed header names: `<column>_A`, `<column>_B` per non-key column
    pub fn side_headers(&self) -> Vec<(String, String)> {
        self.columns
            .iter()
            .map(|c| (format!("{}{}", c, SUFFIX_A), format!("{}{}", c, SUFFIX_B)))
            .collect()
    }

    /// Count each discrepancy kind
    pub fn summary(&self) -> ComparisonSummary {
        self.records
            .iter()
            .fold(ComparisonSummary::default(), |mut acc, record| {
                let f = &record.flags;
                acc.records += 1;
                acc.qty_diffs += usize::from(f.qty_diff);
                acc.price_diffs += usize::from(f.price_diff);
                acc.missing_in_a += usize::from(f.missing_in_a);
                acc.missing_in_b += usize::from(f.missing_in_b);
                acc.with_discrepancies += usize::from(f.any());
                acc
            })
    }

    /// Records with at least one flag set
    pub fn discrepancies(&self) -> impl Iterator<Item = &CombinedRecord> {
        self.records.iter().filter(|r| r.flags.any())
    }
}

/// Compare two already-loaded invoice tables.
///
/// Fails with [`crate::Error::MissingKeyColumn`] before any join work when the
/// key column is absent from either table.
pub fn compare_tables(a: Table, b: Table, config: &CompareConfig) -> Result<Comparison> {
    let a = normalize_columns(a);
    let b = normalize_columns(b);
    validate_key(&a, &b, &config.key_column)?;

    let joined = outer_join(&a, &b, &config.key_column);
    let fields = ComparedFields::resolve(&joined, &config.quantity_column, &config.price_column);

    let records: Vec<CombinedRecord> = joined
        .rows
        .into_iter()
        .map(|row| {
            let flags = classify(&row, &fields);
            CombinedRecord {
                key: row.key,
                values_a: row.values_a,
                values_b: row.values_b,
                flags,
            }
        })
        .collect();

    let comparison = Comparison {
        config: config.clone(),
        columns: joined.columns,
        records,
    };

    let summary = comparison.summary();
    log::info!(
        "compared {} vs {}: {} records, {} qty diffs, {} price diffs, {} missing in A, {} missing in B",
        a.source_path.display(),
        b.source_path.display(),
        summary.records,
        summary.qty_diffs,
        summary.price_diffs,
        summary.missing_in_a,
        summary.missing_in_b
    );

    Ok(comparison)
}

/// Load two invoice files and compare them
pub fn compare_files<P: AsRef<Path>, Q: AsRef<Path>>(
    path_a: P,
    path_b: Q,
    config: &CompareConfig,
) -> Result<Comparison> {
    let a = load_table(path_a)?;
    let b = load_table(path_b)?;
    compare_tables(a, b, config)
}
