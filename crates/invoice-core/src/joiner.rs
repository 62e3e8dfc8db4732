//! Full outer join of two invoice tables on a key column

use crate::table::{CellValue, Row, Table};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Suffix for columns coming from invoice A
pub const SUFFIX_A: &str = "_A";
/// Suffix for columns coming from invoice B
pub const SUFFIX_B: &str = "_B";

/// Result of joining two tables: one row per matched pair or unmatched row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinedTable {
    /// Name of the key column (emitted unsuffixed)
    pub key_column: String,
    /// Non-key columns: A's columns in order, then columns only B has
    pub columns: Vec<String>,
    /// Joined rows
    pub rows: Vec<JoinedRow>,
}

impl JoinedTable {
    /// Position of a non-key column in `columns`
    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// One joined row. `None` means no matching row on that side, or that side
/// has no such column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedRow {
    /// Key value shared by both sides
    pub key: CellValue,
    /// Values from invoice A, aligned to `JoinedTable::columns`
    pub values_a: Vec<Option<CellValue>>,
    /// Values from invoice B, aligned to `JoinedTable::columns`
    pub values_b: Vec<Option<CellValue>>,
    /// Index of the contributing row in invoice A, if any
    pub source_a: Option<usize>,
    /// Index of the contributing row in invoice B, if any
    pub source_b: Option<usize>,
}

impl JoinedRow {
    /// True if a row from invoice A contributed to this row
    pub fn has_a(&self) -> bool {
        self.source_a.is_some()
    }

    /// True if a row from invoice B contributed to this row
    pub fn has_b(&self) -> bool {
        self.source_b.is_some()
    }
}

/// Hashable identity of a key cell: its text. Spreadsheet numbers use their
/// display text, so a numeric `1001` (or `1001.0`) joins the text `1001`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum JoinKey {
    Text(String),
    Empty,
}

impl JoinKey {
    fn from_cell(cell: &CellValue) -> Self {
        match cell {
            CellValue::Empty => JoinKey::Empty,
            other => JoinKey::Text(other.to_string_value()),
        }
    }
}

/// Per-key row indices on each side
#[derive(Default)]
struct KeyGroup {
    a_rows: Vec<usize>,
    b_rows: Vec<usize>,
}

/// Outer-join two tables on `key`.
///
/// Every key value found in either table appears in the result. Keys present
/// on both sides produce the cross product of their rows; keys present on one
/// side produce one row per source row with the other side absent. Output
/// order follows first appearance in A, then B-only keys in B order.
///
/// Both tables must contain `key` (see [`crate::schema::validate_key`]).
/// Missing key columns are treated as all-empty keys.
pub fn outer_join(a: &Table, b: &Table, key: &str) -> JoinedTable {
    let key_a = a.column_index(key);
    let key_b = b.column_index(key);

    // Build unified column list (union of all non-key columns)
    let mut columns: Vec<String> = Vec::new();
    let mut seen_columns: HashSet<&str> = HashSet::new();
    for col in a.columns.iter().chain(b.columns.iter()) {
        if col.name != key && seen_columns.insert(col.name.as_str()) {
            columns.push(col.name.clone());
        }
    }

    // Map each unified column to its source index on each side
    let map_a: Vec<Option<usize>> = columns.iter().map(|c| a.column_index(c)).collect();
    let map_b: Vec<Option<usize>> = columns.iter().map(|c| b.column_index(c)).collect();

    let keys_a: Vec<CellValue> = a.rows.iter().map(|r| key_of(r, key_a)).collect();
    let keys_b: Vec<CellValue> = b.rows.iter().map(|r| key_of(r, key_b)).collect();

    // Group row indices by key, remembering first-appearance order
    let mut order: Vec<JoinKey> = Vec::new();
    let mut groups: HashMap<JoinKey, KeyGroup> = HashMap::new();

    for (idx, key_value) in keys_a.iter().enumerate() {
        let jk = JoinKey::from_cell(key_value);
        groups
            .entry(jk.clone())
            .or_insert_with(|| {
                order.push(jk);
                KeyGroup::default()
            })
            .a_rows
            .push(idx);
    }
    for (idx, key_value) in keys_b.iter().enumerate() {
        let jk = JoinKey::from_cell(key_value);
        groups
            .entry(jk.clone())
            .or_insert_with(|| {
                order.push(jk);
                KeyGroup::default()
            })
            .b_rows
            .push(idx);
    }

    let project = |table: &Table, map: &[Option<usize>], row_idx: usize| -> Vec<Option<CellValue>> {
        let row = &table.rows[row_idx];
        map.iter()
            .map(|src| src.and_then(|i| row.get(i).cloned()))
            .collect()
    };
    let absent = vec![None; columns.len()];

    let mut rows = Vec::new();
    for jk in &order {
        let group = &groups[jk];

        match (group.a_rows.is_empty(), group.b_rows.is_empty()) {
            (false, false) => {
                for &ai in &group.a_rows {
                    let key_value = &keys_a[ai];
                    let values_a = project(a, &map_a, ai);
                    for &bi in &group.b_rows {
                        rows.push(JoinedRow {
                            key: key_value.clone(),
                            values_a: values_a.clone(),
                            values_b: project(b, &map_b, bi),
                            source_a: Some(ai),
                            source_b: Some(bi),
                        });
                    }
                }
            }
            (false, true) => {
                for &ai in &group.a_rows {
                    rows.push(JoinedRow {
                        key: keys_a[ai].clone(),
                        values_a: project(a, &map_a, ai),
                        values_b: absent.clone(),
                        source_a: Some(ai),
                        source_b: None,
                    });
                }
            }
            (true, false) => {
                for &bi in &group.b_rows {
                    rows.push(JoinedRow {
                        key: keys_b[bi].clone(),
                        values_a: absent.clone(),
                        values_b: project(b, &map_b, bi),
                        source_a: None,
                        source_b: Some(bi),
                    });
                }
            }
            (true, true) => unreachable!("key groups are created with a row"),
        }
    }

    log::debug!(
        "outer join on '{}': {} + {} rows -> {} joined rows ({} distinct keys)",
        key,
        a.row_count(),
        b.row_count(),
        rows.len(),
        order.len()
    );

    JoinedTable {
        key_column: key.to_string(),
        columns,
        rows,
    }
}

fn key_of(row: &Row, index: Option<usize>) -> CellValue {
    index.map_or(CellValue::Empty, |i| row.key_cell(i))
}
