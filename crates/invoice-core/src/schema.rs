//! Header normalization and the key-column gate run before every comparison

use crate::error::{Error, MissingIn, Result};
use crate::table::Table;

/// Trim surrounding whitespace from every column name. Cell values are untouched.
pub fn normalize_columns(mut table: Table) -> Table {
    for column in &mut table.columns {
        let trimmed = column.name.trim();
        if trimmed.len() != column.name.len() {
            column.name = trimmed.to_string();
        }
    }
    table
}

/// Ensure the key column exists in both tables
pub fn validate_key(a: &Table, b: &Table, key: &str) -> Result<()> {
    let missing_in = match (a.has_column(key), b.has_column(key)) {
        (true, true) => return Ok(()),
        (false, true) => MissingIn::A,
        (true, false) => MissingIn::B,
        (false, false) => MissingIn::Both,
    };

    Err(Error::MissingKeyColumn {
        key: key.to_string(),
        missing_in,
    })
}
