//! Discrepancy classification for joined invoice rows

use crate::joiner::{JoinedRow, JoinedTable};
use crate::table::CellValue;
use serde::{Deserialize, Serialize};

/// The four discrepancy flags computed for every joined row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiscrepancyFlags {
    /// Quantities differ (including one side absent)
    pub qty_diff: bool,
    /// Prices differ (including one side absent)
    pub price_diff: bool,
    /// No quantity on the A side
    pub missing_in_a: bool,
    /// No quantity on the B side
    pub missing_in_b: bool,
}

impl DiscrepancyFlags {
    /// True if any flag is set
    pub fn any(&self) -> bool {
        self.qty_diff || self.price_diff || self.missing_in_a || self.missing_in_b
    }

    /// Flags as seen with A and B swapped
    pub fn swapped(&self) -> Self {
        Self {
            missing_in_a: self.missing_in_b,
            missing_in_b: self.missing_in_a,
            ..*self
        }
    }
}

/// Positions of the compared fields within [`JoinedTable::columns`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComparedFields {
    pub quantity: Option<usize>,
    pub price: Option<usize>,
}

impl ComparedFields {
    /// Look up the quantity and price columns by name.
    ///
    /// A column that neither input has resolves to `None`; every value for it
    /// then counts as absent.
    pub fn resolve(table: &JoinedTable, quantity: &str, price: &str) -> Self {
        let fields = Self {
            quantity: table.column_position(quantity),
            price: table.column_position(price),
        };
        if fields.quantity.is_none() {
            log::warn!("quantity column '{}' not found in either invoice", quantity);
        }
        if fields.price.is_none() {
            log::warn!("price column '{}' not found in either invoice", price);
        }
        fields
    }
}

/// A side value is absent when there is no matching row or column, or when
/// the cell is blank.
pub fn is_absent(value: Option<&CellValue>) -> bool {
    value.map_or(true, CellValue::is_empty)
}

/// Equality with absence: two absent values are equal, one absent value
/// never equals a present one.
pub fn values_equal(a: Option<&CellValue>, b: Option<&CellValue>) -> bool {
    match (is_absent(a), is_absent(b)) {
        (true, true) => true,
        (false, false) => match (a, b) {
            (Some(a), Some(b)) => a.same_value(b),
            _ => false,
        },
        _ => false,
    }
}

fn side_value(values: &[Option<CellValue>], position: Option<usize>) -> Option<&CellValue> {
    position.and_then(|i| values.get(i)).and_then(Option::as_ref)
}

/// Compute the discrepancy flags for one joined row.
///
/// An absent quantity stands in for "no row on that side", so a present row
/// with a blank quantity is reported as missing too.
pub fn classify(row: &JoinedRow, fields: &ComparedFields) -> DiscrepancyFlags {
    let qty_a = side_value(&row.values_a, fields.quantity);
    let qty_b = side_value(&row.values_b, fields.quantity);
    let price_a = side_value(&row.values_a, fields.price);
    let price_b = side_value(&row.values_b, fields.price);

    DiscrepancyFlags {
        qty_diff: !values_equal(qty_a, qty_b),
        price_diff: !values_equal(price_a, price_b),
        missing_in_a: is_absent(qty_a),
        missing_in_b: is_absent(qty_b),
    }
}
