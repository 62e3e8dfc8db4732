//! Highlight bands for report cells

use crate::classify::DiscrepancyFlags;
use crate::report::ReportColumn;
use serde::{Deserialize, Serialize};

/// Fill for price differences (light red)
pub const PRICE_DIFF_COLOR: u32 = 0xFF9999;
/// Fill for quantity differences (light yellow)
pub const QTY_DIFF_COLOR: u32 = 0xFFFF99;
/// Fill for a quantity missing on one side (light blue)
pub const MISSING_COLOR: u32 = 0x99CCFF;

/// Presentation band assigned to one report cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Band {
    PriceDiff,
    QtyDiff,
    Missing,
    None,
}

impl Band {
    /// RGB fill colour, or `None` for an unhighlighted cell
    pub fn color(self) -> Option<u32> {
        match self {
            Band::PriceDiff => Some(PRICE_DIFF_COLOR),
            Band::QtyDiff => Some(QTY_DIFF_COLOR),
            Band::Missing => Some(MISSING_COLOR),
            Band::None => None,
        }
    }

    pub fn is_highlighted(self) -> bool {
        self != Band::None
    }
}

/// Pick the band for one cell.
///
/// `quantity` is the position of the quantity column among the non-key
/// columns. Only the price-diff indicator, the qty-diff indicator and the two
/// side quantity cells can be highlighted.
pub fn band_for(flags: &DiscrepancyFlags, column: ReportColumn, quantity: Option<usize>) -> Band {
    let is_quantity = |i: usize| quantity == Some(i);

    match column {
        ReportColumn::PriceDiff if flags.price_diff => Band::PriceDiff,
        ReportColumn::QtyDiff if flags.qty_diff => Band::QtyDiff,
        ReportColumn::ValueA(i) if is_quantity(i) && flags.missing_in_a => Band::Missing,
        ReportColumn::ValueB(i) if is_quantity(i) && flags.missing_in_b => Band::Missing,
        _ => Band::None,
    }
}
