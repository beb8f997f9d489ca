//! # Inventory-At-Date Reconstruction
//!
//! Computes what a product's stock level WAS at an arbitrary cutoff date.
//! Historical levels are never stored; they are reconstructed backward from
//! the current snapshot plus the ledger rows written after the cutoff.
//!
//! ## The Backward Delta-Replay
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │            stockAtCutoff = max(0, current + soldAfter − addedAfter)     │
//! │                                                                         │
//! │   cutoff                        today                                   │
//! │     │                             │                                     │
//! │     ▼                             ▼                                     │
//! │  ───┼──── sale(-10) ── invoice(+5) ──►  current = 45                    │
//! │     │                                                                   │
//! │  Every sale after the cutoff REMOVED stock, so add it back:   +10       │
//! │  Every invoice after the cutoff ADDED stock, so take it out:   -5       │
//! │                                                                         │
//! │  stock at cutoff = 45 + 10 - 5 = 50                                     │
//! │                                                                         │
//! │  KNOWN BLIND SPOT: a restock entered without an invoice total leaves    │
//! │  no invoice row, so this replay cannot see it. The figure for such a    │
//! │  product is approximate - disclosed to the operator, not silently       │
//! │  corrected. See RECONSTRUCTION_CAVEAT.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Operator-facing disclaimer shown on every reconstructed report.
///
/// Stock adjustments entered without an invoice total leave no ledger row,
/// so the backward replay cannot account for them. The original register
/// disclosed this on the report itself; we keep that behavior.
pub const RECONSTRUCTION_CAVEAT: &str =
    "Historical stock is reconstructed from sales and invoices dated after the \
     cutoff. Stock adjustments entered without an invoice total are invisible \
     to this reconstruction, so affected figures are approximate.";

/// Reconstructs the stock level at a cutoff date from the current level and
/// the quantities sold/restocked after it.
///
/// Floored at zero: the replay can go negative when an untracked adjustment
/// sits between the cutoff and now, and a negative historical stock level is
/// never meaningful.
///
/// ## Example
/// ```rust
/// use billar_core::inventory::stock_at_cutoff;
///
/// // current 50, one sale of 10 after cutoff, one restock of 5 after cutoff
/// assert_eq!(stock_at_cutoff(50, 10, 5), 55);
///
/// // no activity after the cutoff: degenerates to the current level
/// assert_eq!(stock_at_cutoff(50, 0, 0), 50);
/// ```
#[inline]
pub fn stock_at_cutoff(current: i64, sold_after: i64, restocked_after: i64) -> i64 {
    (current + sold_after - restocked_after).max(0)
}

// =============================================================================
// Report Rows
// =============================================================================

/// One product's line on an inventory valuation report.
///
/// Carries both the current stock and the reconstructed cutoff stock so the
/// report can show both valuations side by side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryRow {
    pub code: Option<String>,
    pub name: String,
    pub stock_now: i64,
    pub stock_at_cutoff: i64,
    /// Current unit cost (latest derived value).
    pub cost: Money,
    /// Current sale price.
    pub price: Money,
}

impl InventoryRow {
    /// Cost basis of the stock on hand today: `cost × stock_now`.
    pub fn cost_value_now(&self) -> Money {
        self.cost.times(self.stock_now)
    }

    /// Potential sale value of the stock on hand today: `price × stock_now`.
    pub fn sale_value_now(&self) -> Money {
        self.price.times(self.stock_now)
    }

    /// Cost basis of the reconstructed cutoff stock.
    pub fn cost_value_at_cutoff(&self) -> Money {
        self.cost.times(self.stock_at_cutoff)
    }

    /// Potential sale value of the reconstructed cutoff stock.
    pub fn sale_value_at_cutoff(&self) -> Money {
        self.price.times(self.stock_at_cutoff)
    }
}

/// A full inventory valuation report for one cutoff date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryReport {
    pub cutoff: DateTime<Utc>,
    pub rows: Vec<InventoryRow>,
}

impl InventoryReport {
    /// The approximation disclaimer that must accompany the figures.
    pub fn caveat(&self) -> &'static str {
        RECONSTRUCTION_CAVEAT
    }

    /// Total cost basis of current stock across all rows.
    pub fn total_cost_value_now(&self) -> Money {
        self.rows.iter().map(InventoryRow::cost_value_now).sum()
    }

    /// Total potential sale value of current stock.
    pub fn total_sale_value_now(&self) -> Money {
        self.rows.iter().map(InventoryRow::sale_value_now).sum()
    }

    /// Total cost basis of the reconstructed cutoff stock.
    pub fn total_cost_value_at_cutoff(&self) -> Money {
        self.rows
            .iter()
            .map(InventoryRow::cost_value_at_cutoff)
            .sum()
    }

    /// Total potential sale value of the reconstructed cutoff stock.
    pub fn total_sale_value_at_cutoff(&self) -> Money {
        self.rows
            .iter()
            .map(InventoryRow::sale_value_at_cutoff)
            .sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
