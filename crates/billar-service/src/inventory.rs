//! # Inventory-At-Date Reports
//!
//! Builds the historical inventory valuation report: every catalog product
//! with its reconstructed stock level at a cutoff date, valued at current
//! cost and price.
//!
//! ## Three Reads, One Replay
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        inventory_at(cutoff)                             │
//! │                                                                         │
//! │  products.list() ──────────────┐                                        │
//! │  sales.qty_sold_after(cutoff) ─┼─► per product:                         │
//! │  invoices.qty_added_after() ───┘    at_cutoff = max(0, now + sold       │
//! │                                                       − restocked)      │
//! │                                                                         │
//! │  Only invoiced restocks leave ledger rows, so a plain count correction  │
//! │  after the cutoff is invisible to the replay. The report carries the    │
//! │  caveat saying exactly that.                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use billar_core::inventory::{stock_at_cutoff, InventoryReport, InventoryRow};
use billar_db::Database;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::ServiceResult;

/// Historical inventory reporting.
pub struct InventoryService {
    db: Database,
}

impl InventoryService {
    pub fn new(db: Database) -> Self {
        InventoryService { db }
    }

    /// Reconstructs the stock level of every product at `cutoff` and values
    /// it at the product's current cost and price.
    ///
    /// Products with no ledger activity after the cutoff report their
    /// current stock unchanged. The returned report exposes the
    /// reconstruction caveat; renderers must print it.
    pub async fn inventory_at(&self, cutoff: DateTime<Utc>) -> ServiceResult<InventoryReport> {
        let products = self.db.products().list().await?;
        let sold = self.db.sales().qty_sold_after(cutoff).await?;
        let added = self.db.invoices().qty_added_after(cutoff).await?;

        let rows: Vec<InventoryRow> = products
            .into_iter()
            .map(|product| {
                let sold_after = sold.get(&product.id).copied().unwrap_or(0);
                let restocked_after = added.get(&product.id).copied().unwrap_or(0);
                InventoryRow {
                    stock_at_cutoff: stock_at_cutoff(product.stock, sold_after, restocked_after),
                    code: product.code,
                    name: product.name,
                    stock_now: product.stock,
                    cost: product.cost,
                    price: product.price,
                }
            })
            .collect();

        info!(cutoff = %cutoff, products = rows.len(), "Inventory reconstructed");
        Ok(InventoryReport { cutoff, rows })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
