//! # Purchase Draft
//!
//! An in-progress multi-product purchase, built up line by line before being
//! submitted as one batch.
//!
//! ## Draft Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Purchase Draft Lifecycle                             │
//! │                                                                         │
//! │  Operator Action           Draft Change            At Submit            │
//! │  ───────────────           ────────────            ─────────            │
//! │                                                                         │
//! │  Pick product ───────────► add_line(..)  ────────► one restock each    │
//! │                                                                         │
//! │  Mistyped a line ────────► remove_line(i)                               │
//! │                                                                         │
//! │  Start over ─────────────► clear()                                      │
//! │                                                                         │
//! │  Confirm purchase ───────► (service applies all lines in ONE            │
//! │                             transaction, sharing ONE batch_id)          │
//! │                                                                         │
//! │  NOTE: The draft is an owned value held by the caller for the duration  │
//! │        of data entry - never ambient global state.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::money::Money;
use crate::types::Product;
use crate::validation::{validate_amount, validate_quantity};

/// One line of an in-progress purchase.
///
/// ## Design Notes
/// - `product_id`: reference for the database update at submit time
/// - `code`/`name`: frozen copies for review display, so the draft reads
///   consistently even if the catalog row changes mid-entry
/// - Two lines for the same product are allowed: each becomes its own
///   restock (and invoice row, when priced)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftLine {
    /// Product ID (UUID)
    pub product_id: String,

    /// Business code at time of adding (frozen)
    pub code: Option<String>,

    /// Product name at time of adding (frozen)
    pub name: String,

    /// Units purchased
    pub qty: i64,

    /// Supplier invoice amount for this line; None for a pure stock
    /// adjustment that should leave no invoice trace
    pub invoice_total: Option<Money>,

    /// Sale price to apply when this line lands; None keeps the current one
    pub new_price: Option<Money>,
}

impl DraftLine {
    /// Creates a draft line from a product and entry fields.
    pub fn from_product(
        product: &Product,
        qty: i64,
        invoice_total: Option<Money>,
        new_price: Option<Money>,
    ) -> Self {
        DraftLine {
            product_id: product.id.clone(),
            code: product.code.clone(),
            name: product.name.clone(),
            qty,
            invoice_total,
            new_price,
        }
    }

    /// Preview of the unit cost this line will derive: `round(total/qty, 4)`.
    ///
    /// None when the line carries no invoice total (pure adjustment).
    pub fn unit_cost_preview(&self) -> Option<Money> {
        self.invoice_total.map(|t| Money::unit_cost(t, self.qty))
    }
}

/// An in-progress multi-product purchase.
///
/// ## Invariants
/// - Every line has `qty > 0` and non-negative amounts (checked on add)
/// - Lines are NOT merged by product: the supplier invoice may genuinely
///   list the same article twice at different prices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseDraft {
    /// Lines entered so far
    pub lines: Vec<DraftLine>,

    /// Optional supplier label stamped on every invoice row of the batch
    pub company: Option<String>,

    /// When data entry started
    pub created_at: DateTime<Utc>,
}

impl PurchaseDraft {
    /// Creates a new empty draft.
    pub fn new(company: Option<String>) -> Self {
        PurchaseDraft {
            lines: Vec::new(),
            company,
            created_at: Utc::now(),
        }
    }

    /// Adds a line to the draft after validating its fields.
    ///
    /// ## Returns
    /// - `Ok(())` on success
    /// - `Err(CoreError::Validation(..))` for a zero/negative quantity or a
    ///   negative amount
    pub fn add_line(
        &mut self,
        product: &Product,
        qty: i64,
        invoice_total: Option<Money>,
        new_price: Option<Money>,
    ) -> CoreResult<()> {
        validate_quantity(qty)?;
        if let Some(total) = invoice_total {
            validate_amount("invoice total", total)?;
        }
        if let Some(price) = new_price {
            validate_amount("new price", price)?;
        }

        self.lines
            .push(DraftLine::from_product(product, qty, invoice_total, new_price));
        Ok(())
    }

    /// Removes a line by position, returning it if the index was valid.
    pub fn remove_line(&mut self, index: usize) -> Option<DraftLine> {
        if index < self.lines.len() {
            Some(self.lines.remove(index))
        } else {
            None
        }
    }

    /// Clears all lines and restarts the entry clock.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.created_at = Utc::now();
    }

    /// Returns the number of lines entered.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the total units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.qty).sum()
    }

    /// Sums the invoice amounts of priced lines.
    pub fn invoice_total(&self) -> Money {
        self.lines.iter().filter_map(|l| l.invoice_total).sum()
    }

    /// Checks if the draft has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Default for PurchaseDraft {
    fn default() -> Self {
        Self::new(None)
    }
}
