//! # Restock and Purchase Operations
//!
//! Single-product restocks, multi-product purchase drafts, and invoice
//! management (listing and deletion with optional stock reversal).
//!
//! ## Cost Is Derived, Never Typed In
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 restock(product, qty, invoice_total?)                   │
//! │                                                                         │
//! │  invoice_total given:                                                   │
//! │    unit_cost = round(invoice_total / qty, 4 decimals)                   │
//! │    stock += qty   cost = unit_cost   price = new_price (if given)       │
//! │    invoice row written (the audit trail)                                │
//! │                                                                         │
//! │  invoice_total omitted (pure count correction):                         │
//! │    stock += qty   cost and price untouched   NO invoice row             │
//! │                                                                         │
//! │  A draft submit does the same per line, in ONE transaction, with ONE    │
//! │  batch_id stamped on every invoice row it writes.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use billar_core::validation::{validate_amount, validate_quantity};
use billar_core::{Invoice, Money, PurchaseDraft};
use billar_db::{Database, InvoiceRepository, InvoiceWithProduct, RestockLine};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::error::{Feedback, ServiceError, ServiceResult};
use crate::session::Session;

/// Result of a single-product restock.
#[derive(Debug, Clone, Serialize)]
pub struct RestockOutcome {
    pub product_name: String,
    pub new_stock: i64,
    /// Derived unit cost; `None` when no invoice total was given.
    pub unit_cost: Option<Money>,
    pub new_price: Option<Money>,
    pub summary: String,
}

impl From<RestockOutcome> for Feedback {
    fn from(outcome: RestockOutcome) -> Self {
        Feedback::success(outcome.summary)
    }
}

/// Result of submitting a purchase draft.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    /// Batch id shared by every invoice row the submit wrote.
    pub batch_id: String,
    pub lines: usize,
    pub total_quantity: i64,
    /// Sum of the priced lines' invoice amounts.
    pub invoice_total: Money,
    pub summary: String,
}

impl From<BatchOutcome> for Feedback {
    fn from(outcome: BatchOutcome) -> Self {
        Feedback::success(outcome.summary)
    }
}

/// Restock and purchase management.
pub struct RestockService {
    db: Database,
}

impl RestockService {
    pub fn new(db: Database) -> Self {
        RestockService { db }
    }

    /// Restocks one product.
    ///
    /// With an invoice total the unit cost is derived as
    /// `round(invoice_total / qty, 4)`, the product's cost is overwritten,
    /// and an invoice row records the purchase under the acting user. With
    /// no total this is a pure count correction: stock moves, cost and
    /// price stay, nothing is written to the invoice ledger.
    ///
    /// ## Errors
    /// - `Validation` for a non-positive quantity or negative amount
    /// - `NotFound` if the product does not exist
    pub async fn restock(
        &self,
        session: &Session,
        product_id: &str,
        qty: i64,
        invoice_total: Option<Money>,
        new_price: Option<Money>,
    ) -> ServiceResult<RestockOutcome> {
        validate_quantity(qty)?;
        if let Some(total) = invoice_total {
            validate_amount("invoice total", total)?;
        }
        if let Some(price) = new_price {
            validate_amount("new price", price)?;
        }

        let product = self
            .db
            .products()
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound {
                entity: "Product".to_string(),
                id: product_id.to_string(),
            })?;

        let unit_cost = invoice_total.map(|total| Money::unit_cost(total, qty));
        let line = RestockLine {
            product_id: product.id.clone(),
            qty,
            new_cost: unit_cost,
            new_price,
            invoice: invoice_total.map(|total| Invoice {
                id: InvoiceRepository::generate_invoice_id(),
                product_id: product.id.clone(),
                qty,
                invoice_total: total,
                unit_cost: Money::unit_cost(total, qty),
                new_price,
                created_by: session.username.clone(),
                batch_id: None,
                company: None,
                created_at: Utc::now(),
            }),
        };

        self.db.invoices().apply(&[line]).await?;

        let new_stock = product.stock + qty;
        let mut summary = format!("Stock updated to {}.", new_stock);
        if let (Some(total), Some(cost)) = (invoice_total, unit_cost) {
            summary.push_str(&format!(" Invoice {} (unit cost {}).", total, cost));
        }
        if let Some(price) = new_price {
            summary.push_str(&format!(" New price {}.", price));
        }

        info!(
            product = %product.name,
            qty,
            invoiced = invoice_total.is_some(),
            by = %session.username,
            "Restock applied"
        );

        Ok(RestockOutcome {
            product_name: product.name,
            new_stock,
            unit_cost,
            new_price,
            summary,
        })
    }

    /// Submits a purchase draft as one batch.
    ///
    /// Every line lands in a single transaction; the invoice rows of priced
    /// lines share one batch id so the whole delivery can be reviewed or
    /// deleted together later.
    ///
    /// ## Errors
    /// - `EmptyDraft` if the draft has no lines
    /// - `Validation` if a line carries bad fields
    /// - `NotFound` (nothing applied) if a line references a missing product
    pub async fn submit_draft(
        &self,
        session: &Session,
        draft: &PurchaseDraft,
    ) -> ServiceResult<BatchOutcome> {
        if draft.is_empty() {
            return Err(ServiceError::EmptyDraft);
        }

        // Drafts validate on add_line, but the fields are public; check
        // again before anything hits the database.
        for line in &draft.lines {
            validate_quantity(line.qty)?;
            if let Some(total) = line.invoice_total {
                validate_amount("invoice total", total)?;
            }
            if let Some(price) = line.new_price {
                validate_amount("new price", price)?;
            }
        }

        let batch_id = InvoiceRepository::generate_batch_id();
        let now = Utc::now();

        let lines: Vec<RestockLine> = draft
            .lines
            .iter()
            .map(|line| RestockLine {
                product_id: line.product_id.clone(),
                qty: line.qty,
                new_cost: line.unit_cost_preview(),
                new_price: line.new_price,
                invoice: line.invoice_total.map(|total| Invoice {
                    id: InvoiceRepository::generate_invoice_id(),
                    product_id: line.product_id.clone(),
                    qty: line.qty,
                    invoice_total: total,
                    unit_cost: Money::unit_cost(total, line.qty),
                    new_price: line.new_price,
                    created_by: session.username.clone(),
                    batch_id: Some(batch_id.clone()),
                    company: draft.company.clone(),
                    created_at: now,
                }),
            })
            .collect();

        self.db.invoices().apply(&lines).await?;

        let outcome = BatchOutcome {
            summary: format!(
                "Purchase applied: {} line(s), {} unit(s), invoiced {}.",
                draft.line_count(),
                draft.total_quantity(),
                draft.invoice_total()
            ),
            batch_id: batch_id.clone(),
            lines: draft.line_count(),
            total_quantity: draft.total_quantity(),
            invoice_total: draft.invoice_total(),
        };

        info!(
            batch_id = %batch_id,
            lines = outcome.lines,
            by = %session.username,
            "Purchase batch applied"
        );
        Ok(outcome)
    }

    /// Deletes every invoice of a batch, returning how many rows went.
    ///
    /// With `reverse_stock` the delivered units are subtracted again,
    /// floored at zero per product (some may have been sold since).
    pub async fn delete_batch(&self, batch_id: &str, reverse_stock: bool) -> ServiceResult<u64> {
        Ok(self.db.invoices().delete_batch(batch_id, reverse_stock).await?)
    }

    /// Deletes a single invoice, with the same optional floored reversal.
    pub async fn delete_invoice(&self, invoice_id: &str, reverse_stock: bool) -> ServiceResult<()> {
        Ok(self.db.invoices().delete_invoice(invoice_id, reverse_stock).await?)
    }

    /// Lists the most recent invoices with product name and code, newest
    /// first.
    pub async fn recent_invoices(&self, limit: i64) -> ServiceResult<Vec<InvoiceWithProduct>> {
        Ok(self.db.invoices().list_recent(limit).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use billar_core::Product;
    use billar_db::DbConfig;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_product(db: &Database, id: &str, stock: i64) -> Product {
        let product = Product {
            id: id.to_string(),
            code: Some(format!("C-{}", id)),
            name: format!("Product {}", id),
            price: Money::from_units(15),
            cost: Money::from_units(9),
            stock,
            iva_bps: 2100,
            company: None,
            created_at: Utc::now(),
        };
        db.products().insert(&product).await.unwrap();
        product
    }

    fn caro() -> Session {
        Session::new("caro", false)
    }

    #[tokio::test]
    async fn test_restock_with_invoice_derives_cost() {
        let db = test_db().await;
        let service = RestockService::new(db.clone());
        seed_product(&db, "p1", 10).await;

        let outcome = service
            .restock(
                &caro(),
                "p1",
                5,
                Some(Money::from_units(50)),
                Some(Money::from_units(16)),
            )
            .await
            .unwrap();

        assert_eq!(outcome.new_stock, 15);
        assert_eq!(outcome.unit_cost, Some(Money::from_units(10)));
        assert_eq!(
            outcome.summary,
            "Stock updated to 15. Invoice $50.00 (unit cost $10.00). New price $16.00."
        );

        let product = db.products().get_by_id("p1").await.unwrap().unwrap();
        assert_eq!(product.stock, 15);
        assert_eq!(product.cost, Money::from_units(10));
        assert_eq!(product.price, Money::from_units(16));

        // The invoice row carries the acting user and no batch.
        let recent = service.recent_invoices(10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].invoice.created_by, "caro");
        assert_eq!(recent[0].invoice.batch_id, None);
    }

    #[tokio::test]
    async fn test_restock_derives_four_decimal_cost() {
        let db = test_db().await;
        let service = RestockService::new(db.clone());
        seed_product(&db, "p1", 0).await;

        // $100 over 3 units: $33.3333 exactly, stored without drift.
        let outcome = service
            .restock(&caro(), "p1", 3, Some(Money::from_units(100)), None)
            .await
            .unwrap();
        assert_eq!(outcome.unit_cost, Some(Money::from_scaled(333_333)));

        let product = db.products().get_by_id("p1").await.unwrap().unwrap();
        assert_eq!(product.cost, Money::from_scaled(333_333));
    }

    #[tokio::test]
    async fn test_restock_without_invoice_is_a_silent_correction() {
        let db = test_db().await;
        let service = RestockService::new(db.clone());
        seed_product(&db, "p1", 10).await;

        let outcome = service.restock(&caro(), "p1", 3, None, None).await.unwrap();

        assert_eq!(outcome.new_stock, 13);
        assert_eq!(outcome.unit_cost, None);
        assert_eq!(outcome.summary, "Stock updated to 13.");

        let product = db.products().get_by_id("p1").await.unwrap().unwrap();
        assert_eq!(product.stock, 13);
        assert_eq!(product.cost, Money::from_units(9));
        assert_eq!(product.price, Money::from_units(15));
        assert!(service.recent_invoices(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_restock_rejects_bad_input() {
        let db = test_db().await;
        let service = RestockService::new(db.clone());
        seed_product(&db, "p1", 10).await;

        assert!(matches!(
            service.restock(&caro(), "p1", 0, None, None).await.unwrap_err(),
            ServiceError::Validation(_)
        ));
        assert!(matches!(
            service
                .restock(&caro(), "p1", 5, Some(Money::from_scaled(-1)), None)
                .await
                .unwrap_err(),
            ServiceError::Validation(_)
        ));
        assert!(matches!(
            service.restock(&caro(), "ghost", 5, None, None).await.unwrap_err(),
            ServiceError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_submit_draft_shares_one_batch() {
        let db = test_db().await;
        let service = RestockService::new(db.clone());
        let a = seed_product(&db, "p1", 0).await;
        let b = seed_product(&db, "p2", 0).await;
        let c = seed_product(&db, "p3", 4).await;

        let mut draft = PurchaseDraft::new(Some("Distribuidora Sur".to_string()));
        draft.add_line(&a, 12, Some(Money::from_units(108)), None).unwrap();
        draft
            .add_line(&b, 6, Some(Money::from_units(90)), Some(Money::from_units(20)))
            .unwrap();
        // A count fix rides along without joining the invoice ledger.
        draft.add_line(&c, 2, None, None).unwrap();

        let outcome = service.submit_draft(&caro(), &draft).await.unwrap();
        assert_eq!(outcome.lines, 3);
        assert_eq!(outcome.total_quantity, 20);
        assert_eq!(outcome.invoice_total, Money::from_units(198));

        // Stock landed on all three products.
        assert_eq!(db.products().get_by_id("p1").await.unwrap().unwrap().stock, 12);
        assert_eq!(db.products().get_by_id("p2").await.unwrap().unwrap().stock, 6);
        assert_eq!(db.products().get_by_id("p3").await.unwrap().unwrap().stock, 6);

        // Only the priced lines wrote invoice rows; both share the batch id
        // and the supplier label.
        let recent = service.recent_invoices(10).await.unwrap();
        assert_eq!(recent.len(), 2);
        for row in &recent {
            assert_eq!(row.invoice.batch_id.as_deref(), Some(outcome.batch_id.as_str()));
            assert_eq!(row.invoice.company.as_deref(), Some("Distribuidora Sur"));
        }
    }

    #[tokio::test]
    async fn test_submit_empty_draft_is_rejected() {
        let db = test_db().await;
        let service = RestockService::new(db);

        let draft = PurchaseDraft::default();
        let err = service.submit_draft(&caro(), &draft).await.unwrap_err();
        assert!(matches!(err, ServiceError::EmptyDraft));
    }

    #[tokio::test]
    async fn test_submit_draft_unknown_product_applies_nothing() {
        let db = test_db().await;
        let service = RestockService::new(db.clone());
        let a = seed_product(&db, "p1", 0).await;

        let mut ghost = a.clone();
        ghost.id = "ghost".to_string();

        let mut draft = PurchaseDraft::default();
        draft.add_line(&a, 5, Some(Money::from_units(50)), None).unwrap();
        draft.add_line(&ghost, 2, Some(Money::from_units(20)), None).unwrap();

        let err = service.submit_draft(&caro(), &draft).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));

        // The good line rolled back with the bad one.
        assert_eq!(db.products().get_by_id("p1").await.unwrap().unwrap().stock, 0);
        assert!(service.recent_invoices(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_batch_reversal_floors_every_line_at_zero() {
        let db = test_db().await;
        let service = RestockService::new(db.clone());
        let a = seed_product(&db, "p1", 0).await;
        let b = seed_product(&db, "p2", 0).await;
        let c = seed_product(&db, "p3", 0).await;

        let mut draft = PurchaseDraft::default();
        for product in [&a, &b, &c] {
            draft
                .add_line(product, 10, Some(Money::from_units(90)), None)
                .unwrap();
        }
        let outcome = service.submit_draft(&caro(), &draft).await.unwrap();

        // Sales since delivery leave stocks at {5, 10, 2}.
        db.sales().record_sale("p1", 5).await.unwrap();
        db.sales().record_sale("p3", 8).await.unwrap();

        let deleted = service.delete_batch(&outcome.batch_id, true).await.unwrap();
        assert_eq!(deleted, 3);

        // Each line reverses at most what is still there.
        assert_eq!(db.products().get_by_id("p1").await.unwrap().unwrap().stock, 0);
        assert_eq!(db.products().get_by_id("p2").await.unwrap().unwrap().stock, 0);
        assert_eq!(db.products().get_by_id("p3").await.unwrap().unwrap().stock, 0);

        assert!(matches!(
            service.delete_batch(&outcome.batch_id, true).await.unwrap_err(),
            ServiceError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_delete_single_invoice_without_reversal() {
        let db = test_db().await;
        let service = RestockService::new(db.clone());
        seed_product(&db, "p1", 0).await;

        service
            .restock(&caro(), "p1", 5, Some(Money::from_units(50)), None)
            .await
            .unwrap();
        let recent = service.recent_invoices(1).await.unwrap();

        service
            .delete_invoice(&recent[0].invoice.id, false)
            .await
            .unwrap();

        // Ledger row gone, stock kept.
        assert!(service.recent_invoices(10).await.unwrap().is_empty());
        assert_eq!(db.products().get_by_id("p1").await.unwrap().unwrap().stock, 5);
    }
}
