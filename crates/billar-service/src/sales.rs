//! # Sale Register
//!
//! The point-of-sale operation: charge for units and move stock, atomically.
//!
//! ## One Transaction, Two Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      register_sale(product, qty)                        │
//! │                                                                         │
//! │  validate qty ─► load product ─► stock check ─► ONE transaction:        │
//! │                                                   stock -= qty          │
//! │                                                   INSERT sale row       │
//! │                                                                         │
//! │  total = round(price × qty, 2) is stamped on the sale row, so later     │
//! │  price edits never rewrite what was charged.                            │
//! │                                                                         │
//! │  The decrement is guarded (stock >= qty) inside the transaction: a      │
//! │  concurrent sale that slips past the availability check here still      │
//! │  cannot drive stock negative.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use billar_core::validation::validate_quantity;
use billar_core::Money;
use billar_db::{Database, DbError, SaleDetailRow};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{Feedback, ServiceError, ServiceResult};

/// Result of a recorded sale.
#[derive(Debug, Clone, Serialize)]
pub struct SaleOutcome {
    pub sale_id: String,
    pub product_name: String,
    pub qty: i64,
    /// Amount charged: `round(price × qty, 2)`.
    pub total: Money,
    pub summary: String,
}

impl From<SaleOutcome> for Feedback {
    fn from(outcome: SaleOutcome) -> Self {
        Feedback::success(outcome.summary)
    }
}

/// The sale register.
pub struct SaleService {
    db: Database,
}

impl SaleService {
    pub fn new(db: Database) -> Self {
        SaleService { db }
    }

    /// Records a sale of `qty` units of a product.
    ///
    /// Decrements stock and inserts the sale row in one transaction; a
    /// failure in either write rolls both back, so stock never moves
    /// without a matching sale row.
    ///
    /// ## Errors
    /// - `Validation` for a non-positive quantity
    /// - `NotFound` if the product does not exist
    /// - `InsufficientStock` if fewer than `qty` units are available,
    ///   naming the product and the available count
    pub async fn register_sale(&self, product_id: &str, qty: i64) -> ServiceResult<SaleOutcome> {
        validate_quantity(qty)?;

        let product = self
            .db
            .products()
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound {
                entity: "Product".to_string(),
                id: product_id.to_string(),
            })?;

        if product.stock < qty {
            return Err(ServiceError::InsufficientStock {
                name: product.name,
                available: product.stock,
                requested: qty,
            });
        }

        let sale = match self.db.sales().record_sale(product_id, qty).await {
            Ok(sale) => sale,
            // A concurrent sale can land between the check above and the
            // guarded decrement; report the count as it stands now.
            Err(DbError::TransactionFailed(_)) => {
                let available = self
                    .db
                    .products()
                    .get_by_id(product_id)
                    .await?
                    .map(|p| p.stock)
                    .unwrap_or(0);
                warn!(product = %product.name, requested = qty, available, "Sale lost a stock race");
                return Err(ServiceError::InsufficientStock {
                    name: product.name,
                    available,
                    requested: qty,
                });
            }
            Err(other) => return Err(other.into()),
        };

        let summary = format!(
            "Sale recorded: {} x {}. Total {}.",
            qty, product.name, sale.total
        );
        info!(sale_id = %sale.id, product = %product.name, qty, total = %sale.total, "Sale registered");

        Ok(SaleOutcome {
            sale_id: sale.id,
            product_name: product.name,
            qty,
            total: sale.total,
            summary,
        })
    }

    /// Lists sales between two instants (both inclusive), oldest first,
    /// joined with the product row for display.
    pub async fn sales_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ServiceResult<Vec<SaleDetailRow>> {
        Ok(self.db.sales().list_between(start, end).await?)
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
    use chrono::Duration;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_product(db: &Database, id: &str, price_units: i64, stock: i64) {
        db.products()
            .insert(&Product {
                id: id.to_string(),
                code: Some(format!("C-{}", id)),
                name: format!("Product {}", id),
                price: Money::from_units(price_units),
                cost: Money::from_units(price_units / 2),
                stock,
                iva_bps: 2100,
                company: None,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_register_sale_charges_and_decrements() {
        let db = test_db().await;
        let service = SaleService::new(db.clone());
        seed_product(&db, "p1", 2300, 10).await;

        let outcome = service.register_sale("p1", 2).await.unwrap();

        assert_eq!(outcome.qty, 2);
        assert_eq!(outcome.total, Money::from_units(4600));
        assert_eq!(
            outcome.summary,
            "Sale recorded: 2 x Product p1. Total $4600.00."
        );

        let product = db.products().get_by_id("p1").await.unwrap().unwrap();
        assert_eq!(product.stock, 8);
    }

    #[tokio::test]
    async fn test_register_sale_insufficient_stock_reports_available() {
        let db = test_db().await;
        let service = SaleService::new(db.clone());
        seed_product(&db, "p1", 15, 2).await;

        let err = service.register_sale("p1", 5).await.unwrap_err();
        match err {
            ServiceError::InsufficientStock {
                name,
                available,
                requested,
            } => {
                assert_eq!(name, "Product p1");
                assert_eq!(available, 2);
                assert_eq!(requested, 5);
            }
            other => panic!("expected InsufficientStock, got {:?}", other),
        }

        // Nothing moved and nothing was charged.
        let product = db.products().get_by_id("p1").await.unwrap().unwrap();
        assert_eq!(product.stock, 2);
        let now = Utc::now();
        assert!(service
            .sales_between(now - Duration::hours(1), now)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_register_sale_feedback_message() {
        let db = test_db().await;
        let service = SaleService::new(db.clone());
        seed_product(&db, "p1", 15, 2).await;

        let fb = Feedback::from_result(service.register_sale("p1", 5).await);
        assert!(!fb.ok);
        assert_eq!(
            fb.message,
            "Insufficient stock for Product p1: available 2, requested 5"
        );
    }

    #[tokio::test]
    async fn test_register_sale_rejects_non_positive_qty() {
        let db = test_db().await;
        let service = SaleService::new(db.clone());
        seed_product(&db, "p1", 15, 10).await;

        for qty in [0, -3] {
            let err = service.register_sale("p1", qty).await.unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)));
        }
        let product = db.products().get_by_id("p1").await.unwrap().unwrap();
        assert_eq!(product.stock, 10);
    }

    #[tokio::test]
    async fn test_register_sale_missing_product() {
        let db = test_db().await;
        let service = SaleService::new(db);

        let err = service.register_sale("ghost", 1).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_exact_stock_sells_out_to_zero() {
        let db = test_db().await;
        let service = SaleService::new(db.clone());
        seed_product(&db, "p1", 15, 4).await;

        service.register_sale("p1", 4).await.unwrap();

        let product = db.products().get_by_id("p1").await.unwrap().unwrap();
        assert_eq!(product.stock, 0);

        // The next unit is refused.
        let err = service.register_sale("p1", 1).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::InsufficientStock { available: 0, .. }
        ));
    }

    #[tokio::test]
    async fn test_sales_between_lists_history() {
        let db = test_db().await;
        let service = SaleService::new(db.clone());
        seed_product(&db, "p1", 15, 10).await;

        let start = Utc::now();
        service.register_sale("p1", 1).await.unwrap();
        service.register_sale("p1", 2).await.unwrap();

        let rows = service
            .sales_between(start, Utc::now())
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        // Oldest first.
        assert_eq!(rows[0].qty, 1);
        assert_eq!(rows[1].qty, 2);
    }
}
