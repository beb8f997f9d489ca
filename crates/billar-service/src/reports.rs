//! # Report Building
//!
//! Assembles the printable documents: price list, sale receipts, and the
//! detailed sales report. The service computes plain data rows; turning
//! them into bytes is the renderer's job, behind the
//! [`DocumentRenderer`] trait.
//!
//! ## Documents
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  price_list()          catalog as PriceListRow, one line per product    │
//! │  sales_between(a, b)   per-sale rows with profit = (price − cost) × n   │
//! │  receipt(sale_id)      reprint data for a recorded sale                 │
//! │  quick_receipt(p, n)   price inquiry; nothing recorded, stock untouched │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `cost` and `price` on report rows are the product's *current* values;
//! only `income` is the amount actually charged at sale time. Profit
//! figures therefore follow catalog edits, which is how the register's
//! paper reports always worked.

use billar_core::validation::validate_quantity;
use billar_core::{
    DocumentRenderer, Money, PriceListRow, ReceiptData, SalesReportRow,
};
use billar_db::Database;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{ServiceError, ServiceResult};

/// Builds report rows and rendered documents.
pub struct ReportService {
    db: Database,
    business_name: String,
}

impl ReportService {
    pub fn new(db: Database, business_name: impl Into<String>) -> Self {
        ReportService {
            db,
            business_name: business_name.into(),
        }
    }

    // =========================================================================
    // Rows
    // =========================================================================

    /// The whole catalog as price-list rows, ordered by name.
    pub async fn price_list(&self) -> ServiceResult<Vec<PriceListRow>> {
        let products = self.db.products().list().await?;
        let rows = products
            .into_iter()
            .map(|p| PriceListRow {
                code: p.code,
                name: p.name,
                qty: p.stock,
                unit_cost: p.cost,
                sale_price: p.price,
                iva_bps: p.iva_bps,
            })
            .collect();
        Ok(rows)
    }

    /// Per-sale report rows between two instants (both inclusive), oldest
    /// first.
    pub async fn sales_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ServiceResult<Vec<SalesReportRow>> {
        let rows = self.db.sales().list_between(start, end).await?;
        debug!(count = rows.len(), "Built sales report rows");
        Ok(rows
            .into_iter()
            .map(|r| SalesReportRow {
                product_name: r.product_name,
                units: r.qty,
                unit_cost: r.cost,
                unit_price: r.price,
                income: r.total,
                sold_at: r.sold_at,
            })
            .collect())
    }

    /// Receipt data for a recorded sale (reprint path).
    ///
    /// ## Errors
    /// - `NotFound` if no sale has that id
    pub async fn receipt(&self, sale_id: &str) -> ServiceResult<ReceiptData> {
        let detail = self
            .db
            .sales()
            .get_detail(sale_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound {
                entity: "Sale".to_string(),
                id: sale_id.to_string(),
            })?;

        Ok(ReceiptData {
            business_name: self.business_name.clone(),
            product_name: detail.product_name,
            qty: detail.qty,
            unit_cost: detail.cost,
            unit_price: detail.price,
            total: detail.total,
            issued_at: detail.sold_at,
        })
    }

    /// Price-inquiry receipt: what `qty` units would cost right now.
    /// Nothing is recorded and stock is untouched.
    ///
    /// ## Errors
    /// - `Validation` for a non-positive quantity
    /// - `NotFound` if the product does not exist
    pub async fn quick_receipt(&self, product_id: &str, qty: i64) -> ServiceResult<ReceiptData> {
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

        Ok(ReceiptData {
            business_name: self.business_name.clone(),
            product_name: product.name,
            qty,
            unit_cost: product.cost,
            unit_price: product.price,
            total: Money::sale_total(product.price, qty),
            issued_at: Utc::now(),
        })
    }

    // =========================================================================
    // Rendered documents
    // =========================================================================

    /// Renders the current price list, titled with the business name.
    pub async fn render_price_list(
        &self,
        renderer: &dyn DocumentRenderer,
    ) -> ServiceResult<Vec<u8>> {
        let rows = self.price_list().await?;
        let title = format!("PRICE LIST - {}", self.business_name);
        Ok(renderer.render_price_list(&title, &rows))
    }

    /// Renders the detailed sales report for a date window.
    pub async fn render_sales_report(
        &self,
        renderer: &dyn DocumentRenderer,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ServiceResult<Vec<u8>> {
        let rows = self.sales_between(start, end).await?;
        let title = format!(
            "SALES {} TO {}",
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        );
        Ok(renderer.render_sales_report(&title, &rows))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use billar_core::{Product, TextRenderer};
    use billar_db::DbConfig;
    use chrono::Duration;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn service(db: &Database) -> ReportService {
        ReportService::new(db.clone(), "Club de Billar")
    }

    async fn seed_fernet(db: &Database) {
        db.products()
            .insert(&Product {
                id: "p1".to_string(),
                code: Some("FER".to_string()),
                name: "Fernet 750".to_string(),
                price: Money::from_units(9000),
                cost: Money::from_units(6500),
                stock: 12,
                iva_bps: 2100,
                company: None,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_price_list_mirrors_catalog() {
        let db = test_db().await;
        seed_fernet(&db).await;

        let rows = service(&db).price_list().await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Fernet 750");
        assert_eq!(rows[0].qty, 12);
        assert_eq!(rows[0].sale_price, Money::from_units(9000));
        // 12 × 6500 × 1.21 = 94,380
        assert_eq!(rows[0].line_total_with_tax(), Money::from_units(94_380));
    }

    #[tokio::test]
    async fn test_rendered_price_list_carries_title() {
        let db = test_db().await;
        seed_fernet(&db).await;

        let bytes = service(&db)
            .render_price_list(&TextRenderer::default())
            .await
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("PRICE LIST - Club de Billar"));
        assert!(text.contains("Fernet 750"));
        assert!(text.contains("$ 94.380"));
    }

    #[tokio::test]
    async fn test_sales_report_rows_and_profit() {
        let db = test_db().await;
        seed_fernet(&db).await;

        let start = Utc::now() - Duration::hours(1);
        db.sales().record_sale("p1", 2).await.unwrap();

        let rows = service(&db)
            .sales_between(start, Utc::now())
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].units, 2);
        assert_eq!(rows[0].income, Money::from_units(18_000));
        // (9000 - 6500) × 2
        assert_eq!(rows[0].profit(), Money::from_units(5000));
    }

    #[tokio::test]
    async fn test_rendered_sales_report_totals() {
        let db = test_db().await;
        seed_fernet(&db).await;

        let start = Utc::now() - Duration::hours(1);
        db.sales().record_sale("p1", 2).await.unwrap();
        db.sales().record_sale("p1", 1).await.unwrap();

        let bytes = service(&db)
            .render_sales_report(&TextRenderer::default(), start, Utc::now())
            .await
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.contains("TOTAL UNITS: 3"));
        assert!(text.contains("TOTAL INCOME: $ 27.000"));
        assert!(text.contains("TOTAL PROFIT: $ 7.500"));
    }

    #[tokio::test]
    async fn test_receipt_reprints_a_recorded_sale() {
        let db = test_db().await;
        seed_fernet(&db).await;

        let sale = db.sales().record_sale("p1", 2).await.unwrap();
        let receipt = service(&db).receipt(&sale.id).await.unwrap();

        assert_eq!(receipt.business_name, "Club de Billar");
        assert_eq!(receipt.product_name, "Fernet 750");
        assert_eq!(receipt.total, Money::from_units(18_000));
        assert_eq!(receipt.issued_at, sale.sold_at);

        let err = service(&db).receipt("ghost").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_quick_receipt_records_nothing() {
        let db = test_db().await;
        seed_fernet(&db).await;
        let reports = service(&db);

        let receipt = reports.quick_receipt("p1", 3).await.unwrap();
        assert_eq!(receipt.total, Money::from_units(27_000));

        // No sale row, no stock movement.
        let now = Utc::now();
        assert!(db
            .sales()
            .list_between(now - Duration::hours(1), now)
            .await
            .unwrap()
            .is_empty());
        let product = db.products().get_by_id("p1").await.unwrap().unwrap();
        assert_eq!(product.stock, 12);

        assert!(matches!(
            reports.quick_receipt("p1", 0).await.unwrap_err(),
            ServiceError::Validation(_)
        ));
    }
}
