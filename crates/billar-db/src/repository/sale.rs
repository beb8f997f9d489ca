//! # Sale Repository
//!
//! Data access for recorded sales.
//!
//! ## Responsibilities
//! - Recording a sale and decrementing stock in one transaction
//! - Reporting reads: sale rows joined with the catalog, and per-product
//!   sold quantities after a cutoff (feeds stock reconstruction)

use std::collections::HashMap;

use billar_core::{Money, Product, Sale};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// A sale joined with its product row, shaped for receipts and reports.
///
/// `total` is what was actually charged at sale time; `cost` and `price` are
/// the product's *current* values, so profit figures follow catalog edits.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SaleDetailRow {
    pub id: String,
    pub product_name: String,
    pub qty: i64,
    pub total: Money,
    pub sold_at: DateTime<Utc>,
    pub cost: Money,
    pub price: Money,
}

/// Repository for sale operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new sale repository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Records a sale of `qty` units, decrementing stock atomically.
    ///
    /// ## Transaction
    /// The stock decrement and the sale row commit together; if either write
    /// fails the transaction drops and SQLite rolls both back. Stock is never
    /// reduced without a matching sale, and vice versa.
    ///
    /// ## Total
    /// `round(price × qty, 2)` at the product's current price. The charged
    /// amount lives on the sale row, so later price edits don't rewrite
    /// history.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - No product with that id
    /// * `DbError::TransactionFailed` - Stock dropped below `qty` between the
    ///   caller's availability check and this write (concurrent sale)
    pub async fn record_sale(&self, product_id: &str, qty: i64) -> DbResult<Sale> {
        let mut tx = self.pool.begin().await?;

        let product = sqlx::query_as::<_, Product>(
            "SELECT id, code, name, price, cost, stock, iva_bps, company, created_at
             FROM products
             WHERE id = ?1",
        )
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Product", product_id))?;

        // Guarded decrement: refuses to drive stock negative even when a
        // concurrent sale landed after the caller's availability check.
        let guarded =
            sqlx::query("UPDATE products SET stock = stock - ?2 WHERE id = ?1 AND stock >= ?2")
                .bind(product_id)
                .bind(qty)
                .execute(&mut *tx)
                .await?;

        if guarded.rows_affected() == 0 {
            return Err(DbError::TransactionFailed(format!(
                "stock for {} is {}, cannot deduct {}",
                product.name, product.stock, qty
            )));
        }

        let sale = Sale {
            id: Self::generate_sale_id(),
            product_id: product_id.to_string(),
            qty,
            total: Money::sale_total(product.price, qty),
            sold_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO sales (id, product_id, qty, total, sold_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&sale.id)
        .bind(&sale.product_id)
        .bind(sale.qty)
        .bind(sale.total)
        .bind(sale.sold_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(sale_id = %sale.id, product = %product.name, qty, "Sale recorded");
        Ok(sale)
    }

    /// Inserts a pre-built sale row without touching stock.
    ///
    /// ## When To Use
    /// Importing history (paper ledger, old system) where stock was already
    /// counted. Live registers go through `record_sale`.
    pub async fn insert(&self, sale: &Sale) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO sales (id, product_id, qty, total, sold_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&sale.id)
        .bind(&sale.product_id)
        .bind(sale.qty)
        .bind(sale.total)
        .bind(sale.sold_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets one sale joined with its product (for reprinting a receipt).
    pub async fn get_detail(&self, sale_id: &str) -> DbResult<Option<SaleDetailRow>> {
        let row = sqlx::query_as::<_, SaleDetailRow>(
            "SELECT s.id, p.name AS product_name, s.qty, s.total, s.sold_at,
                    p.cost, p.price
             FROM sales s
             JOIN products p ON p.id = s.product_id
             WHERE s.id = ?1",
        )
        .bind(sale_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Lists sales between two timestamps (both inclusive), oldest first.
    pub async fn list_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<SaleDetailRow>> {
        let rows = sqlx::query_as::<_, SaleDetailRow>(
            "SELECT s.id, p.name AS product_name, s.qty, s.total, s.sold_at,
                    p.cost, p.price
             FROM sales s
             JOIN products p ON p.id = s.product_id
             WHERE s.sold_at >= ?1 AND s.sold_at <= ?2
             ORDER BY s.sold_at",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Listed sales for report");
        Ok(rows)
    }

    /// Sums units sold per product strictly after the cutoff.
    ///
    /// Feeds historical stock reconstruction: stock at the cutoff is current
    /// stock plus these quantities, minus quantities restocked since.
    pub async fn qty_sold_after(&self, cutoff: DateTime<Utc>) -> DbResult<HashMap<String, i64>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT product_id, SUM(qty)
             FROM sales
             WHERE sold_at > ?1
             GROUP BY product_id",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    /// Generates a new unique sale id.
    pub fn generate_sale_id() -> String {
        Uuid::new_v4().to_string()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
