//! # Invoice Repository
//!
//! Data access for restock invoices.
//!
//! ## Responsibilities
//! - Applying a restock batch: stock increments, cost/price updates and the
//!   invoice audit rows, all in one transaction
//! - Deleting an invoice or a whole batch, optionally reversing its stock
//! - Per-product restocked quantities after a cutoff (feeds stock
//!   reconstruction)
//!
//! ## Audit Rows Are Optional
//! A line restocked *without* an invoice total is a plain stock correction
//! and writes no invoice row. Those corrections are therefore invisible to
//! historical reconstruction; `billar_core::inventory` documents the caveat.

use std::collections::HashMap;

use billar_core::{Invoice, Money};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// One product line of a restock batch, ready to apply.
///
/// `new_cost` carries the unit cost derived from the supplier total when one
/// was given; `invoice` carries the matching audit row. Both are `None` for a
/// plain stock correction.
#[derive(Debug, Clone)]
pub struct RestockLine {
    pub product_id: String,
    pub qty: i64,
    pub new_cost: Option<Money>,
    pub new_price: Option<Money>,
    pub invoice: Option<Invoice>,
}

/// An invoice joined with its product name and code for display.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct InvoiceWithProduct {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub invoice: Invoice,
    pub product_name: String,
    pub product_code: Option<String>,
}

/// Repository for restock invoice operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    /// Creates a new invoice repository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Applies a restock batch in one transaction.
    ///
    /// Per line: `stock += qty`, cost and price overwritten only when the
    /// line carries new values, audit row inserted only when the line carries
    /// one. Any failure (unknown product included) rolls the whole batch
    /// back, so a supplier delivery is never half-applied.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - A line references a product that doesn't exist
    pub async fn apply(&self, lines: &[RestockLine]) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        for line in lines {
            let result = sqlx::query(
                "UPDATE products
                 SET stock = stock + ?2,
                     cost = COALESCE(?3, cost),
                     price = COALESCE(?4, price)
                 WHERE id = ?1",
            )
            .bind(&line.product_id)
            .bind(line.qty)
            .bind(line.new_cost)
            .bind(line.new_price)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(DbError::not_found("Product", &line.product_id));
            }

            if let Some(invoice) = &line.invoice {
                sqlx::query(
                    "INSERT INTO invoices (id, product_id, qty, invoice_total, unit_cost,
                                           new_price, created_by, batch_id, company, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                )
                .bind(&invoice.id)
                .bind(&invoice.product_id)
                .bind(invoice.qty)
                .bind(invoice.invoice_total)
                .bind(invoice.unit_cost)
                .bind(invoice.new_price)
                .bind(&invoice.created_by)
                .bind(&invoice.batch_id)
                .bind(&invoice.company)
                .bind(invoice.created_at)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        info!(lines = lines.len(), "Restock batch applied");
        Ok(())
    }

    /// Deletes every invoice in a batch, optionally reversing its stock.
    ///
    /// ## Reversal Floors At Zero
    /// The restocked goods may have been sold in the meantime, so reversal
    /// subtracts what it can: `stock = max(0, stock - qty)` per line.
    ///
    /// ## Returns
    /// The number of invoice rows deleted.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - No invoices carry that batch id
    pub async fn delete_batch(&self, batch_id: &str, reverse_stock: bool) -> DbResult<u64> {
        let mut tx = self.pool.begin().await?;

        let lines =
            sqlx::query_as::<_, (String, i64)>("SELECT product_id, qty FROM invoices WHERE batch_id = ?1")
                .bind(batch_id)
                .fetch_all(&mut *tx)
                .await?;

        if lines.is_empty() {
            return Err(DbError::not_found("Invoice batch", batch_id));
        }

        if reverse_stock {
            for (product_id, qty) in &lines {
                sqlx::query("UPDATE products SET stock = MAX(0, stock - ?2) WHERE id = ?1")
                    .bind(product_id)
                    .bind(qty)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        let deleted = sqlx::query("DELETE FROM invoices WHERE batch_id = ?1")
            .bind(batch_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        info!(batch_id = %batch_id, deleted, reverse_stock, "Invoice batch deleted");
        Ok(deleted)
    }

    /// Deletes a single invoice, optionally reversing its stock (floored at
    /// zero, same as batch deletion).
    ///
    /// ## Errors
    /// * `DbError::NotFound` - No invoice with that id
    pub async fn delete_invoice(&self, id: &str, reverse_stock: bool) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let (product_id, qty) =
            sqlx::query_as::<_, (String, i64)>("SELECT product_id, qty FROM invoices WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| DbError::not_found("Invoice", id))?;

        if reverse_stock {
            sqlx::query("UPDATE products SET stock = MAX(0, stock - ?2) WHERE id = ?1")
                .bind(&product_id)
                .bind(qty)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("DELETE FROM invoices WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(invoice_id = %id, reverse_stock, "Invoice deleted");
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Lists the most recent invoices, newest first.
    pub async fn list_recent(&self, limit: i64) -> DbResult<Vec<InvoiceWithProduct>> {
        let rows = sqlx::query_as::<_, InvoiceWithProduct>(
            "SELECT i.id, i.product_id, i.qty, i.invoice_total, i.unit_cost, i.new_price,
                    i.created_by, i.batch_id, i.company, i.created_at,
                    p.name AS product_name, p.code AS product_code
             FROM invoices i
             JOIN products p ON p.id = i.product_id
             ORDER BY i.created_at DESC
             LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Listed recent invoices");
        Ok(rows)
    }

    /// Sums units restocked per product strictly after the cutoff.
    ///
    /// Only restocks that wrote an invoice row are visible here; plain stock
    /// corrections leave no trace.
    pub async fn qty_added_after(&self, cutoff: DateTime<Utc>) -> DbResult<HashMap<String, i64>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT product_id, SUM(qty)
             FROM invoices
             WHERE created_at > ?1
             GROUP BY product_id",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    /// Generates a new unique invoice id.
    pub fn generate_invoice_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Generates a batch id shared by every line of one draft submission.
    ///
    /// Time-based so batches sort chronologically in listings; the nanosecond
    /// tail keeps two submissions in the same second apart.
    pub fn generate_batch_id() -> String {
        let now = Utc::now();
        format!(
            "{}-{:09}",
            now.format("%Y%m%d%H%M%S"),
            now.timestamp_subsec_nanos()
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
