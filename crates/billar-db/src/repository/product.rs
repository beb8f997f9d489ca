//! # Product Repository
//!
//! Data access for the product catalog.
//!
//! ## Responsibilities
//! - CRUD for catalog rows (lookup by id and by short code)
//! - Dependent-record check before delete: a product referenced by sales or
//!   invoices stays, otherwise historical reports would dangle
//!
//! ## What Lives Elsewhere
//! - Stock decrements for sales: `SaleRepository` (same transaction as the sale)
//! - Stock increments for restocks: `InvoiceRepository` (same transaction as
//!   the invoice batch)

use billar_core::Product;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// Repository for product catalog operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new product repository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Lists all products ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, code, name, price, cost, stock, iva_bps, company, created_at
             FROM products
             ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Gets a product by its id.
    ///
    /// ## Returns
    /// * `Ok(Some(product))` - Found
    /// * `Ok(None)` - No product with that id
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, code, name, price, cost, stock, iva_bps, company, created_at
             FROM products
             WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its short code (the code printed on shelf labels).
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, code, name, price, cost, stock, iva_bps, company, created_at
             FROM products
             WHERE code = ?1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Counts all products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Inserts a new product.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - A product with the same code exists
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO products (id, code, name, price, cost, stock, iva_bps, company, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(&product.id)
        .bind(&product.code)
        .bind(&product.name)
        .bind(product.price)
        .bind(product.cost)
        .bind(product.stock)
        .bind(product.iva_bps)
        .bind(&product.company)
        .bind(product.created_at)
        .execute(&self.pool)
        .await?;

        info!(product_id = %product.id, name = %product.name, "Product created");
        Ok(())
    }

    /// Updates an existing product (all mutable columns; `created_at` is
    /// never touched).
    ///
    /// ## Errors
    /// * `DbError::NotFound` - No product with that id
    /// * `DbError::UniqueViolation` - The new code collides with another product
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE products
             SET code = ?2, name = ?3, price = ?4, cost = ?5, stock = ?6,
                 iva_bps = ?7, company = ?8
             WHERE id = ?1",
        )
        .bind(&product.id)
        .bind(&product.code)
        .bind(&product.name)
        .bind(product.price)
        .bind(product.cost)
        .bind(product.stock)
        .bind(product.iva_bps)
        .bind(&product.company)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        info!(product_id = %product.id, "Product updated");
        Ok(())
    }

    /// Deletes a product, refusing when sales or invoices reference it.
    ///
    /// ## Why Refuse
    /// Sales and invoice rows carry only the product id. Deleting a referenced
    /// product would orphan those rows and silently corrupt every historical
    /// report that joins back to the catalog.
    ///
    /// ## Errors
    /// * `DbError::HasDependents` - Sales or invoices reference the product
    /// * `DbError::NotFound` - No product with that id
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let sale_refs: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sales WHERE product_id = ?1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        let invoice_refs: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM invoices WHERE product_id = ?1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        let dependents = sale_refs + invoice_refs;
        if dependents > 0 {
            return Err(DbError::HasDependents {
                entity: "Product".to_string(),
                id: id.to_string(),
                dependents,
            });
        }

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        tx.commit().await?;

        info!(product_id = %id, "Product deleted");
        Ok(())
    }

    /// Generates a new unique product id.
    pub fn generate_product_id() -> String {
        Uuid::new_v4().to_string()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use billar_core::{Money, Sale};
    use chrono::Utc;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn sample_product(id: &str, code: &str) -> Product {
        Product {
            id: id.to_string(),
            code: Some(code.to_string()),
            name: format!("Product {}", code),
            price: Money::from_units(15),
            cost: Money::from_units(9),
            stock: 20,
            iva_bps: 2100,
            company: Some("Distribuidora Sur".to_string()),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let repo = db.products();

        let product = sample_product("p1", "FER-750");
        repo.insert(&product).await.unwrap();

        let by_id = repo.get_by_id("p1").await.unwrap().unwrap();
        assert_eq!(by_id.name, "Product FER-750");
        assert_eq!(by_id.price, Money::from_units(15));
        assert_eq!(by_id.stock, 20);
        assert_eq!(by_id.iva_bps, 2100);

        let by_code = repo.get_by_code("FER-750").await.unwrap().unwrap();
        assert_eq!(by_code.id, "p1");
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let db = test_db().await;
        let repo = db.products();

        assert!(repo.get_by_id("nope").await.unwrap().is_none());
        assert!(repo.get_by_code("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&sample_product("p1", "QUI-001")).await.unwrap();
        let err = repo
            .insert(&sample_product("p2", "QUI-001"))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_list_ordered_by_name() {
        let db = test_db().await;
        let repo = db.products();

        let mut zeta = sample_product("p1", "Z-1");
        zeta.name = "Zumo".to_string();
        let mut alfa = sample_product("p2", "A-1");
        alfa.name = "Agua".to_string();

        repo.insert(&zeta).await.unwrap();
        repo.insert(&alfa).await.unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Agua");
        assert_eq!(all[1].name, "Zumo");
    }

    #[tokio::test]
    async fn test_update() {
        let db = test_db().await;
        let repo = db.products();

        let mut product = sample_product("p1", "FER-750");
        repo.insert(&product).await.unwrap();

        product.price = Money::from_units(18);
        product.stock = 35;
        repo.update(&product).await.unwrap();

        let updated = repo.get_by_id("p1").await.unwrap().unwrap();
        assert_eq!(updated.price, Money::from_units(18));
        assert_eq!(updated.stock, 35);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let db = test_db().await;
        let repo = db.products();

        let err = repo.update(&sample_product("ghost", "G-1")).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&sample_product("p1", "FER-750")).await.unwrap();
        repo.delete("p1").await.unwrap();

        assert!(repo.get_by_id("p1").await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_blocked_by_sales() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&sample_product("p1", "FER-750")).await.unwrap();
        db.sales()
            .insert(&Sale {
                id: "s1".to_string(),
                product_id: "p1".to_string(),
                qty: 2,
                total: Money::from_units(30),
                sold_at: Utc::now(),
            })
            .await
            .unwrap();

        let err = repo.delete("p1").await.unwrap_err();
        assert!(matches!(
            err,
            DbError::HasDependents { dependents: 1, .. }
        ));

        // Still there.
        assert!(repo.get_by_id("p1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_generated_ids_are_unique() {
        let a = ProductRepository::generate_product_id();
        let b = ProductRepository::generate_product_id();
        assert_ne!(a, b);
    }
}
