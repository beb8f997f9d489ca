//! # Product Catalog Operations
//!
//! Create-or-update by business code, lookups, and guarded deletion.
//!
//! ## Upsert Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  upsert_product(entry)                                  │
//! │                                                                         │
//! │  validate code / name / price / cost / iva / stock                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  get_by_code(code)                                                      │
//! │       │                                                                 │
//! │       ├── found ───► UPDATE row                                         │
//! │       │              stock: entry.stock is None → keep current          │
//! │       │                     entry.stock is Some → overwrite (count fix) │
//! │       │                                                                 │
//! │       └── missing ─► INSERT row, stock defaults to 0                    │
//! │                                                                         │
//! │  Routine stock movement belongs to restock and sales, not here.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use billar_core::validation::{
    validate_amount, validate_product_code, validate_product_name, validate_tax_bps,
};
use billar_core::{Money, Product, ValidationError};
use billar_db::{Database, ProductRepository};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::error::{Feedback, ServiceError, ServiceResult};

/// Catalog entry fields as typed at the register.
#[derive(Debug, Clone)]
pub struct ProductEntry {
    /// Business code, the upsert key.
    pub code: String,
    pub name: String,
    /// Sale price per unit.
    pub price: Money,
    /// Unit cost. Usually left at the last derived value and replaced by
    /// the next invoiced restock.
    pub cost: Money,
    /// `None` keeps the current stock on update (0 for a new product);
    /// `Some` overwrites it, which is how count corrections are entered.
    pub stock: Option<i64>,
    /// Tax rate in basis points (2100 = 21%).
    pub iva_bps: u32,
    /// Supplier label.
    pub company: Option<String>,
}

/// Result of an upsert: the stored row plus which branch ran.
#[derive(Debug, Clone, Serialize)]
pub struct UpsertOutcome {
    pub product: Product,
    pub created: bool,
    pub summary: String,
}

impl From<UpsertOutcome> for Feedback {
    fn from(outcome: UpsertOutcome) -> Self {
        Feedback::success(outcome.summary)
    }
}

/// Product catalog management.
pub struct CatalogService {
    db: Database,
}

impl CatalogService {
    pub fn new(db: Database) -> Self {
        CatalogService { db }
    }

    /// Creates or updates a product, keyed by its business code.
    ///
    /// ## Errors
    /// - `Validation` for a bad code, name, tax rate, negative amount, or
    ///   negative explicit stock
    pub async fn upsert_product(&self, entry: ProductEntry) -> ServiceResult<UpsertOutcome> {
        validate_product_code(&entry.code)?;
        validate_product_name(&entry.name)?;
        validate_amount("price", entry.price)?;
        validate_amount("cost", entry.cost)?;
        validate_tax_bps(entry.iva_bps)?;
        if let Some(stock) = entry.stock {
            if stock < 0 {
                return Err(ValidationError::MustNotBeNegative {
                    field: "stock".to_string(),
                }
                .into());
            }
        }

        let code = entry.code.trim().to_string();
        let name = entry.name.trim().to_string();

        match self.db.products().get_by_code(&code).await? {
            Some(mut product) => {
                product.name = name;
                product.price = entry.price;
                product.cost = entry.cost;
                product.iva_bps = entry.iva_bps;
                product.company = entry.company;
                if let Some(stock) = entry.stock {
                    product.stock = stock;
                }

                self.db.products().update(&product).await?;
                info!(code = %code, name = %product.name, "Product updated");

                Ok(UpsertOutcome {
                    summary: format!("Product updated: {}", product.name),
                    product,
                    created: false,
                })
            }
            None => {
                let product = Product {
                    id: ProductRepository::generate_product_id(),
                    code: Some(code.clone()),
                    name,
                    price: entry.price,
                    cost: entry.cost,
                    stock: entry.stock.unwrap_or(0),
                    iva_bps: entry.iva_bps,
                    company: entry.company,
                    created_at: Utc::now(),
                };

                self.db.products().insert(&product).await?;
                info!(code = %code, name = %product.name, "Product created");

                Ok(UpsertOutcome {
                    summary: format!("Product created: {}", product.name),
                    product,
                    created: true,
                })
            }
        }
    }

    /// Fetches a product by id.
    ///
    /// ## Errors
    /// `NotFound` if the id matches nothing.
    pub async fn get_product(&self, id: &str) -> ServiceResult<Product> {
        self.db
            .products()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound {
                entity: "Product".to_string(),
                id: id.to_string(),
            })
    }

    /// Looks a product up by business code (the common register path).
    pub async fn find_by_code(&self, code: &str) -> ServiceResult<Option<Product>> {
        Ok(self.db.products().get_by_code(code.trim()).await?)
    }

    /// Lists the whole catalog, ordered by name.
    pub async fn list_products(&self) -> ServiceResult<Vec<Product>> {
        Ok(self.db.products().list().await?)
    }

    /// Deletes a product by id.
    ///
    /// ## Errors
    /// - `HasDependents` if sales or invoices still reference it; the
    ///   movement history is the audit trail and deleting the product
    ///   would orphan it
    /// - `NotFound` if the id matches nothing
    pub async fn delete_product(&self, id: &str) -> ServiceResult<()> {
        self.db.products().delete(id).await?;
        info!(product_id = %id, "Product deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
