//! # Domain Types
//!
//! Core domain types used throughout Billar POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    Invoice      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  code (business)│   │  product_id(FK) │   │  product_id(FK) │       │
//! │  │  price, cost    │   │  qty, total     │   │  qty, unit_cost │       │
//! │  │  stock, iva_bps │   │  sold_at        │   │  batch_id       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │    TaxRate      │   │      User       │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  bps (u32)      │   │  username       │                             │
//! │  │  2100 = 21%     │   │  PBKDF2 creds   │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Products have:
//! - `id`: UUID v4 - immutable, used for database relations
//! - `code`: business key - human-readable, optional, unique when present
//!
//! Sales and invoices are ledger rows: immutable once written (invoices may
//! only be deleted, optionally reversing the stock they added).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 2100 bps = 21% (the usual IVA rate on bar stock)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog item holding the CURRENT stock level.
///
/// `stock` reflects the net effect of every sale (decrement) and restock
/// (increment) applied to date. It is maintained incrementally, never
/// recomputed on read, and must never go negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Business code - optional, unique when present.
    pub code: Option<String>,

    /// Display name shown on documents and reports.
    pub name: String,

    /// Current sale price.
    pub price: Money,

    /// Current unit cost, derived from the latest priced restock.
    pub cost: Money,

    /// Current on-hand quantity.
    pub stock: i64,

    /// IVA tax rate in basis points (2100 = 21%).
    pub iva_bps: u32,

    /// Optional supplier/batch grouping label.
    pub company: Option<String>,

    /// When the product was created.
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Returns the IVA rate.
    #[inline]
    pub fn iva(&self) -> TaxRate {
        TaxRate::from_bps(self.iva_bps)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A register event: `total` is the charged amount, `round(price × qty, 2)`
/// at the moment of sale.
///
/// Immutable once created. Created only by the sale register.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub product_id: String,
    pub qty: i64,
    pub total: Money,
    pub sold_at: DateTime<Utc>,
}

// =============================================================================
// Invoice
// =============================================================================

/// A purchase/restock line tied to a real supplier invoice.
///
/// Rows exist only for restocks that carried an invoice total; pure stock
/// adjustments leave no invoice trace. `unit_cost` is always
/// `round(invoice_total / qty, 4)`, never entered directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Invoice {
    pub id: String,
    pub product_id: String,
    pub qty: i64,
    /// The supplier invoice amount for this line.
    pub invoice_total: Money,
    /// Derived per-unit cost at 4 decimals.
    pub unit_cost: Money,
    /// Sale price applied by this line, if it repriced the product.
    pub new_price: Option<Money>,
    /// Username of the operator who entered the line.
    pub created_by: String,
    /// Groups lines entered together as one multi-product purchase.
    pub batch_id: Option<String>,
    pub company: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// User
// =============================================================================

/// An operator account.
///
/// Credentials are PBKDF2-HMAC-SHA256: `password_hash` and `password_salt`
/// are hex-encoded, `iterations` is stored per row so the work factor can be
/// raised without invalidating old accounts. No serde derives here -
/// credential material never crosses a serialization boundary.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: String,
    /// Unique, stored lowercase.
    pub username: String,
    pub password_hash: String,
    pub password_salt: String,
    pub iterations: u32,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(2100);
        assert_eq!(rate.bps(), 2100);
        assert!((rate.percentage() - 21.0).abs() < 0.001);
    }

    #[test]
    fn test_tax_rate_from_percentage() {
        let rate = TaxRate::from_percentage(10.5);
        assert_eq!(rate.bps(), 1050);
    }

    #[test]
    fn test_tax_rate_default_is_zero() {
        assert!(TaxRate::default().is_zero());
    }

    #[test]
    fn test_product_iva_accessor() {
        let product = Product {
            id: "p1".into(),
            code: Some("FER".into()),
            name: "Fernet".into(),
            price: Money::from_units(9000),
            cost: Money::from_units(6500),
            stock: 12,
            iva_bps: 2100,
            company: None,
            created_at: Utc::now(),
        };
        assert_eq!(product.iva(), TaxRate::from_bps(2100));
    }

    #[test]
    fn test_product_serde_roundtrip() {
        let product = Product {
            id: "p1".into(),
            code: None,
            name: "Coca 1.5L".into(),
            price: Money::from_scaled(23_335_000),
            cost: Money::from_scaled(15_333_333),
            stock: 4,
            iva_bps: 2100,
            company: Some("Distribuidora Sur".into()),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&product).unwrap();
        let back: Product = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, product.name);
        assert_eq!(back.price, product.price);
        assert_eq!(back.cost.scaled(), 15_333_333);
    }
}
