//! # billar-core: Pure Business Logic for Billar POS
//!
//! This crate is the **heart** of Billar POS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Billar POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 billar-service (Operations)                     │   │
//! │  │   login ──► restock / register_sale / inventory_at ──► reports  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ billar-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌───────────┐ ┌────────┐  │   │
//! │  │  │  types  │ │  money  │ │  draft  │ │ inventory │ │ render │  │   │
//! │  │  │ Product │ │  Money  │ │Purchase │ │ stock-at- │ │ trait+ │  │   │
//! │  │  │ Invoice │ │ TaxCalc │ │  Draft  │ │  cutoff   │ │  text  │  │   │
//! │  │  └─────────┘ └─────────┘ └─────────┘ └───────────┘ └────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    billar-db (Database Layer)                   │   │
//! │  │              SQLite queries, migrations, repositories            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, Invoice, User, TaxRate)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`draft`] - In-progress multi-product purchase entry
//! - [`inventory`] - Inventory-at-date reconstruction
//! - [`render`] - Document renderer seam + plain-text implementation
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are i64 at 1/10,000 of a unit,
//!    so derived four-decimal unit costs survive storage exactly
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use billar_core::money::Money;
//!
//! // $100 invoice over 3 units: cost is derived, never typed in
//! let cost = Money::unit_cost(Money::from_units(100), 3);
//! assert_eq!(cost.scaled(), 333_333); // $33.3333 exactly
//!
//! // Selling 2 at $23.335 each charges the cent-rounded total
//! let total = Money::sale_total(Money::from_scaled(233_350), 2);
//! assert_eq!(total, Money::from_cents(4667));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod draft;
pub mod error;
pub mod inventory;
pub mod money;
pub mod render;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use billar_core::Money` instead of
// `use billar_core::money::Money`

pub use draft::{DraftLine, PurchaseDraft};
pub use error::{CoreError, CoreResult, ValidationError};
pub use inventory::{stock_at_cutoff, InventoryReport, InventoryRow};
pub use money::Money;
pub use render::{DocumentRenderer, PriceListRow, ReceiptData, SalesReportRow, TextRenderer};
pub use types::*;
