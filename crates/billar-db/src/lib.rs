//! # billar-db: Database Layer for Billar POS
//!
//! SQLite persistence for the product catalog and the sales/invoices ledger.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  billar-service ──► Database handle ──► repositories ──► SQLite         │
//! │                                                                         │
//! │  billar-core types (Product, Sale, Invoice, User, Money) flow through   │
//! │  unchanged: Money and report rows decode straight off INTEGER columns.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`pool`] - Connection pool configuration and the [`Database`] handle
//! - [`migrations`] - Embedded schema migrations
//! - [`repository`] - Per-entity repositories (products, sales, invoices, users)
//! - [`error`] - Database error types

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// Re-exports for convenience
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::invoice::{InvoiceRepository, InvoiceWithProduct, RestockLine};
pub use repository::product::ProductRepository;
pub use repository::sale::{SaleDetailRow, SaleRepository};
pub use repository::user::UserRepository;
