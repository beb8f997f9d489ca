//! # billar-service: Operation Boundary for Billar POS
//!
//! Every register operation lives here: login, catalog upkeep, restocks and
//! purchase drafts, the sale register, and the reports. Callers hand in
//! plain arguments plus a [`Session`]; results come back as typed outcomes
//! that collapse into operator [`Feedback`].
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   register UI / demo binary                                             │
//! │            │                                                            │
//! │            ▼                                                            │
//! │   billar-service   AuthService · CatalogService · RestockService        │
//! │                     SaleService · InventoryService · ReportService      │
//! │            │                                                            │
//! │            ▼                                                            │
//! │   billar-db (SQLite)          billar-core (money, drafts, rendering)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`auth`] - PBKDF2 password hashing, login, user management
//! - [`catalog`] - Product upsert-by-code, lookup, deletion
//! - [`restock`] - Single restocks, purchase drafts, invoice management
//! - [`sales`] - The sale register and sales history
//! - [`inventory`] - Inventory-at-date reconstruction reports
//! - [`reports`] - Price list, receipts, detailed sales reports
//! - [`config`] - Environment-driven service configuration
//! - [`session`] - The acting-user context passed to operations
//! - [`error`] - [`ServiceError`] and operator [`Feedback`]

pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod inventory;
pub mod reports;
pub mod restock;
pub mod sales;
pub mod session;

// Re-exports for convenience
pub use auth::{AuthService, PasswordCredential, PasswordHasher, UserSummary};
pub use catalog::{CatalogService, ProductEntry, UpsertOutcome};
pub use config::{ConfigError, ServiceConfig, MIN_PBKDF2_ITERATIONS};
pub use error::{Feedback, ServiceError, ServiceResult};
pub use inventory::InventoryService;
pub use reports::ReportService;
pub use restock::{BatchOutcome, RestockOutcome, RestockService};
pub use sales::{SaleOutcome, SaleService};
pub use session::Session;
