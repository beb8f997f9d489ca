//! # Repository Layer
//!
//! Data access repositories following the repository pattern.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Repository Pattern                               │
//! │                                                                         │
//! │  Service Layer (billar-service)                                         │
//! │       │                                                                 │
//! │       │ calls                                                           │
//! │       ▼                                                                 │
//! │  ┌──────────────────────────────────────────────────────────┐          │
//! │  │                    Repositories                           │          │
//! │  │                                                           │          │
//! │  │  ProductRepository ── catalog rows, stock deltas          │          │
//! │  │  SaleRepository ────── sale recording + reporting reads   │          │
//! │  │  InvoiceRepository ─── restock batches + their reversal   │          │
//! │  │  UserRepository ────── operator accounts                  │          │
//! │  │                                                           │          │
//! │  └──────────────────────────────────────────────────────────┘          │
//! │       │                                                                 │
//! │       │ SQL via sqlx (runtime-checked, FromRow mapping)                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. **One repository per aggregate**: Product, Sale, Invoice, User
//! 2. **Multi-row writes are transactional**: a sale and its stock decrement
//!    commit together or not at all; same for a restock batch
//! 3. **Return domain types**: Repositories return `billar_core` types, the
//!    row mapping stays in this crate

pub mod invoice;
pub mod product;
pub mod sale;
pub mod user;

pub use invoice::{InvoiceRepository, InvoiceWithProduct, RestockLine};
pub use product::ProductRepository;
pub use sale::{SaleDetailRow, SaleRepository};
pub use user::UserRepository;
