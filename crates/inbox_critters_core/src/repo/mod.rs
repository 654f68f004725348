//! History store contracts and persistence implementations.
//!
//! # Responsibility
//! - Define the append-only ledger interface consumed by the session engine.
//! - Isolate SQLite details from game orchestration.
//!
//! # Invariants
//! - Stores only append and load; records are never updated or deleted.
//! - `load_all` returns records in append order.

pub mod history_repo;
