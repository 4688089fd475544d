//! # Item Store Database Crate
//!
//! This crate is the only place that knows the service is backed by MySQL.
//!
//! ## Architectural Principles
//!
//! - **Provision before serving:** `provision` creates the database and the `items`
//!   table when they are missing and only then hands out the application pool.
//!   It returns a typed result and never terminates the process itself.
//! - **Injected, not global:** the pool lives inside `MySqlItemRepository`, which the
//!   entry point constructs and passes to the web layer as an `ItemStore`.
//! - **Parameterized queries only:** every value reaches MySQL as a bound argument.
//!
//! ## Public API
//!
//! - `provision`: The async function that prepares the schema and builds the pool.
//! - `ItemStore`: The query set used by the API layer.
//! - `MySqlItemRepository` / `InMemoryItemStore`: production and test implementations.
//! - `DbError` / `ProvisionError`: The error types returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod memory;
pub mod models;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{provision, quote_identifier};
pub use error::{DbError, DriverDiagnostics, ProvisionError};
pub use memory::InMemoryItemStore;
pub use models::{Item, ItemChanges};
pub use repository::{ItemStore, MySqlItemRepository};

// Re-exported so callers can name driver errors without a direct dependency.
pub use sqlx;
