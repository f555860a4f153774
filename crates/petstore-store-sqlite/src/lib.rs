//! SQLite backend for the pet store inventory.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Each pet write runs inside one
//! [`UnitOfWork`](unit_of_work::UnitOfWork) and rolls back as a whole; a
//! cancelled handle interrupts its running statement.

mod aggregate;
mod encode;
mod reconcile;
mod schema;
mod statement;
mod store;
mod unit_of_work;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
pub use tokio_util::sync::CancellationToken;

#[cfg(test)]
mod tests;
