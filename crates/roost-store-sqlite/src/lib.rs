//! SQLite backend for the Roost flock tracker.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on one dedicated
//! connection thread without blocking the async runtime. That thread is the
//! only writer, so every multi-statement operation runs without interleaving.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
