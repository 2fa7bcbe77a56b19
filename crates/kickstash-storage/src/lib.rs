//! Kickstash Storage Layer
//!
//! SQLite-based persistence for the sneaker catalog. Every committed
//! write notifies live queries, which re-emit a full-table snapshot.

mod database;
mod error;
mod migrations;
mod sneaker;
mod store;

pub use database::Database;
pub use error::StorageError;
pub use sneaker::Sneaker;
pub use store::{LiveQuery, SneakerStore};

pub type Result<T> = std::result::Result<T, StorageError>;
