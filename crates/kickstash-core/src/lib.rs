//! Kickstash Core
//!
//! Wires the storage layer to whatever renders the list: a pass-through
//! repository over the sneaker store, and a presentation model that
//! republishes the live query as shared, replayable state.

mod app;
mod config;
mod error;
mod model;
mod repository;

pub use app::App;
pub use config::Config;
pub use error::CoreError;
pub use model::{ListObserver, SneakerListModel};
pub use repository::SneakerRepository;

// Re-export storage types
pub use kickstash_storage::{Database, LiveQuery, Sneaker, SneakerStore, StorageError};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
