//! Core domain logic for the Stockroom parts store.
//! This crate owns the SKU allocator and the part persistence contracts.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod sku;

pub use config::{ConfigError, SkuConfig, StockroomConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::part::{NewPart, Part, PartId, PartValidationError};
pub use repo::part_repo::{
    PartListQuery, PartRepository, RepoError, RepoResult, SqlitePartRepository,
};
pub use service::part_service::{PartService, PartServiceError, PartUpdate};
pub use sku::{
    bootstrap_allocator, AllocError, BootstrapError, OverflowPolicy, Sku, SkuAllocator,
    SkuCounterStore, SkuFormat, SkuFormatError, SkuParseError,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
