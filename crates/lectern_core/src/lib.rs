//! Core domain logic for Lectern, a four-level ordered text hierarchy
//! (collection, unit, subunit, leaf) persisted in SQLite.
//! This crate is the single source of truth for hierarchy invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod validation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, CoreConfig, DeletePolicy, InputLimits, PagingDefaults};
pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::collection::Collection;
pub use model::entity::{EntityId, EntityKind, Ordinal};
pub use model::leaf::Leaf;
pub use model::subunit::Subunit;
pub use model::unit::{Unit, UnitCategory};
pub use repo::{
    CollectionRepository, ConstraintKind, LeafRepository, NodeRepository, RepoError, RepoResult,
    SqliteStore, Store, SubunitRepository, UnitRepository,
};
pub use service::{ErrorCategory, ServiceContext, ServiceError};
pub use validation::{FieldViolation, ValidationErrors};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
