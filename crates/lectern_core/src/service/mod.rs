//! Hierarchy use-case services.
//!
//! # Responsibility
//! - Turn validated inputs into store calls for each entity kind.
//! - Enforce referential integrity, sibling ordinals and natural keys before
//!   any write, and map storage failures into `ServiceError`.
//!
//! # Invariants
//! - Services are generic over `repo::Store` and never issue SQL.
//! - Rejected mutations leave the store unchanged.

pub mod bulk;
pub mod collection_service;
pub mod context;
pub mod error;
pub mod input;
pub mod integrity;
pub mod leaf_service;
pub mod pagination;
pub mod subunit_service;
pub mod unit_service;
pub mod view;

pub use bulk::{BulkCreated, BulkLeafCoordinator};
pub use collection_service::CollectionService;
pub use context::ServiceContext;
pub use error::{ErrorCategory, NaturalKeyField, ServiceError};
pub use input::{
    BulkLeaves, CollectionPatch, LeafPatch, LeafSpec, NewCollection, NewLeaf, NewSubunit, NewUnit,
    SubunitPatch, UnitPatch,
};
pub use integrity::IntegrityValidator;
pub use leaf_service::LeafService;
pub use pagination::{Page, PageMeta, PageRequest};
pub use subunit_service::SubunitService;
pub use unit_service::UnitService;
pub use view::{CollectionDetail, LeafView, SubunitDetail, SubunitView, UnitDetail, UnitView};
