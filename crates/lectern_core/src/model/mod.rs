//! Domain model for the four-level text library hierarchy.
//!
//! # Responsibility
//! - Define the canonical records persisted by the store.
//! - Describe the parent/child shape of the hierarchy through `EntityKind`.
//!
//! # Invariants
//! - Every record is identified by a stable `EntityId` assigned at creation.
//! - Every non-top record references exactly one parent of the kind above it.
//! - Ordinals are 1-based and unique among siblings of one parent.

pub mod collection;
pub mod entity;
pub mod leaf;
pub mod subunit;
pub mod unit;
