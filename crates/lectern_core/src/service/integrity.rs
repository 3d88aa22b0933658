//! Referential and uniqueness checks run before writes.
//!
//! # Responsibility
//! - Resolve targets and parents, turning absence into typed service errors.
//! - Detect sibling ordinal and collection natural-key collisions early.
//!
//! # Invariants
//! - Checks are read-only.
//! - A passing check is only valid at the instant it ran; schema constraints
//!   remain the hard guarantee.

use crate::model::collection::Collection;
use crate::model::entity::{EntityId, EntityKind, Ordinal};
use crate::model::subunit::Subunit;
use crate::model::unit::Unit;
use crate::repo::Store;
use crate::service::error::{NaturalKeyField, ServiceError};

/// Store-backed validator shared by all hierarchy services.
pub struct IntegrityValidator<'a, S: Store> {
    store: &'a S,
}

impl<'a, S: Store> IntegrityValidator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Fails with `NotFound` when the target record is absent.
    pub fn require_exists(&self, kind: EntityKind, id: EntityId) -> Result<(), ServiceError> {
        if self.store.exists(kind, id)? {
            Ok(())
        } else {
            Err(ServiceError::NotFound { kind, id })
        }
    }

    /// Fails with `ParentNotFound` when the parent of a `child` record is absent.
    ///
    /// Collections have no parent; asking for one is an inconsistency.
    pub fn require_parent_exists(
        &self,
        child: EntityKind,
        parent_id: EntityId,
    ) -> Result<EntityId, ServiceError> {
        let parent_kind = child
            .parent()
            .ok_or(ServiceError::InconsistentState("collections have no parent"))?;
        if self.store.exists(parent_kind, parent_id)? {
            Ok(parent_id)
        } else {
            Err(ServiceError::ParentNotFound {
                kind: parent_kind,
                id: parent_id,
            })
        }
    }

    pub fn parent_collection(&self, id: EntityId) -> Result<Collection, ServiceError> {
        self.store
            .get_collection(id)?
            .ok_or(ServiceError::ParentNotFound {
                kind: EntityKind::Collection,
                id,
            })
    }

    pub fn parent_unit(&self, id: EntityId) -> Result<Unit, ServiceError> {
        self.store.get_unit(id)?.ok_or(ServiceError::ParentNotFound {
            kind: EntityKind::Unit,
            id,
        })
    }

    pub fn parent_subunit(&self, id: EntityId) -> Result<Subunit, ServiceError> {
        self.store
            .get_subunit(id)?
            .ok_or(ServiceError::ParentNotFound {
                kind: EntityKind::Subunit,
                id,
            })
    }

    /// Fails with `OrdinalTaken` when a different sibling holds `ordinal`.
    pub fn require_ordinal_free(
        &self,
        kind: EntityKind,
        parent_id: EntityId,
        ordinal: Ordinal,
        exclude_id: Option<EntityId>,
    ) -> Result<(), ServiceError> {
        match self
            .store
            .find_by_parent_and_ordinal(kind, parent_id, ordinal)?
        {
            Some(holder) if Some(holder) != exclude_id => Err(ServiceError::OrdinalTaken {
                kind,
                parent_id,
                ordinal,
            }),
            _ => Ok(()),
        }
    }

    /// Fails with `NaturalKeyTaken` when another collection uses `name` or `code`.
    pub fn require_natural_key_free(
        &self,
        name: Option<&str>,
        code: Option<&str>,
        exclude_id: Option<EntityId>,
    ) -> Result<(), ServiceError> {
        let Some(existing) = self
            .store
            .find_collection_by_natural_key(name, code, exclude_id)?
        else {
            return Ok(());
        };
        let (field, value) = match name {
            Some(name) if existing.name == name => (NaturalKeyField::Name, existing.name),
            _ => (NaturalKeyField::Code, existing.code),
        };
        Err(ServiceError::NaturalKeyTaken { field, value })
    }
}
