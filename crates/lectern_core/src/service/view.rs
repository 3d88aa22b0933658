//! Read models: records with their resolved ancestry and children.
//!
//! # Invariants
//! - Every view carries its full ancestor chain up to the collection.
//! - A stored record whose parent cannot be loaded is reported as
//!   `InconsistentState`; foreign keys make that unreachable in practice.

use crate::model::collection::Collection;
use crate::model::entity::EntityId;
use crate::model::leaf::Leaf;
use crate::model::subunit::Subunit;
use crate::model::unit::Unit;
use crate::repo::Store;
use crate::service::error::ServiceError;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitView {
    #[serde(flatten)]
    pub unit: Unit,
    pub collection: Collection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubunitView {
    #[serde(flatten)]
    pub subunit: Subunit,
    pub unit: UnitView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeafView {
    #[serde(flatten)]
    pub leaf: Leaf,
    pub subunit: SubunitView,
}

/// Collection with its units ordered by ordinal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionDetail {
    #[serde(flatten)]
    pub collection: Collection,
    pub units: Vec<Unit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitDetail {
    #[serde(flatten)]
    pub view: UnitView,
    pub subunits: Vec<Subunit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubunitDetail {
    #[serde(flatten)]
    pub view: SubunitView,
    pub leaves: Vec<Leaf>,
}

/// Memoizing ancestor loader, so one page resolves each parent once.
pub(crate) struct AncestryResolver<'a, S: Store> {
    store: &'a S,
    collections: HashMap<EntityId, Collection>,
    units: HashMap<EntityId, UnitView>,
    subunits: HashMap<EntityId, SubunitView>,
}

impl<'a, S: Store> AncestryResolver<'a, S> {
    pub(crate) fn new(store: &'a S) -> Self {
        Self {
            store,
            collections: HashMap::new(),
            units: HashMap::new(),
            subunits: HashMap::new(),
        }
    }

    pub(crate) fn unit_view(&mut self, unit: Unit) -> Result<UnitView, ServiceError> {
        let collection = self.collection(unit.collection_id)?;
        Ok(UnitView { unit, collection })
    }

    pub(crate) fn subunit_view(&mut self, subunit: Subunit) -> Result<SubunitView, ServiceError> {
        let unit = self.unit(subunit.unit_id)?;
        Ok(SubunitView { subunit, unit })
    }

    pub(crate) fn leaf_view(&mut self, leaf: Leaf) -> Result<LeafView, ServiceError> {
        let subunit = self.subunit(leaf.subunit_id)?;
        Ok(LeafView { leaf, subunit })
    }

    fn collection(&mut self, id: EntityId) -> Result<Collection, ServiceError> {
        if let Some(found) = self.collections.get(&id) {
            return Ok(found.clone());
        }
        let collection = self
            .store
            .get_collection(id)?
            .ok_or(ServiceError::InconsistentState("unit references a missing collection"))?;
        self.collections.insert(id, collection.clone());
        Ok(collection)
    }

    fn unit(&mut self, id: EntityId) -> Result<UnitView, ServiceError> {
        if let Some(found) = self.units.get(&id) {
            return Ok(found.clone());
        }
        let unit = self
            .store
            .get_unit(id)?
            .ok_or(ServiceError::InconsistentState("subunit references a missing unit"))?;
        let view = self.unit_view(unit)?;
        self.units.insert(id, view.clone());
        Ok(view)
    }

    fn subunit(&mut self, id: EntityId) -> Result<SubunitView, ServiceError> {
        if let Some(found) = self.subunits.get(&id) {
            return Ok(found.clone());
        }
        let subunit = self
            .store
            .get_subunit(id)?
            .ok_or(ServiceError::InconsistentState("leaf references a missing subunit"))?;
        let view = self.subunit_view(subunit)?;
        self.subunits.insert(id, view.clone());
        Ok(view)
    }
}
