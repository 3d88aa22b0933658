//! Unit use-cases.
//!
//! # Invariants
//! - A unit always belongs to an existing collection.
//! - `(collection_id, ordinal)` is unique.

use crate::model::entity::{EntityId, EntityKind};
use crate::model::unit::{Unit, UnitCategory};
use crate::repo::Store;
use crate::service::context::{log_late_constraint, log_rejected, ServiceContext};
use crate::service::error::ServiceError;
use crate::service::input::{normalize_display_name, NewUnit, UnitPatch};
use crate::service::pagination::{paginate, Page, PageRequest};
use crate::service::view::{AncestryResolver, UnitDetail, UnitView};
use log::info;

const KIND: EntityKind = EntityKind::Unit;

pub struct UnitService<'a, S: Store> {
    ctx: ServiceContext<'a, S>,
}

impl<'a, S: Store> UnitService<'a, S> {
    pub fn new(ctx: ServiceContext<'a, S>) -> Self {
        Self { ctx }
    }

    pub fn create(&self, input: &NewUnit) -> Result<UnitView, ServiceError> {
        let view = self
            .prepare_create(input)
            .inspect_err(|err| log_rejected("create", KIND, err))?;
        self.ctx
            .store
            .insert_unit(&view.unit)
            .map_err(ServiceError::from)
            .inspect_err(|err| log_late_constraint("create", KIND, err))?;
        info!(
            "event=entity_create module=service status=ok kind={} id={} parent_id={} ordinal={}",
            KIND, view.unit.id, view.unit.collection_id, view.unit.ordinal
        );
        Ok(view)
    }

    fn prepare_create(&self, input: &NewUnit) -> Result<UnitView, ServiceError> {
        input.validate(&self.ctx.config.limits)?;
        let category = input
            .parsed_category()
            .ok_or(ServiceError::InconsistentState("validated category failed to parse"))?;
        let validator = self.ctx.validator();
        let collection = validator.parent_collection(input.collection_id)?;
        validator.require_ordinal_free(KIND, input.collection_id, input.ordinal, None)?;

        let unit = Unit::new(
            input.collection_id,
            input.ordinal,
            normalize_display_name(&input.name),
            input.code.trim(),
            category,
            self.ctx.now_ms(),
        );
        Ok(UnitView { unit, collection })
    }

    /// Units ordered by ordinal, optionally under one collection.
    pub fn list(
        &self,
        collection_id: Option<EntityId>,
        request: PageRequest,
    ) -> Result<Page<UnitView>, ServiceError> {
        let paging = self.ctx.config.paging;
        let page = paginate(
            request,
            paging.child_default_limit,
            paging.max_page_limit,
            || Ok(self.ctx.store.count(KIND, collection_id)?),
            |skip, take| Ok(self.ctx.store.list_units(collection_id, skip, take)?),
        )?;
        let mut resolver = AncestryResolver::new(self.ctx.store);
        page.try_map(|unit| resolver.unit_view(unit))
    }

    pub fn get(&self, id: EntityId) -> Result<UnitDetail, ServiceError> {
        let unit = self.load(id)?;
        let view = AncestryResolver::new(self.ctx.store).unit_view(unit)?;
        let subunits = self.ctx.store.list_subunits(Some(id), 0, u64::MAX)?;
        Ok(UnitDetail { view, subunits })
    }

    pub fn update(&self, id: EntityId, patch: &UnitPatch) -> Result<UnitView, ServiceError> {
        let view = self
            .prepare_update(id, patch)
            .inspect_err(|err| log_rejected("update", KIND, err))?;
        self.ctx
            .store
            .update_unit(&view.unit)
            .map_err(ServiceError::from)
            .inspect_err(|err| log_late_constraint("update", KIND, err))?;
        info!(
            "event=entity_update module=service status=ok kind={} id={}",
            KIND, id
        );
        Ok(view)
    }

    fn prepare_update(&self, id: EntityId, patch: &UnitPatch) -> Result<UnitView, ServiceError> {
        let mut unit = self.load(id)?;
        patch.validate(&self.ctx.config.limits)?;
        let validator = self.ctx.validator();

        let collection_id = patch.collection_id.unwrap_or(unit.collection_id);
        let ordinal = patch.ordinal.unwrap_or(unit.ordinal);
        let collection = validator.parent_collection(collection_id)?;
        if collection_id != unit.collection_id || ordinal != unit.ordinal {
            validator.require_ordinal_free(KIND, collection_id, ordinal, Some(id))?;
        }

        unit.collection_id = collection_id;
        unit.ordinal = ordinal;
        if let Some(name) = &patch.name {
            unit.name = normalize_display_name(name);
        }
        if let Some(code) = &patch.code {
            unit.code = code.trim().to_string();
        }
        if let Some(category) = patch.category.as_deref().and_then(UnitCategory::parse) {
            unit.category = category;
        }
        unit.updated_at = self.ctx.now_ms();
        Ok(UnitView { unit, collection })
    }

    /// Returns the number of rows removed.
    pub fn delete(&self, id: EntityId) -> Result<u64, ServiceError> {
        self.ctx.remove(KIND, id)
    }

    fn load(&self, id: EntityId) -> Result<Unit, ServiceError> {
        self.ctx
            .store
            .get_unit(id)?
            .ok_or(ServiceError::NotFound { kind: KIND, id })
    }
}
