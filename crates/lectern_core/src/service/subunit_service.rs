//! Subunit use-cases.

use crate::model::entity::{EntityId, EntityKind};
use crate::model::subunit::Subunit;
use crate::repo::Store;
use crate::service::context::{log_late_constraint, log_rejected, ServiceContext};
use crate::service::error::ServiceError;
use crate::service::input::{NewSubunit, SubunitPatch};
use crate::service::pagination::{paginate, Page, PageRequest};
use crate::service::view::{AncestryResolver, SubunitDetail, SubunitView};
use log::info;

const KIND: EntityKind = EntityKind::Subunit;

pub struct SubunitService<'a, S: Store> {
    ctx: ServiceContext<'a, S>,
}

impl<'a, S: Store> SubunitService<'a, S> {
    pub fn new(ctx: ServiceContext<'a, S>) -> Self {
        Self { ctx }
    }

    pub fn create(&self, input: &NewSubunit) -> Result<SubunitView, ServiceError> {
        let view = self
            .prepare_create(input)
            .inspect_err(|err| log_rejected("create", KIND, err))?;
        self.ctx
            .store
            .insert_subunit(&view.subunit)
            .map_err(ServiceError::from)
            .inspect_err(|err| log_late_constraint("create", KIND, err))?;
        info!(
            "event=entity_create module=service status=ok kind={} id={} parent_id={} ordinal={}",
            KIND, view.subunit.id, view.subunit.unit_id, view.subunit.ordinal
        );
        Ok(view)
    }

    fn prepare_create(&self, input: &NewSubunit) -> Result<SubunitView, ServiceError> {
        input.validate()?;
        let validator = self.ctx.validator();
        let unit = validator.parent_unit(input.unit_id)?;
        validator.require_ordinal_free(KIND, input.unit_id, input.ordinal, None)?;

        let subunit = Subunit::new(input.unit_id, input.ordinal, self.ctx.now_ms());
        let unit = AncestryResolver::new(self.ctx.store).unit_view(unit)?;
        Ok(SubunitView { subunit, unit })
    }

    /// Subunits ordered by ordinal, optionally under one unit.
    pub fn list(
        &self,
        unit_id: Option<EntityId>,
        request: PageRequest,
    ) -> Result<Page<SubunitView>, ServiceError> {
        let paging = self.ctx.config.paging;
        let page = paginate(
            request,
            paging.child_default_limit,
            paging.max_page_limit,
            || Ok(self.ctx.store.count(KIND, unit_id)?),
            |skip, take| Ok(self.ctx.store.list_subunits(unit_id, skip, take)?),
        )?;
        let mut resolver = AncestryResolver::new(self.ctx.store);
        page.try_map(|subunit| resolver.subunit_view(subunit))
    }

    pub fn get(&self, id: EntityId) -> Result<SubunitDetail, ServiceError> {
        let subunit = self.load(id)?;
        let view = AncestryResolver::new(self.ctx.store).subunit_view(subunit)?;
        let leaves = self.ctx.store.list_leaves(Some(id), 0, u64::MAX)?;
        Ok(SubunitDetail { view, leaves })
    }

    pub fn update(&self, id: EntityId, patch: &SubunitPatch) -> Result<SubunitView, ServiceError> {
        let view = self
            .prepare_update(id, patch)
            .inspect_err(|err| log_rejected("update", KIND, err))?;
        self.ctx
            .store
            .update_subunit(&view.subunit)
            .map_err(ServiceError::from)
            .inspect_err(|err| log_late_constraint("update", KIND, err))?;
        info!(
            "event=entity_update module=service status=ok kind={} id={}",
            KIND, id
        );
        Ok(view)
    }

    fn prepare_update(&self, id: EntityId, patch: &SubunitPatch) -> Result<SubunitView, ServiceError> {
        let mut subunit = self.load(id)?;
        patch.validate()?;
        let validator = self.ctx.validator();

        let unit_id = patch.unit_id.unwrap_or(subunit.unit_id);
        let ordinal = patch.ordinal.unwrap_or(subunit.ordinal);
        let unit = validator.parent_unit(unit_id)?;
        if unit_id != subunit.unit_id || ordinal != subunit.ordinal {
            validator.require_ordinal_free(KIND, unit_id, ordinal, Some(id))?;
        }

        subunit.unit_id = unit_id;
        subunit.ordinal = ordinal;
        subunit.updated_at = self.ctx.now_ms();
        let unit = AncestryResolver::new(self.ctx.store).unit_view(unit)?;
        Ok(SubunitView { subunit, unit })
    }

    /// Returns the number of rows removed.
    pub fn delete(&self, id: EntityId) -> Result<u64, ServiceError> {
        self.ctx.remove(KIND, id)
    }

    fn load(&self, id: EntityId) -> Result<Subunit, ServiceError> {
        self.ctx
            .store
            .get_subunit(id)?
            .ok_or(ServiceError::NotFound { kind: KIND, id })
    }
}
