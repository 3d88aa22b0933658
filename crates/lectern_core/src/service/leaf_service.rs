//! Leaf use-cases, including bulk creation.

use crate::model::entity::{EntityId, EntityKind};
use crate::model::leaf::Leaf;
use crate::repo::Store;
use crate::service::bulk::{BulkCreated, BulkLeafCoordinator};
use crate::service::context::{log_late_constraint, log_rejected, ServiceContext};
use crate::service::error::ServiceError;
use crate::service::input::{BulkLeaves, LeafPatch, NewLeaf};
use crate::service::pagination::{paginate, Page, PageRequest};
use crate::service::view::{AncestryResolver, LeafView};
use log::info;

const KIND: EntityKind = EntityKind::Leaf;

pub struct LeafService<'a, S: Store> {
    ctx: ServiceContext<'a, S>,
}

impl<'a, S: Store> LeafService<'a, S> {
    pub fn new(ctx: ServiceContext<'a, S>) -> Self {
        Self { ctx }
    }

    pub fn create(&self, input: &NewLeaf) -> Result<LeafView, ServiceError> {
        let view = self
            .prepare_create(input)
            .inspect_err(|err| log_rejected("create", KIND, err))?;
        self.ctx
            .store
            .insert_leaf(&view.leaf)
            .map_err(ServiceError::from)
            .inspect_err(|err| log_late_constraint("create", KIND, err))?;
        info!(
            "event=entity_create module=service status=ok kind={} id={} parent_id={} ordinal={}",
            KIND, view.leaf.id, view.leaf.subunit_id, view.leaf.ordinal
        );
        Ok(view)
    }

    fn prepare_create(&self, input: &NewLeaf) -> Result<LeafView, ServiceError> {
        input.validate(&self.ctx.config.limits)?;
        let validator = self.ctx.validator();
        let subunit = validator.parent_subunit(input.subunit_id)?;
        validator.require_ordinal_free(KIND, input.subunit_id, input.ordinal, None)?;

        let leaf = Leaf::new(
            input.subunit_id,
            input.ordinal,
            input.text.clone(),
            self.ctx.now_ms(),
        );
        let subunit = AncestryResolver::new(self.ctx.store).subunit_view(subunit)?;
        Ok(LeafView { leaf, subunit })
    }

    /// Creates every leaf of the batch or none.
    pub fn bulk_create(&self, request: &BulkLeaves) -> Result<BulkCreated, ServiceError> {
        BulkLeafCoordinator::new(self.ctx).create_leaves(request)
    }

    /// Leaves ordered by ordinal, optionally under one subunit.
    pub fn list(
        &self,
        subunit_id: Option<EntityId>,
        request: PageRequest,
    ) -> Result<Page<LeafView>, ServiceError> {
        let paging = self.ctx.config.paging;
        let page = paginate(
            request,
            paging.child_default_limit,
            paging.max_page_limit,
            || Ok(self.ctx.store.count(KIND, subunit_id)?),
            |skip, take| Ok(self.ctx.store.list_leaves(subunit_id, skip, take)?),
        )?;
        let mut resolver = AncestryResolver::new(self.ctx.store);
        page.try_map(|leaf| resolver.leaf_view(leaf))
    }

    pub fn get(&self, id: EntityId) -> Result<LeafView, ServiceError> {
        let leaf = self.load(id)?;
        AncestryResolver::new(self.ctx.store).leaf_view(leaf)
    }

    pub fn update(&self, id: EntityId, patch: &LeafPatch) -> Result<LeafView, ServiceError> {
        let view = self
            .prepare_update(id, patch)
            .inspect_err(|err| log_rejected("update", KIND, err))?;
        self.ctx
            .store
            .update_leaf(&view.leaf)
            .map_err(ServiceError::from)
            .inspect_err(|err| log_late_constraint("update", KIND, err))?;
        info!(
            "event=entity_update module=service status=ok kind={} id={}",
            KIND, id
        );
        Ok(view)
    }

    fn prepare_update(&self, id: EntityId, patch: &LeafPatch) -> Result<LeafView, ServiceError> {
        let mut leaf = self.load(id)?;
        patch.validate(&self.ctx.config.limits)?;
        let validator = self.ctx.validator();

        let subunit_id = patch.subunit_id.unwrap_or(leaf.subunit_id);
        let ordinal = patch.ordinal.unwrap_or(leaf.ordinal);
        let subunit = validator.parent_subunit(subunit_id)?;
        if subunit_id != leaf.subunit_id || ordinal != leaf.ordinal {
            validator.require_ordinal_free(KIND, subunit_id, ordinal, Some(id))?;
        }

        leaf.subunit_id = subunit_id;
        leaf.ordinal = ordinal;
        if let Some(text) = &patch.text {
            leaf.text = text.clone();
        }
        leaf.updated_at = self.ctx.now_ms();
        let subunit = AncestryResolver::new(self.ctx.store).subunit_view(subunit)?;
        Ok(LeafView { leaf, subunit })
    }

    /// Returns the number of rows removed.
    pub fn delete(&self, id: EntityId) -> Result<u64, ServiceError> {
        self.ctx.remove(KIND, id)
    }

    fn load(&self, id: EntityId) -> Result<Leaf, ServiceError> {
        self.ctx
            .store
            .get_leaf(id)?
            .ok_or(ServiceError::NotFound { kind: KIND, id })
    }
}
