//! Collection use-cases.
//!
//! # Invariants
//! - Name and code are each unique across all collections.
//! - Stored names are whitespace-normalized; codes are trimmed.

use crate::model::collection::Collection;
use crate::model::entity::{EntityId, EntityKind};
use crate::repo::Store;
use crate::service::context::{log_late_constraint, log_rejected, ServiceContext};
use crate::service::error::ServiceError;
use crate::service::input::{
    normalize_description, normalize_display_name, CollectionPatch, NewCollection,
};
use crate::service::pagination::{paginate, Page, PageRequest};
use crate::service::view::CollectionDetail;
use log::info;

const KIND: EntityKind = EntityKind::Collection;

pub struct CollectionService<'a, S: Store> {
    ctx: ServiceContext<'a, S>,
}

impl<'a, S: Store> CollectionService<'a, S> {
    pub fn new(ctx: ServiceContext<'a, S>) -> Self {
        Self { ctx }
    }

    pub fn create(&self, input: &NewCollection) -> Result<Collection, ServiceError> {
        let collection = self
            .prepare_create(input)
            .inspect_err(|err| log_rejected("create", KIND, err))?;
        self.ctx
            .store
            .insert_collection(&collection)
            .map_err(ServiceError::from)
            .inspect_err(|err| log_late_constraint("create", KIND, err))?;
        info!(
            "event=entity_create module=service status=ok kind={} id={}",
            KIND, collection.id
        );
        Ok(collection)
    }

    fn prepare_create(&self, input: &NewCollection) -> Result<Collection, ServiceError> {
        input.validate(&self.ctx.config.limits)?;
        let name = normalize_display_name(&input.name);
        let code = input.code.trim().to_string();
        self.ctx
            .validator()
            .require_natural_key_free(Some(&name), Some(&code), None)?;
        Ok(Collection::new(
            name,
            code,
            input.language.trim(),
            input.description.as_deref().and_then(normalize_description),
            self.ctx.now_ms(),
        ))
    }

    /// Collections ordered by name.
    pub fn list(&self, request: PageRequest) -> Result<Page<Collection>, ServiceError> {
        let paging = self.ctx.config.paging;
        paginate(
            request,
            paging.collection_default_limit,
            paging.max_page_limit,
            || Ok(self.ctx.store.count(KIND, None)?),
            |skip, take| Ok(self.ctx.store.list_collections(skip, take)?),
        )
    }

    pub fn get(&self, id: EntityId) -> Result<CollectionDetail, ServiceError> {
        let collection = self
            .ctx
            .store
            .get_collection(id)?
            .ok_or(ServiceError::NotFound { kind: KIND, id })?;
        let units = self.ctx.store.list_units(Some(id), 0, u64::MAX)?;
        Ok(CollectionDetail { collection, units })
    }

    pub fn update(&self, id: EntityId, patch: &CollectionPatch) -> Result<Collection, ServiceError> {
        let collection = self
            .prepare_update(id, patch)
            .inspect_err(|err| log_rejected("update", KIND, err))?;
        self.ctx
            .store
            .update_collection(&collection)
            .map_err(ServiceError::from)
            .inspect_err(|err| log_late_constraint("update", KIND, err))?;
        info!(
            "event=entity_update module=service status=ok kind={} id={}",
            KIND, id
        );
        Ok(collection)
    }

    fn prepare_update(
        &self,
        id: EntityId,
        patch: &CollectionPatch,
    ) -> Result<Collection, ServiceError> {
        let mut collection = self
            .ctx
            .store
            .get_collection(id)?
            .ok_or(ServiceError::NotFound { kind: KIND, id })?;
        patch.validate(&self.ctx.config.limits)?;

        let name = patch
            .name
            .as_deref()
            .map(normalize_display_name)
            .filter(|name| *name != collection.name);
        let code = patch
            .code
            .as_deref()
            .map(|code| code.trim().to_string())
            .filter(|code| *code != collection.code);
        self.ctx
            .validator()
            .require_natural_key_free(name.as_deref(), code.as_deref(), Some(id))?;

        if let Some(name) = name {
            collection.name = name;
        }
        if let Some(code) = code {
            collection.code = code;
        }
        if let Some(language) = &patch.language {
            collection.language = language.trim().to_string();
        }
        if let Some(description) = &patch.description {
            collection.description = normalize_description(description);
        }
        collection.updated_at = self.ctx.now_ms();
        Ok(collection)
    }

    /// Returns the number of rows removed.
    pub fn delete(&self, id: EntityId) -> Result<u64, ServiceError> {
        self.ctx.remove(KIND, id)
    }
}
