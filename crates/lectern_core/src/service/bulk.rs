//! All-or-nothing leaf creation under one subunit.
//!
//! # Responsibility
//! - Run every batch precondition before the first write.
//! - Hand the batch to the store as a single transaction.
//!
//! # Invariants
//! - Steps run in order: field checks, subunit exists, no duplicate ordinals
//!   in the request, no collision with stored leaves, atomic insert.
//! - A failed batch persists nothing.

use crate::model::entity::{EntityKind, Ordinal};
use crate::model::leaf::Leaf;
use crate::repo::Store;
use crate::service::context::{log_late_constraint, log_rejected, ServiceContext};
use crate::service::error::ServiceError;
use crate::service::input::BulkLeaves;
use log::info;
use serde::Serialize;
use std::collections::BTreeMap;

/// Result of a successful batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkCreated {
    pub count: usize,
    /// Created records in request order.
    pub leaves: Vec<Leaf>,
}

pub struct BulkLeafCoordinator<'a, S: Store> {
    ctx: ServiceContext<'a, S>,
}

impl<'a, S: Store> BulkLeafCoordinator<'a, S> {
    pub fn new(ctx: ServiceContext<'a, S>) -> Self {
        Self { ctx }
    }

    pub fn create_leaves(&self, request: &BulkLeaves) -> Result<BulkCreated, ServiceError> {
        self.check(request).inspect_err(|err| {
            log_rejected("bulk_create", EntityKind::Leaf, err);
        })?;

        let now_ms = self.ctx.now_ms();
        let leaves: Vec<Leaf> = request
            .leaves
            .iter()
            .map(|spec| Leaf::new(request.subunit_id, spec.ordinal, spec.text.clone(), now_ms))
            .collect();

        self.ctx
            .store
            .insert_leaves_atomic(&leaves)
            .map_err(ServiceError::from)
            .inspect_err(|err| log_late_constraint("bulk_create", EntityKind::Leaf, err))?;

        info!(
            "event=leaf_bulk_create module=service status=ok subunit_id={} count={}",
            request.subunit_id,
            leaves.len()
        );
        Ok(BulkCreated {
            count: leaves.len(),
            leaves,
        })
    }

    fn check(&self, request: &BulkLeaves) -> Result<(), ServiceError> {
        request.validate(&self.ctx.config.limits)?;
        self.ctx
            .validator()
            .require_parent_exists(EntityKind::Leaf, request.subunit_id)?;

        let ordinals: Vec<Ordinal> = request.leaves.iter().map(|spec| spec.ordinal).collect();
        let duplicates = duplicated_ordinals(&ordinals);
        if !duplicates.is_empty() {
            return Err(ServiceError::DuplicateOrdinals(duplicates));
        }

        let taken = self
            .ctx
            .store
            .existing_leaf_ordinals(request.subunit_id, &ordinals)?;
        if !taken.is_empty() {
            return Err(ServiceError::LeafOrdinalsTaken {
                subunit_id: request.subunit_id,
                ordinals: taken,
            });
        }
        Ok(())
    }
}

/// Ordinals appearing more than once, ascending, each listed once.
fn duplicated_ordinals(ordinals: &[Ordinal]) -> Vec<Ordinal> {
    let mut seen: BTreeMap<Ordinal, usize> = BTreeMap::new();
    for ordinal in ordinals {
        *seen.entry(*ordinal).or_default() += 1;
    }
    seen.into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(ordinal, _)| ordinal)
        .collect()
}
