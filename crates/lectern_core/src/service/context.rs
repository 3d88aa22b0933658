//! Explicit wiring handed to every service.
//!
//! # Invariants
//! - Holds borrows only; building a context never touches storage.
//! - Deletes never leave orphans: `Restrict` refuses, `Cascade` removes the
//!   whole subtree in one transaction.

use crate::clock::Clock;
use crate::config::{CoreConfig, DeletePolicy};
use crate::model::entity::{EntityId, EntityKind};
use crate::repo::Store;
use crate::service::error::ServiceError;
use crate::service::integrity::IntegrityValidator;
use log::{info, warn};

/// Store, clock and configuration shared by one set of service calls.
pub struct ServiceContext<'a, S: Store> {
    pub store: &'a S,
    pub clock: &'a dyn Clock,
    pub config: &'a CoreConfig,
}

impl<S: Store> Clone for ServiceContext<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: Store> Copy for ServiceContext<'_, S> {}

impl<'a, S: Store> ServiceContext<'a, S> {
    pub fn new(store: &'a S, clock: &'a dyn Clock, config: &'a CoreConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    pub fn validator(&self) -> IntegrityValidator<'a, S> {
        IntegrityValidator::new(self.store)
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Deletes one record according to the configured `DeletePolicy`.
    ///
    /// Returns the number of rows removed, descendants included.
    pub(crate) fn remove(&self, kind: EntityKind, id: EntityId) -> Result<u64, ServiceError> {
        if let Err(err) = self.validator().require_exists(kind, id) {
            log_rejected("delete", kind, &err);
            return Err(err);
        }

        let removed = match self.config.delete_policy {
            DeletePolicy::Restrict => {
                let children = self.store.count_children(kind, id)?;
                if children > 0 {
                    let err = ServiceError::HasChildren { kind, id, children };
                    log_rejected("delete", kind, &err);
                    return Err(err);
                }
                self.store.delete(kind, id)?;
                1
            }
            DeletePolicy::Cascade => self.store.delete_subtree(kind, id)?,
        };

        info!(
            "event=entity_delete module=service status=ok kind={} id={} rows={}",
            kind, id, removed
        );
        Ok(removed)
    }
}

/// Logs a mutation refused before any write.
pub(crate) fn log_rejected(operation: &str, kind: EntityKind, err: &ServiceError) {
    warn!(
        "event=entity_{} module=service status=rejected kind={} error={}",
        operation, kind, err
    );
}

/// Logs a constraint that fired after the optimistic checks passed.
pub(crate) fn log_late_constraint(operation: &str, kind: EntityKind, err: &ServiceError) {
    if matches!(err, ServiceError::StoreConstraint { .. }) {
        warn!(
            "event=entity_{} module=service status=conflict kind={} error={}",
            operation, kind, err
        );
    }
}
