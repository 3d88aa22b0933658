//! Subunit domain model.

use super::entity::{EntityId, Ordinal};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ordered child of a unit, e.g. one chapter. `ordinal` is unique per unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subunit {
    pub id: EntityId,
    pub unit_id: EntityId,
    pub ordinal: Ordinal,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Subunit {
    pub fn new(unit_id: EntityId, ordinal: Ordinal, now_ms: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            unit_id,
            ordinal,
            created_at: now_ms,
            updated_at: now_ms,
        }
    }
}
