//! Leaf domain model.
//!
//! # Invariants
//! - `ordinal` is unique within one subunit.
//! - `text` is non-blank and bounded by `InputLimits::leaf_text_max_chars`.

use super::entity::{EntityId, Ordinal};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ordered, text-bearing child of a subunit, e.g. one verse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaf {
    pub id: EntityId,
    pub subunit_id: EntityId,
    pub ordinal: Ordinal,
    pub text: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Leaf {
    pub fn new(subunit_id: EntityId, ordinal: Ordinal, text: impl Into<String>, now_ms: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            subunit_id,
            ordinal,
            text: text.into(),
            created_at: now_ms,
            updated_at: now_ms,
        }
    }
}
