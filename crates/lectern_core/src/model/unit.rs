//! Unit domain model.
//!
//! # Invariants
//! - `ordinal` is unique within one collection.
//! - `name` and `code` are display data only and may repeat.

use super::entity::{EntityId, Ordinal};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Coarse two-valued classification of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitCategory {
    /// Stored and serialized as `OT`.
    #[serde(rename = "OT")]
    Old,
    /// Stored and serialized as `NT`.
    #[serde(rename = "NT")]
    New,
}

impl UnitCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Old => "OT",
            Self::New => "NT",
        }
    }

    /// Parses the stored tag. Matching is exact; `ot` is rejected.
    pub fn parse(value: &str) -> Option<UnitCategory> {
        match value {
            "OT" => Some(Self::Old),
            "NT" => Some(Self::New),
            _ => None,
        }
    }
}

/// Ordered child of a collection, e.g. one book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: EntityId,
    pub collection_id: EntityId,
    pub ordinal: Ordinal,
    pub name: String,
    pub code: String,
    pub category: UnitCategory,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Unit {
    pub fn new(
        collection_id: EntityId,
        ordinal: Ordinal,
        name: impl Into<String>,
        code: impl Into<String>,
        category: UnitCategory,
        now_ms: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            collection_id,
            ordinal,
            name: name.into(),
            code: code.into(),
            category,
            created_at: now_ms,
            updated_at: now_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::UnitCategory;

    #[test]
    fn category_tags_round_trip_through_parse() {
        for category in [UnitCategory::Old, UnitCategory::New] {
            assert_eq!(UnitCategory::parse(category.as_str()), Some(category));
        }
        assert_eq!(UnitCategory::parse("ot"), None);
    }
}
