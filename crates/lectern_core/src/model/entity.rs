//! Identity and kind descriptors shared by every hierarchy record.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of any hierarchy record.
///
/// Kept as a type alias so signatures read by intent; the kind travels
/// alongside the id wherever it matters.
pub type EntityId = Uuid;

/// 1-based position of a record among its siblings.
pub type Ordinal = u32;

/// The four levels of the hierarchy, top first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Collection,
    Unit,
    Subunit,
    Leaf,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [Self::Collection, Self::Unit, Self::Subunit, Self::Leaf];

    /// Kind of the required parent, `None` for the top level.
    pub fn parent(self) -> Option<EntityKind> {
        match self {
            Self::Collection => None,
            Self::Unit => Some(Self::Collection),
            Self::Subunit => Some(Self::Unit),
            Self::Leaf => Some(Self::Subunit),
        }
    }

    /// Kind of the direct children, `None` for leaves.
    pub fn child(self) -> Option<EntityKind> {
        match self {
            Self::Collection => Some(Self::Unit),
            Self::Unit => Some(Self::Subunit),
            Self::Subunit => Some(Self::Leaf),
            Self::Leaf => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Collection => "collection",
            Self::Unit => "unit",
            Self::Subunit => "subunit",
            Self::Leaf => "leaf",
        }
    }

    pub fn parse(value: &str) -> Option<EntityKind> {
        match value.trim().to_ascii_lowercase().as_str() {
            "collection" => Some(Self::Collection),
            "unit" => Some(Self::Unit),
            "subunit" => Some(Self::Subunit),
            "leaf" => Some(Self::Leaf),
            _ => None,
        }
    }

    /// Backing SQLite table.
    pub(crate) fn table(self) -> &'static str {
        match self {
            Self::Collection => "collections",
            Self::Unit => "units",
            Self::Subunit => "subunits",
            Self::Leaf => "leaves",
        }
    }

    /// Column holding the parent reference, `None` for the top level.
    pub(crate) fn parent_column(self) -> Option<&'static str> {
        match self {
            Self::Collection => None,
            Self::Unit => Some("collection_id"),
            Self::Subunit => Some("unit_id"),
            Self::Leaf => Some("subunit_id"),
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
