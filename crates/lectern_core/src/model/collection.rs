//! Collection domain model.
//!
//! # Invariants
//! - `name` and `code` are each unique across all collections (case-sensitive).
//! - Collections have no parent and no ordinal; listings order them by name.

use super::entity::EntityId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Top-level grouping, e.g. one translation of the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: EntityId,
    /// Unique display name.
    pub name: String,
    /// Unique short code, 2..=10 characters by default limits.
    pub code: String,
    /// Locale or language tag, free-form.
    pub language: String,
    pub description: Option<String>,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds.
    pub updated_at: i64,
}

impl Collection {
    /// Creates a collection with a generated id and both timestamps at `now_ms`.
    pub fn new(
        name: impl Into<String>,
        code: impl Into<String>,
        language: impl Into<String>,
        description: Option<String>,
        now_ms: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            code: code.into(),
            language: language.into(),
            description,
            created_at: now_ms,
            updated_at: now_ms,
        }
    }
}
