//! Collection persistence.
//!
//! # Invariants
//! - Natural-key lookups are exact, case-sensitive matches (`BINARY` collation).
//! - Listing order is `name ASC, id ASC`.

use super::{limit_offset, parse_id, RepoError, RepoResult, SqliteStore};
use crate::model::collection::Collection;
use crate::model::entity::{EntityId, EntityKind};
use rusqlite::{params, Row};

const COLLECTION_SELECT_SQL: &str = "SELECT
    id,
    name,
    code,
    language,
    description,
    created_at,
    updated_at
FROM collections";

/// Repository interface for collections.
pub trait CollectionRepository {
    fn insert_collection(&self, collection: &Collection) -> RepoResult<()>;
    fn get_collection(&self, id: EntityId) -> RepoResult<Option<Collection>>;
    /// First collection other than `exclude_id` whose name equals `name` or
    /// whose code equals `code`. `None` fields are not matched.
    fn find_collection_by_natural_key(
        &self,
        name: Option<&str>,
        code: Option<&str>,
        exclude_id: Option<EntityId>,
    ) -> RepoResult<Option<Collection>>;
    fn list_collections(&self, skip: u64, take: u64) -> RepoResult<Vec<Collection>>;
    /// Replaces every mutable column and `updated_at`.
    fn update_collection(&self, collection: &Collection) -> RepoResult<()>;
}

impl CollectionRepository for SqliteStore<'_> {
    fn insert_collection(&self, collection: &Collection) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO collections (
                id,
                name,
                code,
                language,
                description,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                collection.id.to_string(),
                collection.name.as_str(),
                collection.code.as_str(),
                collection.language.as_str(),
                collection.description.as_deref(),
                collection.created_at,
                collection.updated_at,
            ],
        )?;
        Ok(())
    }

    fn get_collection(&self, id: EntityId) -> RepoResult<Option<Collection>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COLLECTION_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_collection_row(row)?));
        }
        Ok(None)
    }

    fn find_collection_by_natural_key(
        &self,
        name: Option<&str>,
        code: Option<&str>,
        exclude_id: Option<EntityId>,
    ) -> RepoResult<Option<Collection>> {
        if name.is_none() && code.is_none() {
            return Ok(None);
        }

        let mut stmt = self.conn.prepare(&format!(
            "{COLLECTION_SELECT_SQL}
             WHERE ((?1 IS NOT NULL AND name = ?1) OR (?2 IS NOT NULL AND code = ?2))
               AND (?3 IS NULL OR id <> ?3)
             ORDER BY name ASC, id ASC
             LIMIT 1;"
        ))?;
        let mut rows = stmt.query(params![
            name,
            code,
            exclude_id.map(|value| value.to_string()),
        ])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_collection_row(row)?));
        }
        Ok(None)
    }

    fn list_collections(&self, skip: u64, take: u64) -> RepoResult<Vec<Collection>> {
        let (limit, offset) = limit_offset(skip, take);
        let mut stmt = self.conn.prepare(&format!(
            "{COLLECTION_SELECT_SQL}
             ORDER BY name ASC, id ASC
             LIMIT ?1 OFFSET ?2;"
        ))?;
        let mut rows = stmt.query(params![limit, offset])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_collection_row(row)?);
        }
        Ok(items)
    }

    fn update_collection(&self, collection: &Collection) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE collections
             SET
                name = ?2,
                code = ?3,
                language = ?4,
                description = ?5,
                updated_at = ?6
             WHERE id = ?1;",
            params![
                collection.id.to_string(),
                collection.name.as_str(),
                collection.code.as_str(),
                collection.language.as_str(),
                collection.description.as_deref(),
                collection.updated_at,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Collection,
                id: collection.id,
            });
        }
        Ok(())
    }
}

fn parse_collection_row(row: &Row<'_>) -> RepoResult<Collection> {
    let id_text: String = row.get("id")?;
    Ok(Collection {
        id: parse_id(&id_text, "collections.id")?,
        name: row.get("name")?,
        code: row.get("code")?,
        language: row.get("language")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
