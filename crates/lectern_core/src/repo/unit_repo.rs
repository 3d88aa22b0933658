//! Unit persistence.

use super::{limit_offset, parse_id, parse_ordinal, RepoError, RepoResult, SqliteStore};
use crate::model::entity::{EntityId, EntityKind};
use crate::model::unit::{Unit, UnitCategory};
use rusqlite::{params, Row};

const UNIT_SELECT_SQL: &str = "SELECT
    id,
    collection_id,
    ordinal,
    name,
    code,
    category,
    created_at,
    updated_at
FROM units";

/// Repository interface for units.
pub trait UnitRepository {
    fn insert_unit(&self, unit: &Unit) -> RepoResult<()>;
    fn get_unit(&self, id: EntityId) -> RepoResult<Option<Unit>>;
    /// Units ordered by `ordinal ASC, id ASC`, optionally under one collection.
    fn list_units(
        &self,
        collection_id: Option<EntityId>,
        skip: u64,
        take: u64,
    ) -> RepoResult<Vec<Unit>>;
    fn update_unit(&self, unit: &Unit) -> RepoResult<()>;
}

impl UnitRepository for SqliteStore<'_> {
    fn insert_unit(&self, unit: &Unit) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO units (
                id,
                collection_id,
                ordinal,
                name,
                code,
                category,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                unit.id.to_string(),
                unit.collection_id.to_string(),
                unit.ordinal,
                unit.name.as_str(),
                unit.code.as_str(),
                unit.category.as_str(),
                unit.created_at,
                unit.updated_at,
            ],
        )?;
        Ok(())
    }

    fn get_unit(&self, id: EntityId) -> RepoResult<Option<Unit>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{UNIT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_unit_row(row)?));
        }
        Ok(None)
    }

    fn list_units(
        &self,
        collection_id: Option<EntityId>,
        skip: u64,
        take: u64,
    ) -> RepoResult<Vec<Unit>> {
        let (limit, offset) = limit_offset(skip, take);
        let mut stmt = self.conn.prepare(&format!(
            "{UNIT_SELECT_SQL}
             WHERE (?1 IS NULL OR collection_id = ?1)
             ORDER BY ordinal ASC, id ASC
             LIMIT ?2 OFFSET ?3;"
        ))?;
        let mut rows = stmt.query(params![
            collection_id.map(|value| value.to_string()),
            limit,
            offset,
        ])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_unit_row(row)?);
        }
        Ok(items)
    }

    fn update_unit(&self, unit: &Unit) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE units
             SET
                collection_id = ?2,
                ordinal = ?3,
                name = ?4,
                code = ?5,
                category = ?6,
                updated_at = ?7
             WHERE id = ?1;",
            params![
                unit.id.to_string(),
                unit.collection_id.to_string(),
                unit.ordinal,
                unit.name.as_str(),
                unit.code.as_str(),
                unit.category.as_str(),
                unit.updated_at,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Unit,
                id: unit.id,
            });
        }
        Ok(())
    }
}

fn parse_unit_row(row: &Row<'_>) -> RepoResult<Unit> {
    let id_text: String = row.get("id")?;
    let collection_text: String = row.get("collection_id")?;
    let category_text: String = row.get("category")?;
    let category = UnitCategory::parse(&category_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid category `{category_text}` in units.category"
        ))
    })?;

    Ok(Unit {
        id: parse_id(&id_text, "units.id")?,
        collection_id: parse_id(&collection_text, "units.collection_id")?,
        ordinal: parse_ordinal(row.get("ordinal")?, "units.ordinal")?,
        name: row.get("name")?,
        code: row.get("code")?,
        category,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
