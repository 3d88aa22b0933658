//! Subunit persistence.

use super::{limit_offset, parse_id, parse_ordinal, RepoError, RepoResult, SqliteStore};
use crate::model::entity::{EntityId, EntityKind};
use crate::model::subunit::Subunit;
use rusqlite::{params, Row};

const SUBUNIT_SELECT_SQL: &str = "SELECT
    id,
    unit_id,
    ordinal,
    created_at,
    updated_at
FROM subunits";

/// Repository interface for subunits.
pub trait SubunitRepository {
    fn insert_subunit(&self, subunit: &Subunit) -> RepoResult<()>;
    fn get_subunit(&self, id: EntityId) -> RepoResult<Option<Subunit>>;
    /// Subunits ordered by `ordinal ASC, id ASC`, optionally under one unit.
    fn list_subunits(
        &self,
        unit_id: Option<EntityId>,
        skip: u64,
        take: u64,
    ) -> RepoResult<Vec<Subunit>>;
    fn update_subunit(&self, subunit: &Subunit) -> RepoResult<()>;
}

impl SubunitRepository for SqliteStore<'_> {
    fn insert_subunit(&self, subunit: &Subunit) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO subunits (id, unit_id, ordinal, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                subunit.id.to_string(),
                subunit.unit_id.to_string(),
                subunit.ordinal,
                subunit.created_at,
                subunit.updated_at,
            ],
        )?;
        Ok(())
    }

    fn get_subunit(&self, id: EntityId) -> RepoResult<Option<Subunit>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SUBUNIT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_subunit_row(row)?));
        }
        Ok(None)
    }

    fn list_subunits(
        &self,
        unit_id: Option<EntityId>,
        skip: u64,
        take: u64,
    ) -> RepoResult<Vec<Subunit>> {
        let (limit, offset) = limit_offset(skip, take);
        let mut stmt = self.conn.prepare(&format!(
            "{SUBUNIT_SELECT_SQL}
             WHERE (?1 IS NULL OR unit_id = ?1)
             ORDER BY ordinal ASC, id ASC
             LIMIT ?2 OFFSET ?3;"
        ))?;
        let mut rows = stmt.query(params![
            unit_id.map(|value| value.to_string()),
            limit,
            offset,
        ])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_subunit_row(row)?);
        }
        Ok(items)
    }

    fn update_subunit(&self, subunit: &Subunit) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE subunits
             SET unit_id = ?2,
                 ordinal = ?3,
                 updated_at = ?4
             WHERE id = ?1;",
            params![
                subunit.id.to_string(),
                subunit.unit_id.to_string(),
                subunit.ordinal,
                subunit.updated_at,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Subunit,
                id: subunit.id,
            });
        }
        Ok(())
    }
}

fn parse_subunit_row(row: &Row<'_>) -> RepoResult<Subunit> {
    let id_text: String = row.get("id")?;
    let unit_text: String = row.get("unit_id")?;
    Ok(Subunit {
        id: parse_id(&id_text, "subunits.id")?,
        unit_id: parse_id(&unit_text, "subunits.unit_id")?,
        ordinal: parse_ordinal(row.get("ordinal")?, "subunits.ordinal")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
