//! Leaf persistence, including the all-or-nothing batch insert.
//!
//! # Invariants
//! - `insert_leaves_atomic` runs inside one `IMMEDIATE` transaction; any row
//!   failing rolls back every row of the batch.

use super::{limit_offset, parse_id, parse_ordinal, RepoError, RepoResult, SqliteStore};
use crate::model::entity::{EntityId, EntityKind, Ordinal};
use crate::model::leaf::Leaf;
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};

const LEAF_SELECT_SQL: &str = "SELECT
    id,
    subunit_id,
    ordinal,
    text,
    created_at,
    updated_at
FROM leaves";

const INSERT_LEAF_SQL: &str = "INSERT INTO leaves (
    id,
    subunit_id,
    ordinal,
    text,
    created_at,
    updated_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6);";

// Stays well below SQLite's bound-parameter limit.
const ORDINAL_LOOKUP_CHUNK: usize = 500;

/// Repository interface for leaves.
pub trait LeafRepository {
    fn insert_leaf(&self, leaf: &Leaf) -> RepoResult<()>;
    /// Inserts every leaf or none.
    fn insert_leaves_atomic(&self, leaves: &[Leaf]) -> RepoResult<()>;
    fn get_leaf(&self, id: EntityId) -> RepoResult<Option<Leaf>>;
    /// Leaves ordered by `ordinal ASC, id ASC`, optionally under one subunit.
    fn list_leaves(
        &self,
        subunit_id: Option<EntityId>,
        skip: u64,
        take: u64,
    ) -> RepoResult<Vec<Leaf>>;
    /// Subset of `ordinals` already used under `subunit_id`, ascending.
    fn existing_leaf_ordinals(
        &self,
        subunit_id: EntityId,
        ordinals: &[Ordinal],
    ) -> RepoResult<Vec<Ordinal>>;
    fn update_leaf(&self, leaf: &Leaf) -> RepoResult<()>;
}

impl LeafRepository for SqliteStore<'_> {
    fn insert_leaf(&self, leaf: &Leaf) -> RepoResult<()> {
        insert_leaf_row(self.conn, leaf)
    }

    fn insert_leaves_atomic(&self, leaves: &[Leaf]) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        for leaf in leaves {
            insert_leaf_row(&tx, leaf)?;
        }
        tx.commit()?;
        debug!(
            "event=leaf_batch_insert module=repo status=ok rows={}",
            leaves.len()
        );
        Ok(())
    }

    fn get_leaf(&self, id: EntityId) -> RepoResult<Option<Leaf>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{LEAF_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_leaf_row(row)?));
        }
        Ok(None)
    }

    fn list_leaves(
        &self,
        subunit_id: Option<EntityId>,
        skip: u64,
        take: u64,
    ) -> RepoResult<Vec<Leaf>> {
        let (limit, offset) = limit_offset(skip, take);
        let mut stmt = self.conn.prepare(&format!(
            "{LEAF_SELECT_SQL}
             WHERE (?1 IS NULL OR subunit_id = ?1)
             ORDER BY ordinal ASC, id ASC
             LIMIT ?2 OFFSET ?3;"
        ))?;
        let mut rows = stmt.query(params![
            subunit_id.map(|value| value.to_string()),
            limit,
            offset,
        ])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_leaf_row(row)?);
        }
        Ok(items)
    }

    fn existing_leaf_ordinals(
        &self,
        subunit_id: EntityId,
        ordinals: &[Ordinal],
    ) -> RepoResult<Vec<Ordinal>> {
        let mut found = Vec::new();
        for chunk in ordinals.chunks(ORDINAL_LOOKUP_CHUNK) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!(
                "SELECT ordinal
                 FROM leaves
                 WHERE subunit_id = ?
                   AND ordinal IN ({placeholders});"
            );
            let mut bind_values = Vec::with_capacity(chunk.len() + 1);
            bind_values.push(Value::Text(subunit_id.to_string()));
            bind_values.extend(chunk.iter().map(|ordinal| Value::Integer(i64::from(*ordinal))));

            let mut stmt = self.conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(bind_values))?;
            while let Some(row) = rows.next()? {
                found.push(parse_ordinal(row.get(0)?, "leaves.ordinal")?);
            }
        }
        found.sort_unstable();
        found.dedup();
        Ok(found)
    }

    fn update_leaf(&self, leaf: &Leaf) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE leaves
             SET subunit_id = ?2,
                 ordinal = ?3,
                 text = ?4,
                 updated_at = ?5
             WHERE id = ?1;",
            params![
                leaf.id.to_string(),
                leaf.subunit_id.to_string(),
                leaf.ordinal,
                leaf.text.as_str(),
                leaf.updated_at,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Leaf,
                id: leaf.id,
            });
        }
        Ok(())
    }
}

fn insert_leaf_row(conn: &Connection, leaf: &Leaf) -> RepoResult<()> {
    conn.execute(
        INSERT_LEAF_SQL,
        params![
            leaf.id.to_string(),
            leaf.subunit_id.to_string(),
            leaf.ordinal,
            leaf.text.as_str(),
            leaf.created_at,
            leaf.updated_at,
        ],
    )?;
    Ok(())
}

fn parse_leaf_row(row: &Row<'_>) -> RepoResult<Leaf> {
    let id_text: String = row.get("id")?;
    let subunit_text: String = row.get("subunit_id")?;
    Ok(Leaf {
        id: parse_id(&id_text, "leaves.id")?,
        subunit_id: parse_id(&subunit_text, "leaves.subunit_id")?,
        ordinal: parse_ordinal(row.get("ordinal")?, "leaves.ordinal")?,
        text: row.get("text")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
