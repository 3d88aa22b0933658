//! Kind-driven queries shared by all four levels.
//!
//! Table and column names come from `EntityKind`, never from caller input.

use super::{RepoError, RepoResult, SqliteStore};
use crate::model::entity::{EntityId, EntityKind, Ordinal};
use log::debug;
use rusqlite::{params, OptionalExtension, Transaction, TransactionBehavior};

/// Repository interface for operations that only need the kind of a record.
pub trait NodeRepository {
    /// Whether a record of `kind` with `id` exists.
    fn exists(&self, kind: EntityKind, id: EntityId) -> RepoResult<bool>;
    /// Id of the sibling holding `(parent_id, ordinal)`, if any.
    fn find_by_parent_and_ordinal(
        &self,
        kind: EntityKind,
        parent_id: EntityId,
        ordinal: Ordinal,
    ) -> RepoResult<Option<EntityId>>;
    /// Number of records of `kind`, optionally restricted to one parent.
    fn count(&self, kind: EntityKind, parent_id: Option<EntityId>) -> RepoResult<u64>;
    /// Number of direct children of one record.
    fn count_children(&self, kind: EntityKind, id: EntityId) -> RepoResult<u64>;
    /// Deletes exactly one record. Children are not touched.
    fn delete(&self, kind: EntityKind, id: EntityId) -> RepoResult<()>;
    /// Deletes one record and all its descendants in one transaction.
    ///
    /// Returns the number of rows removed, the record itself included.
    fn delete_subtree(&self, kind: EntityKind, id: EntityId) -> RepoResult<u64>;
}

impl NodeRepository for SqliteStore<'_> {
    fn exists(&self, kind: EntityKind, id: EntityId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            &format!(
                "SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1);",
                kind.table()
            ),
            [id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn find_by_parent_and_ordinal(
        &self,
        kind: EntityKind,
        parent_id: EntityId,
        ordinal: Ordinal,
    ) -> RepoResult<Option<EntityId>> {
        let parent_column = require_parent_column(kind, "find_by_parent_and_ordinal")?;
        let found: Option<String> = self
            .conn
            .query_row(
                &format!(
                    "SELECT id
                     FROM {}
                     WHERE {parent_column} = ?1
                       AND ordinal = ?2;",
                    kind.table()
                ),
                params![parent_id.to_string(), ordinal],
                |row| row.get(0),
            )
            .optional()?;

        found
            .map(|value| super::parse_id(&value, "id"))
            .transpose()
    }

    fn count(&self, kind: EntityKind, parent_id: Option<EntityId>) -> RepoResult<u64> {
        let total: i64 = match parent_id {
            Some(parent_id) => {
                let parent_column = require_parent_column(kind, "count")?;
                self.conn.query_row(
                    &format!(
                        "SELECT COUNT(*) FROM {} WHERE {parent_column} = ?1;",
                        kind.table()
                    ),
                    [parent_id.to_string()],
                    |row| row.get(0),
                )?
            }
            None => self.conn.query_row(
                &format!("SELECT COUNT(*) FROM {};", kind.table()),
                [],
                |row| row.get(0),
            )?,
        };
        Ok(total.max(0) as u64)
    }

    fn count_children(&self, kind: EntityKind, id: EntityId) -> RepoResult<u64> {
        match kind.child() {
            Some(child) => self.count(child, Some(id)),
            None => Ok(0),
        }
    }

    fn delete(&self, kind: EntityKind, id: EntityId) -> RepoResult<()> {
        let changed = self.conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1;", kind.table()),
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { kind, id });
        }
        Ok(())
    }

    fn delete_subtree(&self, kind: EntityKind, id: EntityId) -> RepoResult<u64> {
        // (descendant kind, SQL selecting the ids of its parents)
        let mut levels: Vec<(EntityKind, String)> = Vec::new();
        let mut parent_ids = "SELECT ?1".to_string();
        let mut cursor = kind.child();
        while let Some(child) = cursor {
            let Some(parent_column) = child.parent_column() else {
                break;
            };
            levels.push((child, parent_ids.clone()));
            parent_ids = format!(
                "SELECT id FROM {} WHERE {parent_column} IN ({parent_ids})",
                child.table()
            );
            cursor = child.child();
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut removed = 0_u64;
        for (child, parent_ids) in levels.iter().rev() {
            let Some(parent_column) = child.parent_column() else {
                continue;
            };
            let changed = tx.execute(
                &format!(
                    "DELETE FROM {} WHERE {parent_column} IN ({parent_ids});",
                    child.table()
                ),
                [id.to_string()],
            )?;
            debug!(
                "event=delete_subtree module=repo status=progress root_kind={kind} level={child} rows={changed}"
            );
            removed += changed as u64;
        }

        let changed = tx.execute(
            &format!("DELETE FROM {} WHERE id = ?1;", kind.table()),
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { kind, id });
        }
        tx.commit()?;

        Ok(removed + changed as u64)
    }
}

fn require_parent_column(kind: EntityKind, operation: &'static str) -> RepoResult<&'static str> {
    kind.parent_column()
        .ok_or(RepoError::Unsupported { kind, operation })
}
