//! Store layer: repository contracts and their SQLite implementation.
//!
//! # Responsibility
//! - Own every read and write of persisted hierarchy state.
//! - Keep SQL inside the persistence boundary; services see typed records.
//!
//! # Invariants
//! - `update_*` and `delete` report `RepoError::NotFound` when no row matched.
//! - Schema constraints (`UNIQUE`, `FOREIGN KEY`, `CHECK`) surface as
//!   `RepoError::Constraint` so callers can tell them from transport failures.
//! - `insert_leaves_atomic` commits every row or none.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::entity::{EntityId, EntityKind, Ordinal};
use rusqlite::{Connection, ErrorCode};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod collection_repo;
pub mod leaf_repo;
pub mod node_repo;
pub mod subunit_repo;
pub mod unit_repo;

pub use collection_repo::CollectionRepository;
pub use leaf_repo::LeafRepository;
pub use node_repo::NodeRepository;
pub use subunit_repo::SubunitRepository;
pub use unit_repo::UnitRepository;

pub type RepoResult<T> = Result<T, RepoError>;

/// Which schema constraint rejected a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
    Check,
    Other,
}

/// Store-level error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound { kind: EntityKind, id: EntityId },
    /// A schema constraint fired.
    Constraint {
        constraint: ConstraintKind,
        message: String,
    },
    /// The operation has no meaning for this kind, e.g. siblings of a collection.
    Unsupported {
        kind: EntityKind,
        operation: &'static str,
    },
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be converted into a valid record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::Constraint {
                constraint,
                message,
            } => write!(f, "{constraint:?} constraint violated: {message}"),
            Self::Unsupported { kind, operation } => {
                write!(f, "operation `{operation}` is not supported for {kind}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "store requires table `{table}`"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        match &value {
            rusqlite::Error::SqliteFailure(failure, message)
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                Self::Constraint {
                    constraint: classify_constraint(failure.extended_code),
                    message: message.clone().unwrap_or_else(|| failure.to_string()),
                }
            }
            _ => Self::Db(DbError::Sqlite(value)),
        }
    }
}

fn classify_constraint(extended_code: i32) -> ConstraintKind {
    match extended_code {
        rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
            ConstraintKind::Unique
        }
        rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => ConstraintKind::ForeignKey,
        rusqlite::ffi::SQLITE_CONSTRAINT_CHECK => ConstraintKind::Check,
        _ => ConstraintKind::Other,
    }
}

/// Everything the services need from storage.
pub trait Store:
    NodeRepository + CollectionRepository + UnitRepository + SubunitRepository + LeafRepository
{
}

impl<T> Store for T where
    T: NodeRepository + CollectionRepository + UnitRepository + SubunitRepository + LeafRepository
{
}

/// SQLite-backed store over a borrowed, migrated connection.
pub struct SqliteStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStore<'conn> {
    /// Wraps a connection after checking it carries the current schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for kind in EntityKind::ALL {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [kind.table()],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(kind.table()));
        }
    }
    Ok(())
}

/// Converts `skip`/`take` into SQLite `LIMIT`/`OFFSET` operands.
pub(crate) fn limit_offset(skip: u64, take: u64) -> (i64, i64) {
    (
        i64::try_from(take).unwrap_or(i64::MAX),
        i64::try_from(skip).unwrap_or(i64::MAX),
    )
}

pub(crate) fn parse_id(value: &str, column: &'static str) -> RepoResult<EntityId> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

pub(crate) fn parse_ordinal(value: i64, column: &'static str) -> RepoResult<Ordinal> {
    Ordinal::try_from(value)
        .ok()
        .filter(|ordinal| *ordinal >= 1)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid ordinal `{value}` in {column}")))
}

#[cfg(test)]
mod tests {
    use super::{classify_constraint, parse_ordinal, ConstraintKind};

    #[test]
    fn constraint_codes_are_classified() {
        assert_eq!(
            classify_constraint(rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE),
            ConstraintKind::Unique
        );
        assert_eq!(
            classify_constraint(rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY),
            ConstraintKind::ForeignKey
        );
        assert_eq!(
            classify_constraint(rusqlite::ffi::SQLITE_CONSTRAINT_NOTNULL),
            ConstraintKind::Other
        );
    }

    #[test]
    fn stored_ordinals_must_be_positive() {
        assert_eq!(parse_ordinal(3, "t.ordinal").expect("valid"), 3);
        assert!(parse_ordinal(0, "t.ordinal").is_err());
        assert!(parse_ordinal(-4, "t.ordinal").is_err());
    }
}
