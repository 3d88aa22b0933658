//! Service-level error shared by every use-case.
//!
//! # Invariants
//! - Every variant belongs to exactly one `ErrorCategory`.
//! - Client-input categories are produced before any durable write.

use crate::model::entity::{EntityId, EntityKind, Ordinal};
use crate::repo::{ConstraintKind, RepoError};
use crate::validation::ValidationErrors;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Coarse outcome class a boundary layer maps to a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    BadRequest,
    NotFound,
    Conflict,
    Internal,
}

impl ErrorCategory {
    /// HTTP-equivalent status code.
    pub fn status_code(self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Internal => 500,
        }
    }
}

/// Natural-key field of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NaturalKeyField {
    Name,
    Code,
}

impl Display for NaturalKeyField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name => f.write_str("name"),
            Self::Code => f.write_str("code"),
        }
    }
}

/// Errors from hierarchy use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Field-level input checks failed.
    InvalidInput(ValidationErrors),
    /// `page` or `limit` below 1.
    InvalidPage { field: &'static str, value: u32 },
    /// Target record does not exist.
    NotFound { kind: EntityKind, id: EntityId },
    /// Referenced parent does not exist.
    ParentNotFound { kind: EntityKind, id: EntityId },
    /// A sibling already holds this ordinal.
    OrdinalTaken {
        kind: EntityKind,
        parent_id: EntityId,
        ordinal: Ordinal,
    },
    /// Another collection already uses this name or code.
    NaturalKeyTaken {
        field: NaturalKeyField,
        value: String,
    },
    /// One batch repeats ordinals; each duplicated ordinal listed once.
    DuplicateOrdinals(Vec<Ordinal>),
    /// Batch ordinals already stored under the subunit, ascending.
    LeafOrdinalsTaken {
        subunit_id: EntityId,
        ordinals: Vec<Ordinal>,
    },
    /// Delete refused while children exist.
    HasChildren {
        kind: EntityKind,
        id: EntityId,
        children: u64,
    },
    /// A schema constraint fired after the optimistic checks passed.
    StoreConstraint {
        constraint: ConstraintKind,
        message: String,
    },
    /// Write succeeded but the read-back disagrees.
    InconsistentState(&'static str),
    Repo(RepoError),
}

impl ServiceError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput(_)
            | Self::InvalidPage { .. }
            | Self::ParentNotFound { .. }
            | Self::DuplicateOrdinals(_) => ErrorCategory::BadRequest,
            Self::StoreConstraint {
                constraint: ConstraintKind::Check,
                ..
            } => ErrorCategory::BadRequest,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::OrdinalTaken { .. }
            | Self::NaturalKeyTaken { .. }
            | Self::LeafOrdinalsTaken { .. }
            | Self::HasChildren { .. }
            | Self::StoreConstraint { .. } => ErrorCategory::Conflict,
            Self::InconsistentState(_) | Self::Repo(_) => ErrorCategory::Internal,
        }
    }

    /// Whether the error describes bad client input rather than a fault.
    pub fn is_client_error(&self) -> bool {
        self.category() != ErrorCategory::Internal
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(errors) => write!(f, "invalid input: {errors}"),
            Self::InvalidPage { field, value } => {
                write!(f, "{field} must be at least 1, got {value}")
            }
            Self::NotFound { kind, id } => write!(f, "{kind} with id {id} not found"),
            Self::ParentNotFound { kind, id } => write!(f, "parent {kind} with id {id} not found"),
            Self::OrdinalTaken {
                kind,
                parent_id,
                ordinal,
            } => write!(
                f,
                "{kind} {ordinal} already exists under parent {parent_id}"
            ),
            Self::NaturalKeyTaken { field, value } => {
                write!(f, "collection with {field} `{value}` already exists")
            }
            Self::DuplicateOrdinals(ordinals) => write!(
                f,
                "duplicate ordinals in request: {}",
                join_ordinals(ordinals)
            ),
            Self::LeafOrdinalsTaken {
                subunit_id,
                ordinals,
            } => write!(
                f,
                "leaves {} already exist under subunit {subunit_id}",
                join_ordinals(ordinals)
            ),
            Self::HasChildren { kind, id, children } => write!(
                f,
                "{kind} {id} still has {children} child record(s)"
            ),
            Self::StoreConstraint {
                constraint,
                message,
            } => write!(f, "storage rejected write ({constraint:?}): {message}"),
            Self::InconsistentState(details) => write!(f, "inconsistent state: {details}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(errors) => Some(errors),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { kind, id } => Self::NotFound { kind, id },
            RepoError::Constraint {
                constraint,
                message,
            } => Self::StoreConstraint {
                constraint,
                message,
            },
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(value: ValidationErrors) -> Self {
        Self::InvalidInput(value)
    }
}

fn join_ordinals(ordinals: &[Ordinal]) -> String {
    ordinals
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn categories_map_to_boundary_statuses() {
        let id = Uuid::new_v4();
        let cases = [
            (
                ServiceError::ParentNotFound {
                    kind: EntityKind::Subunit,
                    id,
                },
                400,
            ),
            (ServiceError::DuplicateOrdinals(vec![1]), 400),
            (
                ServiceError::NotFound {
                    kind: EntityKind::Leaf,
                    id,
                },
                404,
            ),
            (
                ServiceError::LeafOrdinalsTaken {
                    subunit_id: id,
                    ordinals: vec![1, 4],
                },
                409,
            ),
            (
                ServiceError::StoreConstraint {
                    constraint: ConstraintKind::Unique,
                    message: "UNIQUE".to_string(),
                },
                409,
            ),
            (ServiceError::InconsistentState("x"), 500),
        ];
        for (error, status) in cases {
            assert_eq!(error.category().status_code(), status, "{error}");
        }
    }

    #[test]
    fn only_internal_errors_are_faults() {
        assert!(ServiceError::DuplicateOrdinals(vec![2]).is_client_error());
        assert!(ServiceError::StoreConstraint {
            constraint: ConstraintKind::Check,
            message: "CHECK".to_string(),
        }
        .is_client_error());
        assert!(!ServiceError::InconsistentState("read-back").is_client_error());
    }

    #[test]
    fn conflict_message_names_every_ordinal() {
        let error = ServiceError::LeafOrdinalsTaken {
            subunit_id: Uuid::nil(),
            ordinals: vec![1, 3],
        };
        assert!(error.to_string().contains("leaves 1, 3 already exist"));
    }

    #[test]
    fn repo_not_found_becomes_service_not_found() {
        let id = Uuid::new_v4();
        let error = ServiceError::from(RepoError::NotFound {
            kind: EntityKind::Unit,
            id,
        });
        assert!(matches!(
            error,
            ServiceError::NotFound { kind: EntityKind::Unit, id: found } if found == id
        ));
    }
}
