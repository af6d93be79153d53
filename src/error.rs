//! Engine-level error type.

use crate::core::{ActorId, QuestionId, Status, VersionId};
use crate::store::StoreError;
use crate::validator::{Requirement, Violation};
use crate::versions::LabelError;
use std::time::Duration;
use thiserror::Error;

/// Errors returned by engine operations.
///
/// Validation failures are deterministic caller errors. Contention and
/// storage failures are transient; see [`WorkflowError::is_retryable`]. The
/// engine itself never retries.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorkflowError {
    #[error("Transition from {from} to {to} is not permitted")]
    InvalidTransition { from: Status, to: Status },

    #[error("Transition from {from} to {to} requires a comment")]
    MissingComment { from: Status, to: Status },

    #[error("Actor '{actor}' needs {requirement} to move from {from} to {to}")]
    Unauthorized {
        actor: ActorId,
        from: Status,
        to: Status,
        requirement: Requirement,
    },

    #[error("Transition rejected by policy: {0}")]
    PolicyViolation(String),

    #[error("Cannot {operation} while the question is {status}")]
    InvalidState {
        status: Status,
        operation: &'static str,
    },

    #[error("Question {0} not found")]
    QuestionNotFound(QuestionId),

    #[error("Version {0} not found")]
    VersionNotFound(VersionId),

    #[error("Concurrent modification of question or lineage {0}")]
    ConcurrentVersionConflict(QuestionId),

    #[error("Timed out after {waited:?} waiting for the lock on question {question_id}")]
    LockTimeout {
        question_id: QuestionId,
        waited: Duration,
    },

    #[error("Version {version_id} has corrupt label '{label}': {source}")]
    CorruptVersionLabel {
        version_id: VersionId,
        label: String,
        #[source]
        source: LabelError,
    },

    #[error("Data integrity violation: {0}")]
    IntegrityViolation(String),

    #[error("Identity lookup failed: {0}")]
    IdentityUnavailable(String),

    #[error("Persistence failure: {0}")]
    PersistenceFailure(#[source] StoreError),
}

impl WorkflowError {
    /// Whether the caller may retry after a short backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConcurrentVersionConflict(_)
                | Self::LockTimeout { .. }
                | Self::IdentityUnavailable(_)
                | Self::PersistenceFailure(_)
        )
    }

    /// Map a validator violation, attributing capability failures to `actor`.
    pub fn from_violation(violation: Violation, actor: &ActorId) -> Self {
        match violation {
            Violation::IllegalEdge { from, to } => Self::InvalidTransition { from, to },
            Violation::MissingComment { from, to } => Self::MissingComment { from, to },
            Violation::MissingCapability {
                from,
                to,
                requirement,
            } => Self::Unauthorized {
                actor: actor.clone(),
                from,
                to,
                requirement,
            },
            Violation::CustomCheckFailed { message } => Self::PolicyViolation(message),
        }
    }
}

impl From<StoreError> for WorkflowError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::RevisionMismatch { id, .. } => Self::ConcurrentVersionConflict(id),
            StoreError::LatestMoved { lineage } => Self::ConcurrentVersionConflict(lineage),
            other => Self::PersistenceFailure(other),
        }
    }
}
