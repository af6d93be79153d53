//! Storage error types.

use crate::core::{QuestionId, TransitionId, VersionId};
use thiserror::Error;

/// Errors reported by a [`QuestionStore`](super::QuestionStore).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    /// Backend could not be reached or failed mid-operation
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Question was saved by someone else since it was loaded
    #[error("Question {id} revision mismatch: expected {expected}, found {found}")]
    RevisionMismatch {
        id: QuestionId,
        expected: u64,
        found: u64,
    },

    /// Latest-version flag of a lineage is not where the writer expected it
    #[error("Latest version of lineage {lineage} moved")]
    LatestMoved { lineage: QuestionId },

    #[error("Question {0} already exists")]
    DuplicateQuestion(QuestionId),

    #[error("Question {0} does not exist")]
    MissingQuestion(QuestionId),

    #[error("Version {0} already exists")]
    DuplicateVersion(VersionId),

    #[error("Transition {0} already recorded")]
    DuplicateTransition(TransitionId),
}

impl StoreError {
    /// Optimistic-lock failures, as opposed to backend faults or bad input.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::RevisionMismatch { .. } | Self::LatestMoved { .. })
    }
}
