//! Ledger entries and the read-side view of a question's history.
//!
//! Entries are immutable values. A [`History`] is an ordered snapshot of a
//! question's ledger, newest entry first.

use super::ids::{ActorId, QuestionId, TransitionId, VersionId};
use super::status::Status;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What produced a ledger entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// A status change requested by an actor.
    Manual,
    /// The synthetic entry written when a new version resets the question to `Draft`.
    VersionCreated,
    /// A corrective note appended against a mis-recorded entry; status is unchanged.
    Correction,
}

/// Record of a single workflow transition.
///
/// # Example
///
/// ```rust
/// use question_workflow::core::{ActorId, QuestionId, Status, TransitionKind, WorkflowTransition};
/// use chrono::Utc;
///
/// let entry = WorkflowTransition::manual(
///     QuestionId::new(),
///     Status::Review,
///     Status::Rejected,
///     ActorId::from("reviewer"),
///     Some("missing rubric".to_string()),
///     Utc::now(),
/// );
/// assert_eq!(entry.kind, TransitionKind::Manual);
/// assert!(entry.changes_status());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkflowTransition {
    pub id: TransitionId,
    pub question_id: QuestionId,
    pub from: Status,
    pub to: Status,
    pub actor: ActorId,
    pub comments: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub kind: TransitionKind,
    /// Version created by a `VersionCreated` entry.
    pub version_id: Option<VersionId>,
}

impl WorkflowTransition {
    pub fn manual(
        question_id: QuestionId,
        from: Status,
        to: Status,
        actor: ActorId,
        comments: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TransitionId::new(),
            question_id,
            from,
            to,
            actor,
            comments,
            timestamp,
            kind: TransitionKind::Manual,
            version_id: None,
        }
    }

    pub fn version_created(
        question_id: QuestionId,
        from: Status,
        version_id: VersionId,
        actor: ActorId,
        comments: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TransitionId::new(),
            question_id,
            from,
            to: Status::Draft,
            actor,
            comments: Some(comments.into()),
            timestamp,
            kind: TransitionKind::VersionCreated,
            version_id: Some(version_id),
        }
    }

    pub fn correction(
        question_id: QuestionId,
        status: Status,
        actor: ActorId,
        comments: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TransitionId::new(),
            question_id,
            from: status,
            to: status,
            actor,
            comments: Some(comments.into()),
            timestamp,
            kind: TransitionKind::Correction,
            version_id: None,
        }
    }

    pub fn changes_status(&self) -> bool {
        self.kind != TransitionKind::Correction
    }
}

/// Ordered snapshot of one question's ledger, newest entry first.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct History {
    entries: Vec<WorkflowTransition>,
}

impl History {
    /// Build a history from entries in commit order (oldest first).
    pub fn from_commit_order(mut entries: Vec<WorkflowTransition>) -> Self {
        entries.reverse();
        Self { entries }
    }

    /// All entries, newest first.
    pub fn entries(&self) -> &[WorkflowTransition] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent entry.
    pub fn latest(&self) -> Option<&WorkflowTransition> {
        self.entries.first()
    }

    /// Statuses traversed, oldest first: the first entry's source status,
    /// then the target of each status-changing entry.
    pub fn path(&self) -> Vec<Status> {
        let mut changes = self.entries.iter().rev().filter(|t| t.changes_status());
        let mut path = Vec::new();
        if let Some(first) = changes.next() {
            path.push(first.from);
            path.push(first.to);
        }
        path.extend(changes.map(|t| t.to));
        path
    }

    /// Time between the oldest and newest entry.
    ///
    /// `None` when there are no entries.
    pub fn span(&self) -> Option<Duration> {
        let newest = self.entries.first()?;
        let oldest = self.entries.last()?;
        newest
            .timestamp
            .signed_duration_since(oldest.timestamp)
            .to_std()
            .ok()
    }
}

impl IntoIterator for History {
    type Item = WorkflowTransition;
    type IntoIter = std::vec::IntoIter<WorkflowTransition>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
