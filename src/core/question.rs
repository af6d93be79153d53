//! Question head pointers and immutable question versions.

use super::ids::{ActorId, QuestionId, VersionId};
use super::status::Status;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque content of a question version (title, body, answers, metadata).
///
/// The engine never inspects the snapshot; it only stores it with the
/// version it belongs to.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentSnapshot(serde_json::Value);

impl ContentSnapshot {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}

impl From<serde_json::Value> for ContentSnapshot {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// Mutable head pointer of a logical question.
///
/// `revision` is bumped by every commit that saves the question and is used
/// by stores as an optimistic-lock token.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    /// Root of the version lineage; equal to `id` for root questions.
    pub original_question_id: QuestionId,
    pub status: Status,
    pub current_version_id: VersionId,
    /// Content owner.
    pub created_by: ActorId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub revision: u64,
}

impl Question {
    /// A freshly created question in `Draft`, pointing at its first version.
    pub fn draft(
        id: QuestionId,
        original_question_id: QuestionId,
        version_id: VersionId,
        created_by: ActorId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            original_question_id,
            status: Status::Draft,
            current_version_id: version_id,
            created_by,
            created_at: now,
            updated_at: now,
            revision: 0,
        }
    }

    /// Lineage this question's versions belong to.
    pub fn lineage(&self) -> QuestionId {
        self.original_question_id
    }

    pub fn is_root(&self) -> bool {
        self.id == self.original_question_id
    }

    pub fn is_owned_by(&self, actor: &ActorId) -> bool {
        &self.created_by == actor
    }

    /// The question after moving to `status`. Pure; the receiver is unchanged.
    pub fn with_status(&self, status: Status, now: DateTime<Utc>) -> Self {
        Self {
            status,
            updated_at: now,
            revision: self.revision + 1,
            ..self.clone()
        }
    }

    /// The question after switching to a freshly created version, which
    /// always restarts the review cycle in `Draft`.
    pub fn with_new_version(&self, version_id: VersionId, now: DateTime<Utc>) -> Self {
        Self {
            status: Status::Draft,
            current_version_id: version_id,
            updated_at: now,
            revision: self.revision + 1,
            ..self.clone()
        }
    }
}

/// One immutable version of a question.
///
/// The label is kept exactly as stored; it is parsed on demand so that a
/// corrupt stored label surfaces as an error instead of being guessed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuestionVersion {
    pub id: VersionId,
    pub question_id: QuestionId,
    pub original_question_id: QuestionId,
    pub version_label: String,
    pub content: ContentSnapshot,
    pub is_latest: bool,
    pub created_by: ActorId,
    pub created_at: DateTime<Utc>,
    /// Status the version was created into; always `Draft`.
    pub status: Status,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Question {
        let id = QuestionId::new();
        Question::draft(id, id, VersionId::new(), ActorId::from("author"), Utc::now())
    }

    #[test]
    fn draft_question_is_root_in_draft() {
        let question = sample();
        assert_eq!(question.status, Status::Draft);
        assert!(question.is_root());
        assert_eq!(question.lineage(), question.id);
        assert_eq!(question.revision, 0);
        assert!(question.is_owned_by(&ActorId::from("author")));
        assert!(!question.is_owned_by(&ActorId::from("someone-else")));
    }

    #[test]
    fn with_status_bumps_revision_without_touching_original() {
        let question = sample();
        let later = Utc::now();
        let moved = question.with_status(Status::Review, later);

        assert_eq!(moved.status, Status::Review);
        assert_eq!(moved.revision, 1);
        assert_eq!(moved.updated_at, later);
        assert_eq!(moved.current_version_id, question.current_version_id);
        assert_eq!(question.status, Status::Draft);
        assert_eq!(question.revision, 0);
    }

    #[test]
    fn with_new_version_resets_to_draft() {
        let question = sample().with_status(Status::Review, Utc::now());
        let approved = question.with_status(Status::Approved, Utc::now());
        let next = VersionId::new();
        let revised = approved.with_new_version(next, Utc::now());

        assert_eq!(revised.status, Status::Draft);
        assert_eq!(revised.current_version_id, next);
        assert_eq!(revised.revision, 3);
    }

    #[test]
    fn content_snapshot_is_opaque_json() {
        let content = ContentSnapshot::new(json!({"title": "Q1", "answers": [1, 2]}));
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["title"], "Q1");
        assert_eq!(content.into_value()["answers"][1], 2);
    }
}
