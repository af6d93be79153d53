//! Version store.
//!
//! Owns the immutable versions of each lineage. Creating a version computes
//! the next label from the current latest version, clears the latest flag on
//! it and inserts the new version as latest, all in one unit of work.
//!
//! Only one creation may be in flight per lineage inside a process. A second
//! caller fails fast with `ConcurrentVersionConflict` instead of queueing;
//! across processes the store's latest-flag check catches the same race.

mod label;

pub use label::{LabelError, VersionBump, VersionLabel};

use crate::core::{ActorId, ContentSnapshot, QuestionId, QuestionVersion, Status, VersionId};
use crate::error::WorkflowError;
use crate::store::{QuestionStore, UnitOfWork};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

type InFlight = Arc<Mutex<HashSet<QuestionId>>>;

/// Marks a lineage as having a version creation in progress.
///
/// Released on drop.
#[derive(Debug)]
pub struct LineageClaim {
    lineage: QuestionId,
    in_flight: InFlight,
}

impl Drop for LineageClaim {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.lineage);
    }
}

/// A computed but not yet committed version.
///
/// Holds the lineage claim until dropped, so it should be committed and then
/// released promptly.
#[derive(Debug)]
pub struct PreparedVersion {
    _claim: LineageClaim,
    version: QuestionVersion,
    superseded: VersionId,
}

impl PreparedVersion {
    pub fn version(&self) -> &QuestionVersion {
        &self.version
    }

    /// The version losing its latest flag.
    pub fn superseded(&self) -> VersionId {
        self.superseded
    }

    /// Add this version's writes to `unit`.
    pub fn stage(&self, unit: UnitOfWork) -> UnitOfWork {
        unit.save_version(self.version.clone())
            .supersede_latest(self.version.original_question_id, self.superseded)
    }
}

fn corrupt_label(version: &QuestionVersion, source: LabelError) -> WorkflowError {
    WorkflowError::CorruptVersionLabel {
        version_id: version.id,
        label: version.version_label.clone(),
        source,
    }
}

/// The single latest version of a lineage.
fn latest_of(versions: &[QuestionVersion], lineage: QuestionId) -> Result<&QuestionVersion, WorkflowError> {
    let mut latest = versions.iter().filter(|v| v.is_latest);
    match (latest.next(), latest.next()) {
        (Some(version), None) => Ok(version),
        (None, _) => Err(WorkflowError::IntegrityViolation(format!(
            "lineage {lineage} has no latest version"
        ))),
        (Some(_), Some(_)) => Err(WorkflowError::IntegrityViolation(format!(
            "lineage {lineage} has more than one latest version"
        ))),
    }
}

/// Version operations over a [`QuestionStore`].
#[derive(Clone)]
pub struct VersionStore {
    store: Arc<dyn QuestionStore>,
    in_flight: InFlight,
}

impl VersionStore {
    pub fn new(store: Arc<dyn QuestionStore>) -> Self {
        Self {
            store,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// First version of a new root lineage (`question_id` is its own root).
    pub fn initial(
        question_id: QuestionId,
        content: ContentSnapshot,
        created_by: ActorId,
        now: DateTime<Utc>,
    ) -> QuestionVersion {
        QuestionVersion {
            id: VersionId::new(),
            question_id,
            original_question_id: question_id,
            version_label: VersionLabel::INITIAL.to_string(),
            content,
            is_latest: true,
            created_by,
            created_at: now,
            status: Status::Draft,
        }
    }

    fn claim(&self, lineage: QuestionId) -> Result<LineageClaim, WorkflowError> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if !in_flight.insert(lineage) {
            tracing::warn!(%lineage, "Version creation already in flight for lineage");
            return Err(WorkflowError::ConcurrentVersionConflict(lineage));
        }
        Ok(LineageClaim {
            lineage,
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    /// Compute the next version of `lineage` for `question_id` without
    /// committing it.
    pub async fn prepare(
        &self,
        lineage: QuestionId,
        question_id: QuestionId,
        content: ContentSnapshot,
        created_by: ActorId,
        bump: VersionBump,
    ) -> Result<PreparedVersion, WorkflowError> {
        let claim = self.claim(lineage)?;

        let versions = self.store.load_lineage(lineage).await?;
        if versions.is_empty() {
            return Err(WorkflowError::QuestionNotFound(lineage));
        }
        let current = latest_of(&versions, lineage)?;

        let label: VersionLabel = current
            .version_label
            .parse()
            .map_err(|source| corrupt_label(current, source))?;
        let next = label.next(bump).map_err(|source| corrupt_label(current, source))?;

        let version = QuestionVersion {
            id: VersionId::new(),
            question_id,
            original_question_id: lineage,
            version_label: next.to_string(),
            content,
            is_latest: true,
            created_by,
            created_at: Utc::now(),
            status: Status::Draft,
        };

        Ok(PreparedVersion {
            _claim: claim,
            version,
            superseded: current.id,
        })
    }

    /// Create and commit the next version of `lineage` on its own.
    pub async fn create_version(
        &self,
        lineage: QuestionId,
        question_id: QuestionId,
        content: ContentSnapshot,
        created_by: ActorId,
        bump: VersionBump,
    ) -> Result<QuestionVersion, WorkflowError> {
        let prepared = self
            .prepare(lineage, question_id, content, created_by, bump)
            .await?;
        self.store.commit(prepared.stage(UnitOfWork::new())).await?;
        tracing::info!(
            %lineage,
            version_id = %prepared.version().id,
            label = %prepared.version().version_label,
            "Version created",
        );
        Ok(prepared.version().clone())
    }

    /// All versions of a lineage, newest first.
    pub async fn versions(&self, lineage: QuestionId) -> Result<Vec<QuestionVersion>, WorkflowError> {
        let mut versions = self.store.load_lineage(lineage).await?;
        versions.reverse();
        Ok(versions)
    }

    /// The version currently flagged latest in a lineage.
    pub async fn latest(&self, lineage: QuestionId) -> Result<QuestionVersion, WorkflowError> {
        let versions = self.store.load_lineage(lineage).await?;
        if versions.is_empty() {
            return Err(WorkflowError::QuestionNotFound(lineage));
        }
        latest_of(&versions, lineage).cloned()
    }

    pub async fn version(&self, id: VersionId) -> Result<QuestionVersion, WorkflowError> {
        self.store
            .load_version(id)
            .await?
            .ok_or(WorkflowError::VersionNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Question;
    use crate::store::InMemoryStore;
    use serde_json::json;

    async fn lineage_with(store: &Arc<InMemoryStore>, label: &str) -> QuestionId {
        let id = QuestionId::new();
        let mut v1 = VersionStore::initial(id, ContentSnapshot::default(), "author".into(), Utc::now());
        v1.version_label = label.to_string();
        let question = Question::draft(id, id, v1.id, "author".into(), Utc::now());
        store
            .commit(UnitOfWork::new().insert_question(question).save_version(v1))
            .await
            .unwrap();
        id
    }

    fn versions_over(store: &Arc<InMemoryStore>) -> VersionStore {
        VersionStore::new(Arc::clone(store) as Arc<dyn QuestionStore>)
    }

    #[tokio::test]
    async fn create_version_increments_minor_and_moves_latest() {
        let store = Arc::new(InMemoryStore::new());
        let id = lineage_with(&store, "1.0").await;
        let versions = versions_over(&store);

        let v2 = versions
            .create_version(id, id, json!({"title": "v2"}).into(), "author".into(), VersionBump::Minor)
            .await
            .unwrap();

        assert_eq!(v2.version_label, "1.1");
        assert!(v2.is_latest);
        assert_eq!(v2.status, Status::Draft);

        let all = versions.versions(id).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, v2.id);
        assert!(!all[1].is_latest);
        assert_eq!(versions.latest(id).await.unwrap().id, v2.id);
    }

    #[tokio::test]
    async fn major_bump_resets_minor() {
        let store = Arc::new(InMemoryStore::new());
        let id = lineage_with(&store, "1.3").await;
        let versions = versions_over(&store);

        let next = versions
            .create_version(id, id, ContentSnapshot::default(), "author".into(), VersionBump::Major)
            .await
            .unwrap();
        assert_eq!(next.version_label, "2.0");
    }

    #[tokio::test]
    async fn unknown_lineage_is_not_found() {
        let store = Arc::new(InMemoryStore::new());
        let versions = versions_over(&store);
        let missing = QuestionId::new();

        let err = versions
            .create_version(missing, missing, ContentSnapshot::default(), "author".into(), VersionBump::Minor)
            .await
            .unwrap_err();
        assert_eq!(err, WorkflowError::QuestionNotFound(missing));
        assert_eq!(versions.latest(missing).await.unwrap_err(), WorkflowError::QuestionNotFound(missing));
        assert!(versions.versions(missing).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_label_is_fatal_and_writes_nothing() {
        let store = Arc::new(InMemoryStore::new());
        let id = lineage_with(&store, "one.zero").await;
        let versions = versions_over(&store);

        let err = versions
            .create_version(id, id, ContentSnapshot::default(), "author".into(), VersionBump::Minor)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::CorruptVersionLabel { ref label, .. } if label == "one.zero"
        ));
        assert!(!err.is_retryable());
        assert_eq!(versions.versions(id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn second_claim_on_lineage_conflicts() {
        let store = Arc::new(InMemoryStore::new());
        let id = lineage_with(&store, "1.0").await;
        let versions = versions_over(&store);

        let first = versions
            .prepare(id, id, ContentSnapshot::default(), "a".into(), VersionBump::Minor)
            .await
            .unwrap();
        let second = versions
            .prepare(id, id, ContentSnapshot::default(), "b".into(), VersionBump::Minor)
            .await;
        assert_eq!(second.unwrap_err(), WorkflowError::ConcurrentVersionConflict(id));

        drop(first);
        assert!(versions
            .prepare(id, id, ContentSnapshot::default(), "b".into(), VersionBump::Minor)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn stale_prepared_version_fails_commit() {
        let store = Arc::new(InMemoryStore::new());
        let id = lineage_with(&store, "1.0").await;
        let versions = versions_over(&store);

        let stale = versions
            .prepare(id, id, ContentSnapshot::default(), "a".into(), VersionBump::Minor)
            .await
            .unwrap();
        let v1 = versions.latest(id).await.unwrap();
        assert_eq!(stale.superseded(), v1.id);
        let staged = stale.stage(UnitOfWork::new());
        drop(stale);

        versions
            .create_version(id, id, ContentSnapshot::default(), "b".into(), VersionBump::Minor)
            .await
            .unwrap();

        let err: WorkflowError = store.commit(staged).await.unwrap_err().into();
        assert_eq!(err, WorkflowError::ConcurrentVersionConflict(id));

        let all = versions.versions(id).await.unwrap();
        assert_eq!(all.iter().filter(|v| v.is_latest).count(), 1);
    }

    #[tokio::test]
    async fn reads_are_repeatable() {
        let store = Arc::new(InMemoryStore::new());
        let id = lineage_with(&store, "1.0").await;
        let versions = versions_over(&store);

        let first = versions.versions(id).await.unwrap();
        let second = versions.versions(id).await.unwrap();
        assert_eq!(first, second);

        let v1 = &first[0];
        assert_eq!(&versions.version(v1.id).await.unwrap(), v1);
        let missing = VersionId::new();
        assert_eq!(versions.version(missing).await.unwrap_err(), WorkflowError::VersionNotFound(missing));
    }
}
