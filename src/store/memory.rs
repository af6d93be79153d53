//! In-memory transactional store.
//!
//! All tables sit behind one `RwLock`; a commit validates the whole unit of
//! work under the write lock before applying any of it.

use super::{QuestionStore, QuestionWrite, StoreError, UnitOfWork};
use crate::core::{
    Question, QuestionId, QuestionVersion, TransitionId, VersionId, WorkflowTransition,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Tables {
    questions: HashMap<QuestionId, Question>,
    versions: HashMap<VersionId, QuestionVersion>,
    /// Version ids per lineage, creation order.
    lineages: HashMap<QuestionId, Vec<VersionId>>,
    /// Ledger per question, commit order.
    history: HashMap<QuestionId, Vec<WorkflowTransition>>,
    transition_ids: HashSet<TransitionId>,
}

impl Tables {
    fn latest_of(&self, lineage: QuestionId) -> Option<VersionId> {
        self.lineages.get(&lineage)?.iter().copied().find(|id| {
            self.versions
                .get(id)
                .is_some_and(|version| version.is_latest)
        })
    }

    fn check(&self, unit: &UnitOfWork) -> Result<(), StoreError> {
        let inserting = match &unit.question {
            Some(QuestionWrite::Insert(question)) => {
                if self.questions.contains_key(&question.id) {
                    return Err(StoreError::DuplicateQuestion(question.id));
                }
                Some(question.id)
            }
            Some(QuestionWrite::Update {
                question,
                expected_revision,
            }) => {
                let stored = self
                    .questions
                    .get(&question.id)
                    .ok_or(StoreError::MissingQuestion(question.id))?;
                if stored.revision != *expected_revision {
                    return Err(StoreError::RevisionMismatch {
                        id: question.id,
                        expected: *expected_revision,
                        found: stored.revision,
                    });
                }
                None
            }
            None => None,
        };

        let mut new_versions = HashSet::new();
        for version in &unit.versions {
            if self.versions.contains_key(&version.id) || !new_versions.insert(version.id) {
                return Err(StoreError::DuplicateVersion(version.id));
            }
        }

        if let Some(supersede) = &unit.supersede {
            if self.latest_of(supersede.lineage) != Some(supersede.expected_latest) {
                return Err(StoreError::LatestMoved {
                    lineage: supersede.lineage,
                });
            }
        }

        let mut claimed_lineages = HashSet::new();
        for version in unit.versions.iter().filter(|v| v.is_latest) {
            let lineage = version.original_question_id;
            let superseding = unit
                .supersede
                .as_ref()
                .is_some_and(|s| s.lineage == lineage);
            let occupied = !superseding && self.latest_of(lineage).is_some();
            if occupied || !claimed_lineages.insert(lineage) {
                return Err(StoreError::LatestMoved { lineage });
            }
        }

        let mut new_transitions = HashSet::new();
        for transition in &unit.transitions {
            let known = self.questions.contains_key(&transition.question_id)
                || inserting == Some(transition.question_id);
            if !known {
                return Err(StoreError::MissingQuestion(transition.question_id));
            }
            if self.transition_ids.contains(&transition.id) || !new_transitions.insert(transition.id)
            {
                return Err(StoreError::DuplicateTransition(transition.id));
            }
        }

        Ok(())
    }

    fn apply(&mut self, unit: UnitOfWork) {
        if let Some(supersede) = unit.supersede {
            if let Some(previous) = self.versions.get_mut(&supersede.expected_latest) {
                previous.is_latest = false;
            }
        }

        for version in unit.versions {
            self.lineages
                .entry(version.original_question_id)
                .or_default()
                .push(version.id);
            self.versions.insert(version.id, version);
        }

        match unit.question {
            Some(QuestionWrite::Insert(question)) | Some(QuestionWrite::Update { question, .. }) => {
                self.questions.insert(question.id, question);
            }
            None => {}
        }

        for transition in unit.transitions {
            self.transition_ids.insert(transition.id);
            self.history
                .entry(transition.question_id)
                .or_default()
                .push(transition);
        }
    }
}

/// Store keeping everything in process memory.
///
/// Suitable for tests and for hosts that embed the engine without a database.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }
}

#[async_trait]
impl QuestionStore for InMemoryStore {
    async fn load_question(&self, id: QuestionId) -> Result<Option<Question>, StoreError> {
        Ok(self.read()?.questions.get(&id).cloned())
    }

    async fn load_version(&self, id: VersionId) -> Result<Option<QuestionVersion>, StoreError> {
        Ok(self.read()?.versions.get(&id).cloned())
    }

    async fn load_lineage(
        &self,
        original_question_id: QuestionId,
    ) -> Result<Vec<QuestionVersion>, StoreError> {
        let tables = self.read()?;
        let versions = tables
            .lineages
            .get(&original_question_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| tables.versions.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        Ok(versions)
    }

    async fn load_history(
        &self,
        question_id: QuestionId,
    ) -> Result<Vec<WorkflowTransition>, StoreError> {
        Ok(self
            .read()?
            .history
            .get(&question_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn commit(&self, unit: UnitOfWork) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        tables.check(&unit)?;
        tables.apply(unit);
        Ok(())
    }
}
