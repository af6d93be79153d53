//! Append-only history ledger.
//!
//! The ledger has no update or delete. A mis-recorded entry is corrected by
//! appending a `Correction` entry, so a question's ledger only grows.
//! Engine operations stage their entry into the same unit of work as the
//! status change; [`HistoryLedger::append`] commits a lone entry.

use crate::core::{History, QuestionId, WorkflowTransition};
use crate::error::WorkflowError;
use crate::store::{QuestionStore, StoreError, UnitOfWork};
use std::sync::Arc;

/// Read and append access to the ledger.
#[derive(Clone)]
pub struct HistoryLedger {
    store: Arc<dyn QuestionStore>,
}

impl HistoryLedger {
    pub fn new(store: Arc<dyn QuestionStore>) -> Self {
        Self { store }
    }

    /// Commit a single entry.
    pub async fn append(&self, transition: WorkflowTransition) -> Result<(), WorkflowError> {
        let question_id = transition.question_id;
        self.store
            .commit(UnitOfWork::new().append_transition(transition))
            .await
            .map_err(|err| match err {
                StoreError::MissingQuestion(id) => WorkflowError::QuestionNotFound(id),
                other => other.into(),
            })?;
        tracing::debug!(%question_id, "Ledger entry appended");
        Ok(())
    }

    /// Entries for a question, newest first.
    pub async fn history(&self, question_id: QuestionId) -> Result<History, WorkflowError> {
        let entries = self.store.load_history(question_id).await?;
        Ok(History::from_commit_order(entries))
    }

    pub async fn len(&self, question_id: QuestionId) -> Result<usize, WorkflowError> {
        Ok(self.store.load_history(question_id).await?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ActorId, Question, Status, TransitionKind};
    use crate::store::InMemoryStore;
    use crate::versions::VersionStore;
    use chrono::Utc;

    async fn ledger_with_question() -> (HistoryLedger, QuestionId) {
        let store: Arc<dyn QuestionStore> = Arc::new(InMemoryStore::new());
        let id = QuestionId::new();
        let v1 = VersionStore::initial(id, Default::default(), "author".into(), Utc::now());
        let question = Question::draft(id, id, v1.id, "author".into(), Utc::now());
        store
            .commit(UnitOfWork::new().insert_question(question).save_version(v1))
            .await
            .unwrap();
        (HistoryLedger::new(store), id)
    }

    #[tokio::test]
    async fn appended_entries_come_back_newest_first() {
        let (ledger, id) = ledger_with_question().await;
        let actor = ActorId::from("admin");

        ledger
            .append(WorkflowTransition::correction(id, Status::Draft, actor.clone(), "first", Utc::now()))
            .await
            .unwrap();
        ledger
            .append(WorkflowTransition::correction(id, Status::Draft, actor, "second", Utc::now()))
            .await
            .unwrap();

        let history = ledger.history(id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.entries()[0].comments.as_deref(), Some("second"));
        assert_eq!(history.entries()[1].comments.as_deref(), Some("first"));
        assert!(history.entries().iter().all(|t| t.kind == TransitionKind::Correction));
        assert_eq!(ledger.len(id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn append_for_unknown_question_fails() {
        let (ledger, _) = ledger_with_question().await;
        let stranger = QuestionId::new();

        let err = ledger
            .append(WorkflowTransition::correction(
                stranger,
                Status::Draft,
                "admin".into(),
                "note",
                Utc::now(),
            ))
            .await
            .unwrap_err();
        assert_eq!(err, WorkflowError::QuestionNotFound(stranger));
        assert_eq!(ledger.len(stranger).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn history_reads_are_repeatable() {
        let (ledger, id) = ledger_with_question().await;
        ledger
            .append(WorkflowTransition::correction(id, Status::Draft, "admin".into(), "note", Utc::now()))
            .await
            .unwrap();

        let first = ledger.history(id).await.unwrap();
        let second = ledger.history(id).await.unwrap();
        assert_eq!(first, second);
    }
}
