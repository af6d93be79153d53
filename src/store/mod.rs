//! Persistence collaborator.
//!
//! The engine talks to storage only through [`QuestionStore`]. Reads are
//! plain loads; every write goes through [`QuestionStore::commit`] with a
//! [`UnitOfWork`] that must land completely or not at all. That is what keeps
//! a status change and its ledger entry from ever separating.

mod error;
mod memory;

pub use error::StoreError;
pub use memory::InMemoryStore;

use crate::core::{Question, QuestionId, QuestionVersion, VersionId, WorkflowTransition};
use async_trait::async_trait;

/// How a unit of work writes the question head pointer.
#[derive(Clone, Debug, PartialEq)]
pub enum QuestionWrite {
    /// The question must not exist yet.
    Insert(Question),
    /// The stored question must still be at `expected_revision`.
    Update {
        question: Question,
        expected_revision: u64,
    },
}

/// Moves a lineage's latest flag off `expected_latest`.
#[derive(Clone, Debug, PartialEq)]
pub struct Supersede {
    pub lineage: QuestionId,
    pub expected_latest: VersionId,
}

/// Writes committed atomically by [`QuestionStore::commit`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UnitOfWork {
    pub question: Option<QuestionWrite>,
    pub versions: Vec<QuestionVersion>,
    pub supersede: Option<Supersede>,
    pub transitions: Vec<WorkflowTransition>,
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_question(mut self, question: Question) -> Self {
        self.question = Some(QuestionWrite::Insert(question));
        self
    }

    pub fn save_question(mut self, question: Question, expected_revision: u64) -> Self {
        self.question = Some(QuestionWrite::Update {
            question,
            expected_revision,
        });
        self
    }

    pub fn save_version(mut self, version: QuestionVersion) -> Self {
        self.versions.push(version);
        self
    }

    pub fn supersede_latest(mut self, lineage: QuestionId, expected_latest: VersionId) -> Self {
        self.supersede = Some(Supersede {
            lineage,
            expected_latest,
        });
        self
    }

    pub fn append_transition(mut self, transition: WorkflowTransition) -> Self {
        self.transitions.push(transition);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.question.is_none()
            && self.versions.is_empty()
            && self.supersede.is_none()
            && self.transitions.is_empty()
    }
}

/// Transactional storage for questions, versions and the ledger.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    async fn load_question(&self, id: QuestionId) -> Result<Option<Question>, StoreError>;

    async fn load_version(&self, id: VersionId) -> Result<Option<QuestionVersion>, StoreError>;

    /// All versions of a lineage in creation order. Empty when the lineage
    /// does not exist.
    async fn load_lineage(
        &self,
        original_question_id: QuestionId,
    ) -> Result<Vec<QuestionVersion>, StoreError>;

    /// Ledger entries of a question in commit order.
    async fn load_history(
        &self,
        question_id: QuestionId,
    ) -> Result<Vec<WorkflowTransition>, StoreError>;

    /// Apply every write in `unit`, or none of them.
    async fn commit(&self, unit: UnitOfWork) -> Result<(), StoreError>;
}
