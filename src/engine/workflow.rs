//! The workflow orchestrator.

use super::requests::{CreateQuestionRequest, CreateVersionRequest, TransitionRequest};
use crate::config::EngineConfig;
use crate::core::{
    ActorId, History, Question, QuestionId, QuestionVersion, Status, VersionId, WorkflowTransition,
};
use crate::error::WorkflowError;
use crate::guard::ConcurrencyGuard;
use crate::identity::IdentityProvider;
use crate::ledger::HistoryLedger;
use crate::notify::{TransitionNotifier, TransitionOccurred};
use crate::store::{QuestionStore, UnitOfWork};
use crate::validator::{Capability, CapabilitySet, Requirement, TransitionContext, TransitionRules};
use crate::versions::{VersionBump, VersionStore};
use chrono::Utc;
use std::sync::Arc;

/// Executes transitions and version creation as single atomic operations.
///
/// Every mutating operation runs inside the question's critical section and
/// commits one [`UnitOfWork`]. Identity lookup happens before the lock is
/// taken and notification after it is released.
///
/// Share across tasks with `Arc<WorkflowEngine>`. Construct with
/// [`EngineBuilder`](super::EngineBuilder).
pub struct WorkflowEngine {
    pub(super) store: Arc<dyn QuestionStore>,
    pub(super) versions: VersionStore,
    pub(super) ledger: HistoryLedger,
    pub(super) guard: ConcurrencyGuard,
    pub(super) identity: Arc<dyn IdentityProvider>,
    pub(super) notifier: Arc<dyn TransitionNotifier>,
    pub(super) rules: TransitionRules,
    pub(super) config: EngineConfig,
}

impl WorkflowEngine {
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn rules(&self) -> &TransitionRules {
        &self.rules
    }

    /// Move a question to `request.to`.
    ///
    /// On any validation failure nothing is written.
    pub async fn transition(&self, request: TransitionRequest) -> Result<Question, WorkflowError> {
        let TransitionRequest {
            question_id,
            to,
            actor,
            comments,
        } = request;
        let capabilities = self.capabilities(&actor).await?;

        let lease = self.guard.acquire(question_id).await?;
        let question = self.load(question_id).await?;
        let from = question.status;

        let context = TransitionContext {
            from,
            to,
            capabilities,
            is_owner: question.is_owned_by(&actor),
            comments,
        };
        if let Err(violation) = self.rules.validate(&context) {
            tracing::debug!(%question_id, %from, %to, %violation, "Transition rejected");
            return Err(WorkflowError::from_violation(violation, &actor));
        }

        let now = Utc::now();
        let updated = question.with_status(to, now);
        let entry = WorkflowTransition::manual(question_id, from, to, actor, context.comments, now);
        let event = TransitionOccurred::from(&entry);

        self.commit(
            UnitOfWork::new()
                .save_question(updated.clone(), question.revision)
                .append_transition(entry),
        )
        .await?;
        drop(lease);

        tracing::info!(%question_id, %from, %to, actor = %event.actor, "Transition committed");
        self.publish(event);
        Ok(updated)
    }

    /// Spawn a new version of a settled question and reset it to `Draft`.
    ///
    /// Allowed only from `Approved`, `Rejected` or `Archived`.
    pub async fn create_new_version(
        &self,
        request: CreateVersionRequest,
    ) -> Result<Question, WorkflowError> {
        let CreateVersionRequest {
            question_id,
            content,
            actor,
            bump,
        } = request;

        let lease = self.guard.acquire(question_id).await?;
        let question = self.load(question_id).await?;
        let from = question.status;
        if !from.is_settled() {
            return Err(WorkflowError::InvalidState {
                status: from,
                operation: "create a new version",
            });
        }

        let prepared = self
            .versions
            .prepare(question.lineage(), question_id, content, actor.clone(), bump)
            .await?;
        let version = prepared.version();

        let now = Utc::now();
        let updated = question.with_new_version(version.id, now);
        let entry = WorkflowTransition::version_created(
            question_id,
            from,
            version.id,
            actor,
            self.config.version_comment.as_str(),
            now,
        );
        let event = TransitionOccurred::from(&entry);

        let unit = prepared.stage(
            UnitOfWork::new()
                .save_question(updated.clone(), question.revision)
                .append_transition(entry),
        );
        self.commit(unit).await?;
        tracing::info!(
            %question_id,
            lineage = %question.lineage(),
            version_id = %version.id,
            superseded = %prepared.superseded(),
            label = %version.version_label,
            "New version created",
        );
        drop(prepared);
        drop(lease);

        self.publish(event);
        Ok(updated)
    }

    /// Create a question in `Draft`.
    ///
    /// A root question starts its own lineage at `1.0`. A derived question
    /// joins its parent's lineage with a major bump and becomes the lineage's
    /// latest version; the parent must be settled. No ledger entry is written
    /// either way.
    pub async fn create_question(
        &self,
        request: CreateQuestionRequest,
    ) -> Result<Question, WorkflowError> {
        let CreateQuestionRequest {
            content,
            actor,
            derived_from,
        } = request;
        let id = QuestionId::new();
        let now = Utc::now();

        let question = match derived_from {
            None => {
                let version = VersionStore::initial(id, content, actor.clone(), now);
                let question = Question::draft(id, id, version.id, actor, now);
                self.commit(
                    UnitOfWork::new()
                        .insert_question(question.clone())
                        .save_version(version),
                )
                .await?;
                question
            }
            Some(parent_id) => {
                let _lease = self.guard.acquire(parent_id).await?;
                let parent = self.load(parent_id).await?;
                if !parent.status.is_settled() {
                    return Err(WorkflowError::InvalidState {
                        status: parent.status,
                        operation: "derive a question",
                    });
                }
                let lineage = parent.lineage();

                let prepared = self
                    .versions
                    .prepare(lineage, id, content, actor.clone(), VersionBump::Major)
                    .await?;
                let question = Question::draft(id, lineage, prepared.version().id, actor, now);
                self.commit(prepared.stage(UnitOfWork::new().insert_question(question.clone())))
                    .await?;
                tracing::debug!(%parent_id, %lineage, "Question derived from parent");
                question
            }
        };

        tracing::info!(question_id = %question.id, lineage = %question.lineage(), "Question created");
        Ok(question)
    }

    /// Append a `Correction` entry noting a mis-recorded transition.
    ///
    /// The status is unchanged and a non-blank comment is required. With role
    /// gating enabled only administrators may correct the ledger.
    pub async fn record_correction(
        &self,
        question_id: QuestionId,
        actor: ActorId,
        comments: impl Into<String>,
    ) -> Result<WorkflowTransition, WorkflowError> {
        let comments = comments.into();
        let capabilities = self.capabilities(&actor).await?;

        let lease = self.guard.acquire(question_id).await?;
        let question = self.load(question_id).await?;
        let status = question.status;

        if comments.trim().is_empty() {
            return Err(WorkflowError::MissingComment {
                from: status,
                to: status,
            });
        }
        if self.rules.roles_enforced() && !capabilities.contains(Capability::Administrator) {
            return Err(WorkflowError::Unauthorized {
                actor,
                from: status,
                to: status,
                requirement: Requirement::Capability(Capability::Administrator),
            });
        }

        let entry = WorkflowTransition::correction(question_id, status, actor, comments, Utc::now());
        self.ledger.append(entry.clone()).await?;
        drop(lease);

        tracing::info!(%question_id, %status, actor = %entry.actor, "Correction recorded");
        self.publish(TransitionOccurred::from(&entry));
        Ok(entry)
    }

    /// Statuses `actor` may move the question to right now.
    ///
    /// Comment requirements and host checks are not considered.
    pub async fn available_transitions(
        &self,
        question_id: QuestionId,
        actor: &ActorId,
    ) -> Result<Vec<Status>, WorkflowError> {
        let capabilities = self.capabilities(actor).await?;
        let question = self.load(question_id).await?;
        Ok(self
            .rules
            .permitted_targets(question.status, &capabilities, question.is_owned_by(actor)))
    }

    pub async fn question(&self, question_id: QuestionId) -> Result<Question, WorkflowError> {
        self.load(question_id).await
    }

    /// Ledger of a question, newest first.
    pub async fn history(&self, question_id: QuestionId) -> Result<History, WorkflowError> {
        self.load(question_id).await?;
        self.ledger.history(question_id).await
    }

    /// Versions in the question's lineage, newest first.
    pub async fn versions(&self, question_id: QuestionId) -> Result<Vec<QuestionVersion>, WorkflowError> {
        let question = self.load(question_id).await?;
        self.versions.versions(question.lineage()).await
    }

    pub async fn latest_version(&self, question_id: QuestionId) -> Result<QuestionVersion, WorkflowError> {
        let question = self.load(question_id).await?;
        self.versions.latest(question.lineage()).await
    }

    pub async fn version(&self, version_id: VersionId) -> Result<QuestionVersion, WorkflowError> {
        self.versions.version(version_id).await
    }

    async fn load(&self, question_id: QuestionId) -> Result<Question, WorkflowError> {
        self.store
            .load_question(question_id)
            .await?
            .ok_or(WorkflowError::QuestionNotFound(question_id))
    }

    async fn capabilities(&self, actor: &ActorId) -> Result<CapabilitySet, WorkflowError> {
        self.identity.capabilities(actor).await.map_err(|err| {
            tracing::warn!(%actor, error = %err, "Identity lookup failed");
            WorkflowError::IdentityUnavailable(err.to_string())
        })
    }

    async fn commit(&self, unit: UnitOfWork) -> Result<(), WorkflowError> {
        self.store.commit(unit).await.map_err(|err| {
            let err = WorkflowError::from(err);
            match &err {
                WorkflowError::ConcurrentVersionConflict(id) => {
                    tracing::warn!(%id, "Commit lost an optimistic check")
                }
                other => tracing::warn!(error = %other, "Commit failed"),
            }
            err
        })
    }

    fn publish(&self, event: TransitionOccurred) {
        let question_id = event.question_id;
        if let Err(err) = self.notifier.notify(event) {
            tracing::warn!(%question_id, error = %err, "Transition notification failed");
        }
    }
}
