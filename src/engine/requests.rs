//! Inputs to engine operations.

use crate::core::{ActorId, ContentSnapshot, QuestionId, Status};
use crate::versions::VersionBump;
use serde::{Deserialize, Serialize};

/// Move a question to another status.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub question_id: QuestionId,
    pub to: Status,
    pub actor: ActorId,
    #[serde(default)]
    pub comments: Option<String>,
}

impl TransitionRequest {
    pub fn new(question_id: QuestionId, to: Status, actor: impl Into<ActorId>) -> Self {
        Self {
            question_id,
            to,
            actor: actor.into(),
            comments: None,
        }
    }

    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = Some(comments.into());
        self
    }
}

/// Spawn a new version of a settled question.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreateVersionRequest {
    pub question_id: QuestionId,
    pub content: ContentSnapshot,
    pub actor: ActorId,
    #[serde(default)]
    pub bump: VersionBump,
}

impl CreateVersionRequest {
    pub fn new(question_id: QuestionId, content: ContentSnapshot, actor: impl Into<ActorId>) -> Self {
        Self {
            question_id,
            content,
            actor: actor.into(),
            bump: VersionBump::Minor,
        }
    }

    pub fn major(mut self) -> Self {
        self.bump = VersionBump::Major;
        self
    }
}

/// Create a question, either as a new root or derived from an existing one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreateQuestionRequest {
    pub content: ContentSnapshot,
    pub actor: ActorId,
    /// Parent whose lineage the new question joins.
    #[serde(default)]
    pub derived_from: Option<QuestionId>,
}

impl CreateQuestionRequest {
    pub fn new(content: ContentSnapshot, actor: impl Into<ActorId>) -> Self {
        Self {
            content,
            actor: actor.into(),
            derived_from: None,
        }
    }

    pub fn derived_from(mut self, parent: QuestionId) -> Self {
        self.derived_from = Some(parent);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn transition_request_deserializes_without_comments() {
        let id = QuestionId::new();
        let request: TransitionRequest = serde_json::from_value(json!({
            "question_id": id,
            "to": "review",
            "actor": "author",
        }))
        .unwrap();
        assert_eq!(request, TransitionRequest::new(id, Status::Review, "author"));
    }

    #[test]
    fn version_request_defaults_to_minor_bump() {
        let request = CreateVersionRequest::new(QuestionId::new(), json!({}).into(), "author");
        assert_eq!(request.bump, VersionBump::Minor);
        assert_eq!(request.major().bump, VersionBump::Major);
    }
}
