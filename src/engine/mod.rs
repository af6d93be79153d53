//! Workflow engine.
//!
//! The engine composes the validator, version store, ledger and concurrency
//! guard. A transition resolves the actor's capabilities, takes the
//! question's lock, validates the requested edge and commits the status change
//! together with its ledger entry. Version creation follows the same shape and
//! additionally moves the lineage's latest flag.
//!
//! # Example
//!
//! ```rust
//! use question_workflow::engine::{
//!     CreateQuestionRequest, CreateVersionRequest, EngineBuilder, TransitionRequest,
//! };
//! use question_workflow::identity::StaticDirectory;
//! use question_workflow::store::InMemoryStore;
//! use question_workflow::validator::Capability;
//! use question_workflow::core::Status;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let directory = StaticDirectory::new()
//!     .grant("author", Capability::Creator)
//!     .grant("lead", Capability::Reviewer);
//! let engine = EngineBuilder::new()
//!     .store(Arc::new(InMemoryStore::new()))
//!     .identity(Arc::new(directory))
//!     .build()?;
//!
//! let question = engine
//!     .create_question(CreateQuestionRequest::new(json!({"title": "Q1"}).into(), "author"))
//!     .await?;
//! engine
//!     .transition(TransitionRequest::new(question.id, Status::Review, "author"))
//!     .await?;
//! engine
//!     .transition(TransitionRequest::new(question.id, Status::Approved, "lead"))
//!     .await?;
//!
//! let revised = engine
//!     .create_new_version(CreateVersionRequest::new(
//!         question.id,
//!         json!({"title": "Q1, reworded"}).into(),
//!         "author",
//!     ))
//!     .await?;
//! assert_eq!(revised.status, Status::Draft);
//! assert_eq!(engine.latest_version(question.id).await?.version_label, "1.1");
//! assert_eq!(engine.history(question.id).await?.len(), 3);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod error;
pub mod requests;
mod workflow;

pub use builder::EngineBuilder;
pub use error::BuildError;
pub use requests::{CreateQuestionRequest, CreateVersionRequest, TransitionRequest};
pub use workflow::WorkflowEngine;
