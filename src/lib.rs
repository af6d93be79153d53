//! Question Workflow: lifecycle and versioning engine for assessment questions
//!
//! A question moves through a controlled review process (Draft, Review,
//! Approved or Rejected, Archived). Every status change is validated against a
//! fixed transition table, recorded in an append-only ledger and committed
//! together with the status update. Editing a settled question spawns a new
//! immutable version instead of rewriting the old one.
//!
//! # Core Concepts
//!
//! - **Status**: The closed set of lifecycle states
//! - **Validator**: Pure checks over the transition table, comments and roles
//! - **Versions**: Immutable snapshots grouped into lineages with one latest version
//! - **Ledger**: Append-only history of every transition, newest first on read
//! - **Guard**: Per-question critical sections with a bounded wait
//! - **Engine**: The orchestrator composing all of the above
//!
//! Persistence, identity and notification are collaborators supplied by the
//! host through the [`store::QuestionStore`], [`identity::IdentityProvider`]
//! and [`notify::TransitionNotifier`] traits.
//!
//! # Example
//!
//! ```rust
//! use question_workflow::{
//!     EngineBuilder, InMemoryStore, StaticDirectory, Status, TransitionRequest, WorkflowError,
//! };
//! use question_workflow::engine::CreateQuestionRequest;
//! use question_workflow::validator::Capability;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = EngineBuilder::new()
//!     .store(Arc::new(InMemoryStore::new()))
//!     .identity(Arc::new(StaticDirectory::new().grant("author", Capability::Creator)))
//!     .build()?;
//!
//! let question = engine
//!     .create_question(CreateQuestionRequest::new(Default::default(), "author"))
//!     .await?;
//! let question = engine
//!     .transition(TransitionRequest::new(question.id, Status::Review, "author"))
//!     .await?;
//!
//! let err = engine
//!     .transition(TransitionRequest::new(question.id, Status::Archived, "author"))
//!     .await
//!     .unwrap_err();
//! assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod guard;
pub mod identity;
pub mod ledger;
pub mod notify;
pub mod store;
pub mod validator;
pub mod versions;

// Re-export commonly used types
pub use config::EngineConfig;
pub use core::{ActorId, History, Question, QuestionId, QuestionVersion, Status, WorkflowTransition};
pub use engine::{EngineBuilder, WorkflowEngine};
pub use engine::{CreateQuestionRequest, CreateVersionRequest, TransitionRequest};
pub use error::WorkflowError;
pub use identity::{IdentityProvider, StaticDirectory};
pub use notify::{BroadcastNotifier, TransitionNotifier, TransitionOccurred};
pub use store::{InMemoryStore, QuestionStore};
