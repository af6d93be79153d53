//! Core domain types.
//!
//! This module holds the plain data the rest of the engine works on:
//! - the closed [`Status`] enumeration
//! - question head pointers and immutable versions
//! - ledger entries and the [`History`] read view
//!
//! Everything here is pure; persistence and locking live elsewhere.

mod history;
mod ids;
mod question;
mod status;

pub use history::{History, TransitionKind, WorkflowTransition};
pub use ids::{ActorId, QuestionId, TransitionId, VersionId};
pub use question::{ContentSnapshot, Question, QuestionVersion};
pub use status::{Status, UnknownStatus};
