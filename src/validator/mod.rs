//! Transition validation.
//!
//! Decides whether a status change is legal. The decision is pure: it looks
//! only at the current and requested status, the actor's resolved
//! capabilities, ownership and the supplied comment.
//!
//! Checks run through Stillwater's `Validation` so that every violation of a
//! legal edge is collected in one pass. Callers that need a single answer use
//! [`TransitionRules::validate`], which reports the highest-ranked violation.
//!
//! # Example
//!
//! ```rust
//! use question_workflow::core::Status;
//! use question_workflow::validator::{
//!     is_allowed, requires_comment, Capability, CapabilitySet, TransitionContext,
//!     TransitionRules, Violation,
//! };
//!
//! let reviewer = CapabilitySet::from([Capability::Reviewer]);
//! assert!(is_allowed(Status::Review, Status::Approved, &reviewer, false));
//! assert!(requires_comment(Status::Review, Status::Rejected));
//!
//! let rules = TransitionRules::standard();
//! let ctx = TransitionContext {
//!     from: Status::Review,
//!     to: Status::Rejected,
//!     capabilities: reviewer,
//!     is_owner: false,
//!     comments: None,
//! };
//! assert!(matches!(rules.validate(&ctx), Err(Violation::MissingComment { .. })));
//! ```

pub mod builder;
pub mod capability;
pub mod context;
pub mod rules;
pub mod table;
pub mod violations;

pub use builder::TransitionRulesBuilder;
pub use capability::{Capability, CapabilitySet};
pub use context::TransitionContext;
pub use rules::TransitionRules;
pub use table::{is_allowed, requires_comment, Edge, Requirement};
pub use violations::Violation;
