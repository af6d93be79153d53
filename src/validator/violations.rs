//! Violations reported by transition checks.

use super::table::Requirement;
use crate::core::Status;
use thiserror::Error;

/// A reason a transition may not proceed.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Violation {
    #[error("Transition from {from} to {to} is not in the transition table")]
    IllegalEdge { from: Status, to: Status },

    #[error("Transition from {from} to {to} requires a comment")]
    MissingComment { from: Status, to: Status },

    #[error("Transition from {from} to {to} requires {requirement}")]
    MissingCapability {
        from: Status,
        to: Status,
        requirement: Requirement,
    },

    #[error("Custom check failed: {message}")]
    CustomCheckFailed { message: String },
}

impl Violation {
    /// Lower ranks are reported first when several violations accumulate.
    pub fn rank(&self) -> u8 {
        match self {
            Self::IllegalEdge { .. } => 0,
            Self::MissingComment { .. } => 1,
            Self::MissingCapability { .. } => 2,
            Self::CustomCheckFailed { .. } => 3,
        }
    }
}
