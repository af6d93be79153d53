//! The closed set of workflow statuses.
//!
//! Every component refers to [`Status`]; statuses never travel as raw strings
//! or integers inside the engine. The string forms exist only at the
//! serialization boundary and are parsed strictly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Review status of a question.
///
/// # Example
///
/// ```rust
/// use question_workflow::core::Status;
///
/// let status: Status = "review".parse().unwrap();
/// assert_eq!(status, Status::Review);
/// assert!(!status.is_settled());
/// assert!(Status::Approved.is_settled());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Draft,
    Review,
    Approved,
    Rejected,
    Archived,
}

impl Status {
    /// Every status, in lifecycle order.
    pub const ALL: [Status; 5] = [
        Status::Draft,
        Status::Review,
        Status::Approved,
        Status::Rejected,
        Status::Archived,
    ];

    /// Name used for display and logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Review => "Review",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Archived => "Archived",
        }
    }

    /// Lowercase wire form, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Review => "review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Archived => "archived",
        }
    }

    /// A settled status is one a new version may be cut from.
    ///
    /// Drafts and questions under review are still in progress; their content
    /// is edited in place rather than versioned.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected | Self::Archived)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A status string outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for Status {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}
