//! The authoritative transition table.
//!
//! Any `(from, to)` pair absent from [`EDGES`] is illegal.

use super::capability::{Capability, CapabilitySet};
use crate::core::Status;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who may traverse an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    Anyone,
    Capability(Capability),
    AdministratorOrOwner,
}

impl Requirement {
    pub fn is_met(&self, capabilities: &CapabilitySet, is_owner: bool) -> bool {
        match self {
            Self::Anyone => true,
            Self::Capability(capability) => capabilities.contains(*capability),
            Self::AdministratorOrOwner => {
                is_owner || capabilities.contains(Capability::Administrator)
            }
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anyone => f.write_str("no capability"),
            Self::Capability(capability) => write!(f, "the {capability} capability"),
            Self::AdministratorOrOwner => f.write_str("the administrator capability or ownership"),
        }
    }
}

/// One legal status edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    pub from: Status,
    pub to: Status,
    pub comment_required: bool,
    pub requirement: Requirement,
}

const fn edge(from: Status, to: Status, comment_required: bool, requirement: Requirement) -> Edge {
    Edge {
        from,
        to,
        comment_required,
        requirement,
    }
}

pub static EDGES: [Edge; 9] = [
    edge(
        Status::Draft,
        Status::Review,
        false,
        Requirement::Capability(Capability::Creator),
    ),
    edge(
        Status::Draft,
        Status::Archived,
        true,
        Requirement::AdministratorOrOwner,
    ),
    edge(
        Status::Review,
        Status::Approved,
        false,
        Requirement::Capability(Capability::Reviewer),
    ),
    edge(
        Status::Review,
        Status::Rejected,
        true,
        Requirement::Capability(Capability::Reviewer),
    ),
    edge(Status::Review, Status::Draft, true, Requirement::Anyone),
    edge(
        Status::Approved,
        Status::Archived,
        true,
        Requirement::AdministratorOrOwner,
    ),
    edge(Status::Rejected, Status::Draft, false, Requirement::Anyone),
    edge(
        Status::Rejected,
        Status::Archived,
        false,
        Requirement::AdministratorOrOwner,
    ),
    edge(Status::Archived, Status::Draft, false, Requirement::Anyone),
];

/// Look up the edge for `(from, to)`.
pub fn find(from: Status, to: Status) -> Option<&'static Edge> {
    EDGES.iter().find(|e| e.from == from && e.to == to)
}

/// Statuses reachable from `from` in one step, ignoring role gating.
pub fn targets(from: Status) -> impl Iterator<Item = Status> {
    EDGES.iter().filter(move |e| e.from == from).map(|e| e.to)
}

/// Structural and role legality of an edge.
pub fn is_allowed(from: Status, to: Status, capabilities: &CapabilitySet, is_owner: bool) -> bool {
    find(from, to).is_some_and(|e| e.requirement.is_met(capabilities, is_owner))
}

/// Whether traversing `(from, to)` needs a non-empty comment.
///
/// Illegal edges report `false`; they are rejected before comments matter.
pub fn requires_comment(from: Status, to: Status) -> bool {
    find(from, to).is_some_and(|e| e.comment_required)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn everyone() -> CapabilitySet {
        CapabilitySet::from([
            Capability::Creator,
            Capability::Reviewer,
            Capability::Administrator,
        ])
    }

    #[test]
    fn table_matches_lifecycle() {
        let draft: Vec<_> = targets(Status::Draft).collect();
        assert_eq!(draft, vec![Status::Review, Status::Archived]);

        let review: Vec<_> = targets(Status::Review).collect();
        assert_eq!(review, vec![Status::Approved, Status::Rejected, Status::Draft]);

        let approved: Vec<_> = targets(Status::Approved).collect();
        assert_eq!(approved, vec![Status::Archived]);

        let rejected: Vec<_> = targets(Status::Rejected).collect();
        assert_eq!(rejected, vec![Status::Draft, Status::Archived]);

        let archived: Vec<_> = targets(Status::Archived).collect();
        assert_eq!(archived, vec![Status::Draft]);
    }

    #[test]
    fn approved_cannot_go_back_to_review() {
        assert!(find(Status::Approved, Status::Review).is_none());
        assert!(!is_allowed(Status::Approved, Status::Review, &everyone(), true));
    }

    #[test]
    fn self_loops_are_illegal() {
        for status in Status::ALL {
            assert!(find(status, status).is_none());
        }
    }

    #[test]
    fn comment_requirements_follow_edges() {
        assert!(requires_comment(Status::Draft, Status::Archived));
        assert!(requires_comment(Status::Review, Status::Rejected));
        assert!(requires_comment(Status::Review, Status::Draft));
        assert!(requires_comment(Status::Approved, Status::Archived));

        assert!(!requires_comment(Status::Draft, Status::Review));
        assert!(!requires_comment(Status::Review, Status::Approved));
        assert!(!requires_comment(Status::Rejected, Status::Draft));
        assert!(!requires_comment(Status::Rejected, Status::Archived));
        assert!(!requires_comment(Status::Archived, Status::Draft));
        assert!(!requires_comment(Status::Approved, Status::Review));
    }

    #[test]
    fn reviewer_gates_decisions() {
        let creator = CapabilitySet::from([Capability::Creator]);
        let reviewer = CapabilitySet::from([Capability::Reviewer]);

        assert!(is_allowed(Status::Review, Status::Approved, &reviewer, false));
        assert!(is_allowed(Status::Review, Status::Rejected, &reviewer, false));
        assert!(!is_allowed(Status::Review, Status::Approved, &creator, true));
        assert!(!is_allowed(Status::Review, Status::Rejected, &creator, true));
    }

    #[test]
    fn creator_gates_submission() {
        let creator = CapabilitySet::from([Capability::Creator]);
        let reviewer = CapabilitySet::from([Capability::Reviewer]);

        assert!(is_allowed(Status::Draft, Status::Review, &creator, false));
        assert!(!is_allowed(Status::Draft, Status::Review, &reviewer, true));
    }

    #[test]
    fn archival_needs_administrator_or_owner() {
        let admin = CapabilitySet::from([Capability::Administrator]);
        let nobody = CapabilitySet::empty();

        assert!(is_allowed(Status::Approved, Status::Archived, &admin, false));
        assert!(is_allowed(Status::Approved, Status::Archived, &nobody, true));
        assert!(!is_allowed(Status::Approved, Status::Archived, &nobody, false));
    }

    #[test]
    fn ungated_edges_accept_unknown_actors() {
        let nobody = CapabilitySet::empty();
        assert!(is_allowed(Status::Review, Status::Draft, &nobody, false));
        assert!(is_allowed(Status::Rejected, Status::Draft, &nobody, false));
        assert!(is_allowed(Status::Archived, Status::Draft, &nobody, false));
    }
}
