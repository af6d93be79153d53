//! Context provided to transition checks.

use super::capability::CapabilitySet;
use crate::core::Status;

/// Everything a check may look at when deciding on a transition.
#[derive(Clone, Debug)]
pub struct TransitionContext {
    pub from: Status,
    pub to: Status,
    pub capabilities: CapabilitySet,
    /// The actor created the question.
    pub is_owner: bool,
    pub comments: Option<String>,
}

impl TransitionContext {
    /// True when a comment with visible content was supplied (pure)
    pub fn has_comment(&self) -> bool {
        self.comments
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(comments: Option<&str>) -> TransitionContext {
        TransitionContext {
            from: Status::Review,
            to: Status::Rejected,
            capabilities: CapabilitySet::empty(),
            is_owner: false,
            comments: comments.map(str::to_string),
        }
    }

    #[test]
    fn blank_comments_do_not_count() {
        assert!(!context(None).has_comment());
        assert!(!context(Some("")).has_comment());
        assert!(!context(Some("  \n\t")).has_comment());
        assert!(context(Some("missing rubric")).has_comment());
    }
}
