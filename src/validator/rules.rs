//! Transition rules evaluated with `Validation`.

use super::capability::CapabilitySet;
use super::context::TransitionContext;
use super::table;
use super::violations::Violation;
use crate::core::Status;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Type alias for host-supplied check functions
pub type ValidationCheck =
    Box<dyn Fn(&TransitionContext) -> Validation<(), NonEmptyVec<Violation>> + Send + Sync>;

/// Rules applied to every requested transition.
///
/// An edge missing from the table fails on its own. For a legal edge every
/// remaining check runs and ALL violations are accumulated.
pub struct TransitionRules {
    pub(crate) enforce_roles: bool,
    pub(crate) required_checks: Vec<ValidationCheck>,
}

impl TransitionRules {
    /// Table, comment and role checks.
    pub fn standard() -> Self {
        Self {
            enforce_roles: true,
            required_checks: Vec::new(),
        }
    }

    /// Table and comment checks only; role gating is left to the caller.
    pub fn structural() -> Self {
        Self {
            enforce_roles: false,
            required_checks: Vec::new(),
        }
    }

    pub fn roles_enforced(&self) -> bool {
        self.enforce_roles
    }

    /// Enforce all rules, accumulating every violation.
    pub fn enforce(&self, context: &TransitionContext) -> Validation<(), NonEmptyVec<Violation>> {
        let (from, to) = (context.from, context.to);
        let Some(edge) = table::find(from, to) else {
            return Validation::fail(Violation::IllegalEdge { from, to });
        };

        let mut checks: Vec<Validation<(), NonEmptyVec<Violation>>> = Vec::new();

        let comment = if edge.comment_required && !context.has_comment() {
            Validation::fail(Violation::MissingComment { from, to })
        } else {
            Validation::success(())
        };
        checks.push(comment);

        if self.enforce_roles {
            let role = if edge
                .requirement
                .is_met(&context.capabilities, context.is_owner)
            {
                Validation::success(())
            } else {
                Validation::fail(Violation::MissingCapability {
                    from,
                    to,
                    requirement: edge.requirement,
                })
            };
            checks.push(role);
        }

        for check_fn in &self.required_checks {
            checks.push(check_fn(context));
        }

        Validation::all_vec(checks).map(|_| ())
    }

    /// Enforce all rules and report the highest-ranked violation.
    pub fn validate(&self, context: &TransitionContext) -> Result<(), Violation> {
        match self.enforce(context) {
            Validation::Success(_) => Ok(()),
            Validation::Failure(violations) => match violations.iter().min_by_key(|v| v.rank()) {
                Some(violation) => Err(violation.clone()),
                None => Ok(()),
            },
        }
    }

    /// Targets reachable from `from` by an actor, honoring role gating when
    /// enabled. Comments and host checks are not considered.
    pub fn permitted_targets(
        &self,
        from: Status,
        capabilities: &CapabilitySet,
        is_owner: bool,
    ) -> Vec<Status> {
        table::targets(from)
            .filter(|to| !self.enforce_roles || table::is_allowed(from, *to, capabilities, is_owner))
            .collect()
    }
}

impl Default for TransitionRules {
    fn default() -> Self {
        Self::standard()
    }
}
