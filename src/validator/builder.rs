//! Builder API for creating transition rules.

use super::context::TransitionContext;
use super::rules::{TransitionRules, ValidationCheck};
use super::violations::Violation;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Builder for creating transition rules
pub struct TransitionRulesBuilder {
    enforce_roles: bool,
    required_checks: Vec<ValidationCheck>,
}

impl TransitionRulesBuilder {
    pub fn new() -> Self {
        Self {
            enforce_roles: true,
            required_checks: Vec::new(),
        }
    }

    /// Toggle role gating
    pub fn enforce_roles(mut self, enforce: bool) -> Self {
        self.enforce_roles = enforce;
        self
    }

    /// Add a custom validation check
    pub fn require<F>(mut self, check: F) -> Self
    where
        F: Fn(&TransitionContext) -> Validation<(), NonEmptyVec<Violation>> + Send + Sync + 'static,
    {
        self.required_checks.push(Box::new(check));
        self
    }

    /// Add a simple predicate check with error message
    pub fn require_pred<F>(mut self, predicate: F, error_msg: String) -> Self
    where
        F: Fn(&TransitionContext) -> bool + Send + Sync + 'static,
    {
        let check = move |ctx: &TransitionContext| {
            if predicate(ctx) {
                Validation::success(())
            } else {
                Validation::fail(Violation::CustomCheckFailed {
                    message: error_msg.clone(),
                })
            }
        };
        self.required_checks.push(Box::new(check));
        self
    }

    pub fn build(self) -> TransitionRules {
        TransitionRules {
            enforce_roles: self.enforce_roles,
            required_checks: self.required_checks,
        }
    }
}

impl Default for TransitionRulesBuilder {
    fn default() -> Self {
        Self::new()
    }
}
