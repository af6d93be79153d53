//! Builder for constructing workflow engines.

use super::error::BuildError;
use super::workflow::WorkflowEngine;
use crate::config::EngineConfig;
use crate::guard::ConcurrencyGuard;
use crate::identity::IdentityProvider;
use crate::ledger::HistoryLedger;
use crate::notify::{NoopNotifier, TransitionNotifier};
use crate::store::QuestionStore;
use crate::validator::TransitionRules;
use crate::versions::VersionStore;
use std::sync::Arc;

/// Builder for [`WorkflowEngine`] with a fluent API.
///
/// The store and identity provider are required. Without an explicit rule set
/// the engine uses [`TransitionRules::standard`], or
/// [`TransitionRules::structural`] when `config.enforce_roles` is off.
#[derive(Default)]
pub struct EngineBuilder {
    store: Option<Arc<dyn QuestionStore>>,
    identity: Option<Arc<dyn IdentityProvider>>,
    notifier: Option<Arc<dyn TransitionNotifier>>,
    rules: Option<TransitionRules>,
    config: EngineConfig,
}

impl EngineBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the persistence collaborator (required).
    pub fn store(mut self, store: Arc<dyn QuestionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the identity collaborator (required).
    pub fn identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Receive committed transitions. Defaults to [`NoopNotifier`].
    pub fn notifier(mut self, notifier: Arc<dyn TransitionNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Replace the rule set, overriding `config.enforce_roles`.
    pub fn rules(mut self, rules: TransitionRules) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the engine.
    /// Returns an error if a required collaborator is missing or the
    /// configuration fails [`EngineConfig::validate`].
    pub fn build(self) -> Result<WorkflowEngine, BuildError> {
        let store = self.store.ok_or(BuildError::MissingStore)?;
        let identity = self.identity.ok_or(BuildError::MissingIdentity)?;
        self.config.validate()?;
        let notifier = self
            .notifier
            .unwrap_or_else(|| Arc::new(NoopNotifier) as Arc<dyn TransitionNotifier>);
        let rules = self.rules.unwrap_or_else(|| {
            if self.config.enforce_roles {
                TransitionRules::standard()
            } else {
                TransitionRules::structural()
            }
        });

        Ok(WorkflowEngine {
            versions: VersionStore::new(Arc::clone(&store)),
            ledger: HistoryLedger::new(Arc::clone(&store)),
            guard: ConcurrencyGuard::new(self.config.lock_timeout()),
            store,
            identity,
            notifier,
            rules,
            config: self.config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::StaticDirectory;
    use crate::store::InMemoryStore;
    use std::time::Duration;

    #[test]
    fn builder_validates_required_fields() {
        let result = EngineBuilder::new().build();
        assert!(matches!(result, Err(BuildError::MissingStore)));

        let result = EngineBuilder::new()
            .store(Arc::new(InMemoryStore::new()))
            .build();
        assert!(matches!(result, Err(BuildError::MissingIdentity)));
    }

    #[test]
    fn config_drives_defaults() {
        let config = EngineConfig {
            lock_timeout_ms: 75,
            enforce_roles: false,
            ..EngineConfig::default()
        };
        let engine = EngineBuilder::new()
            .store(Arc::new(InMemoryStore::new()))
            .identity(Arc::new(StaticDirectory::new()))
            .config(config)
            .build()
            .unwrap();

        assert!(!engine.rules().roles_enforced());
        assert_eq!(engine.config().lock_timeout(), Duration::from_millis(75));
    }

    #[test]
    fn explicit_rules_win_over_config() {
        let engine = EngineBuilder::new()
            .store(Arc::new(InMemoryStore::new()))
            .identity(Arc::new(StaticDirectory::new()))
            .config(EngineConfig {
                enforce_roles: false,
                ..EngineConfig::default()
            })
            .rules(TransitionRules::standard())
            .build()
            .unwrap();

        assert!(engine.rules().roles_enforced());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"lock_timeout_ms": 0, "notify_capacity": 0}"#).unwrap();
        let result = EngineBuilder::new()
            .store(Arc::new(InMemoryStore::new()))
            .identity(Arc::new(StaticDirectory::new()))
            .config(config)
            .build();

        assert!(matches!(result, Err(BuildError::InvalidConfig(_))));
    }
}
