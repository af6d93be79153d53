//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const ENV_LOCK_TIMEOUT_MS: &str = "QUESTION_WORKFLOW_LOCK_TIMEOUT_MS";
pub const ENV_ENFORCE_ROLES: &str = "QUESTION_WORKFLOW_ENFORCE_ROLES";
pub const ENV_VERSION_COMMENT: &str = "QUESTION_WORKFLOW_VERSION_COMMENT";
pub const ENV_NOTIFY_CAPACITY: &str = "QUESTION_WORKFLOW_NOTIFY_CAPACITY";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Tunables for a [`WorkflowEngine`](crate::engine::WorkflowEngine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Longest wait for a question's lock before `LockTimeout`.
    pub lock_timeout_ms: u64,
    /// Gate transitions on actor capabilities.
    pub enforce_roles: bool,
    /// Comment recorded on the synthetic entry written by a new version.
    pub version_comment: String,
    /// Buffer size of the default broadcast notifier.
    pub notify_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: 5_000,
            enforce_roles: true,
            version_comment: "new version created".to_string(),
            notify_capacity: crate::notify::DEFAULT_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Load from `QUESTION_WORKFLOW_*` environment variables.
    ///
    /// Unset variables keep their defaults; malformed values are an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_LOCK_TIMEOUT_MS) {
            config.lock_timeout_ms = match value.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => ms,
                _ => return Err(invalid(ENV_LOCK_TIMEOUT_MS, value, "a positive integer")),
            };
        }

        if let Some(value) = lookup(ENV_ENFORCE_ROLES) {
            config.enforce_roles = parse_bool(&value)
                .ok_or_else(|| invalid(ENV_ENFORCE_ROLES, value.clone(), "true or false"))?;
        }

        if let Some(value) = lookup(ENV_VERSION_COMMENT) {
            if value.trim().is_empty() {
                return Err(invalid(ENV_VERSION_COMMENT, value, "a non-empty string"));
            }
            config.version_comment = value;
        }

        if let Some(value) = lookup(ENV_NOTIFY_CAPACITY) {
            config.notify_capacity = match value.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(invalid(ENV_NOTIFY_CAPACITY, value, "a positive integer")),
            };
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the invariants `from_lookup` enforces on values that arrived
    /// some other way, such as deserialization or struct literals.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lock_timeout_ms == 0 {
            return Err(invalid(ENV_LOCK_TIMEOUT_MS, "0".to_string(), "a positive integer"));
        }
        if self.notify_capacity == 0 {
            return Err(invalid(ENV_NOTIFY_CAPACITY, "0".to_string(), "a positive integer"));
        }
        if self.version_comment.trim().is_empty() {
            return Err(invalid(
                ENV_VERSION_COMMENT,
                self.version_comment.clone(),
                "a non-empty string",
            ));
        }
        Ok(())
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

fn invalid(var: &'static str, value: String, expected: &'static str) -> ConfigError {
    ConfigError::Invalid {
        var,
        value,
        expected,
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
