//! Build errors for the engine builder.

use crate::config::ConfigError;
use thiserror::Error;

/// Errors that can occur when assembling a [`WorkflowEngine`](super::WorkflowEngine).
#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    #[error("Question store not specified. Call .store(store) before .build()")]
    MissingStore,

    #[error("Identity provider not specified. Call .identity(provider) before .build()")]
    MissingIdentity,

    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}
