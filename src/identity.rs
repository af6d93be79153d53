//! Identity collaborator.
//!
//! The engine never authenticates anyone. It asks an [`IdentityProvider`] for
//! the capabilities of an already-authenticated actor and feeds them to role
//! gating.

use crate::core::ActorId;
use crate::validator::{Capability, CapabilitySet};
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

/// The identity backend could not answer.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("Identity lookup for '{actor}' failed: {reason}")]
pub struct IdentityError {
    pub actor: ActorId,
    pub reason: String,
}

/// Resolves actors to capability sets.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Capabilities held by `actor`. Unknown actors resolve to an empty set.
    async fn capabilities(&self, actor: &ActorId) -> Result<CapabilitySet, IdentityError>;
}

/// Fixed actor-to-capability mapping.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    actors: HashMap<ActorId, CapabilitySet>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `capability` to `actor`, keeping anything already granted.
    pub fn grant(mut self, actor: impl Into<ActorId>, capability: Capability) -> Self {
        let entry = self.actors.entry(actor.into()).or_default();
        *entry = std::mem::take(entry).with(capability);
        self
    }
}

#[async_trait]
impl IdentityProvider for StaticDirectory {
    async fn capabilities(&self, actor: &ActorId) -> Result<CapabilitySet, IdentityError> {
        Ok(self.actors.get(actor).cloned().unwrap_or_default())
    }
}
