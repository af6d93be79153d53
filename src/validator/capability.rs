//! Actor capabilities consumed by role gating.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A resolved capability held by an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Creator,
    Reviewer,
    Administrator,
}

impl Capability {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Creator => "creator",
            Self::Reviewer => "reviewer",
            Self::Administrator => "administrator",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The capabilities an actor holds. Unknown actors hold none.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with(mut self, capability: Capability) -> Self {
        self.0.insert(capability);
        self
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[Capability; N]> for CapabilitySet {
    fn from(capabilities: [Capability; N]) -> Self {
        capabilities.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_and_queries_sets() {
        let set = CapabilitySet::empty()
            .with(Capability::Reviewer)
            .with(Capability::Reviewer);
        assert!(set.contains(Capability::Reviewer));
        assert!(!set.contains(Capability::Creator));
        assert_eq!(set.iter().count(), 1);
        assert!(CapabilitySet::empty().is_empty());
    }

    #[test]
    fn from_array() {
        let set = CapabilitySet::from([Capability::Creator, Capability::Administrator]);
        assert!(set.contains(Capability::Creator));
        assert!(set.contains(Capability::Administrator));
    }

    #[test]
    fn serializes_as_list() {
        let set = CapabilitySet::from([Capability::Reviewer]);
        assert_eq!(serde_json::to_string(&set).unwrap(), "[\"reviewer\"]");
    }
}
