//! Two-part version labels.
//!
//! Labels are stored as text (`"1.0"`, `"1.1"`, `"2.0"`). Parsing is strict:
//! anything that is not two decimal components separated by a single dot is
//! rejected, and the caller treats that as a data-integrity failure.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Which component of the label a new version increments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionBump {
    /// A revision of the same question.
    #[default]
    Minor,
    /// The original question itself is being superseded.
    Major,
}

/// Errors from parsing or advancing a label.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LabelError {
    #[error("Label '{0}' is not of the form major.minor")]
    Malformed(String),

    #[error("Label '{0}' cannot be advanced without overflowing")]
    Overflow(String),
}

/// A parsed `major.minor` label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VersionLabel {
    pub major: u32,
    pub minor: u32,
}

impl VersionLabel {
    /// Label of the first version of a lineage.
    pub const INITIAL: VersionLabel = VersionLabel { major: 1, minor: 0 };

    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Label of the version following this one.
    pub fn next(&self, bump: VersionBump) -> Result<Self, LabelError> {
        let next = match bump {
            VersionBump::Minor => self.minor.checked_add(1).map(|minor| Self::new(self.major, minor)),
            VersionBump::Major => self.major.checked_add(1).map(|major| Self::new(major, 0)),
        };
        next.ok_or_else(|| LabelError::Overflow(self.to_string()))
    }
}

impl fmt::Display for VersionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

fn component(part: &str) -> Option<u32> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

impl FromStr for VersionLabel {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || LabelError::Malformed(s.to_string());
        let (major, minor) = s.split_once('.').ok_or_else(malformed)?;
        let major = component(major).ok_or_else(malformed)?;
        let minor = component(minor).ok_or_else(malformed)?;
        Ok(Self { major, minor })
    }
}
