//! Artifact classification tags.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The classification shared by a group and the artifacts it contains.
///
/// Well-known kinds serialize as SCREAMING_SNAKE_CASE (`"REPORT"`); any other
/// tag is carried verbatim as `Custom`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ArtifactKind {
    Report,
    Data,
    Model,
    Custom(String),
}

/// Returned when a kind tag is empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("artifact kind must not be empty")]
pub struct EmptyKind;

impl ArtifactKind {
    pub fn as_str(&self) -> &str {
        match self {
            ArtifactKind::Report => "REPORT",
            ArtifactKind::Data => "DATA",
            ArtifactKind::Model => "MODEL",
            ArtifactKind::Custom(tag) => tag,
        }
    }

    /// Re-parse the tag so that a directly built `Custom` follows the same
    /// rules as a parsed one: trimmed, non-empty, well-known spellings folded.
    pub fn normalized(&self) -> Result<Self, EmptyKind> {
        match self {
            ArtifactKind::Custom(tag) => tag.parse(),
            known => Ok(known.clone()),
        }
    }

    /// Upper-cased form used as part of identity keys.
    pub(crate) fn canonical(&self) -> String {
        self.as_str().to_ascii_uppercase()
    }
}

impl PartialEq for ArtifactKind {
    fn eq(&self, other: &Self) -> bool {
        self.as_str().eq_ignore_ascii_case(other.as_str())
    }
}

impl Eq for ArtifactKind {}

impl Hash for ArtifactKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.as_str().bytes() {
            b.to_ascii_uppercase().hash(state);
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactKind {
    type Err = EmptyKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        if tag.is_empty() {
            return Err(EmptyKind);
        }
        let kind = match tag.to_ascii_uppercase().as_str() {
            "REPORT" => ArtifactKind::Report,
            "DATA" => ArtifactKind::Data,
            "MODEL" => ArtifactKind::Model,
            _ => ArtifactKind::Custom(tag.to_string()),
        };
        Ok(kind)
    }
}

impl TryFrom<String> for ArtifactKind {
    type Error = EmptyKind;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ArtifactKind> for String {
    fn from(kind: ArtifactKind) -> Self {
        kind.as_str().to_string()
    }
}
