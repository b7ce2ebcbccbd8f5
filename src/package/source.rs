//! Source locations a recipe can be fetched from.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Source kind identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// A downloadable archive (zip, tarball)
    Archive,
    /// A version-control remote
    Vcs,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Archive => write!(f, "archive"),
            SourceKind::Vcs => write!(f, "vcs"),
        }
    }
}

impl FromStr for SourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "archive" | "url" => Ok(SourceKind::Archive),
            "vcs" | "git" => Ok(SourceKind::Vcs),
            _ => anyhow::bail!("Unknown source kind: {}. Expected archive or vcs.", s),
        }
    }
}

/// A place the package sources can be retrieved from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Source {
    pub kind: SourceKind,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl Source {
    pub fn archive(location: impl Into<String>) -> Self {
        Source {
            kind: SourceKind::Archive,
            location: location.into(),
            reference: None,
        }
    }

    pub fn vcs(location: impl Into<String>) -> Self {
        Source {
            kind: SourceKind::Vcs,
            location: location.into(),
            reference: None,
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Locations must be non-empty and contain no whitespace. Both URLs and
    /// scp-style remotes (`git@host:path`) are accepted.
    pub fn has_valid_location(&self) -> bool {
        !self.location.is_empty() && !self.location.chars().any(char::is_whitespace)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.location)?;
        if let Some(reference) = &self.reference {
            write!(f, " ({})", reference)?;
        }
        Ok(())
    }
}
