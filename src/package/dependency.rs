//! Dependency declarations and the requirements they produce.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::condition::Condition;
use super::variant::VariantState;
use super::version::VersionConstraint;

/// A declared dependency on another package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dependency {
    pub package: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<VersionConstraint>,
    /// Absent means the dependency is unconditional
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<Condition>,
}

impl Dependency {
    pub fn new(package: impl Into<String>) -> Self {
        Dependency {
            package: package.into(),
            version: None,
            when: None,
        }
    }

    pub fn version(mut self, constraint: VersionConstraint) -> Self {
        self.version = Some(constraint);
        self
    }

    pub fn when(mut self, condition: Condition) -> Self {
        self.when = Some(condition);
        self
    }

    pub fn is_conditional(&self) -> bool {
        self.when.is_some()
    }

    pub fn is_active(&self, state: &VariantState) -> bool {
        self.when.as_ref().is_none_or(|c| c.evaluate(state))
    }

    pub fn requirement(&self) -> Requirement {
        Requirement {
            package: self.package.clone(),
            version: self.version.clone(),
        }
    }
}

/// What a host engine must provide for an active dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub package: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<VersionConstraint>,
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}@{}", self.package, v),
            None => f.write_str(&self.package),
        }
    }
}

/// The `name@constraint` form used in recipes, e.g. `cmake@3.12:`.
///
/// Only the split is checked here; the constraint text is parsed separately
/// so callers can report it against the owning package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpec {
    pub package: String,
    pub version: Option<String>,
}

pub(crate) fn is_valid_package_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.'))
}

impl FromStr for DependencySpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (package, version) = match s.split_once('@') {
            Some((package, version)) => (package.trim(), Some(version.trim().to_string())),
            None => (s, None),
        };
        if package.is_empty() {
            return Err("missing package name".to_string());
        }
        if !is_valid_package_name(package) {
            return Err(format!("invalid package name '{}'", package));
        }
        Ok(DependencySpec {
            package: package.to_string(),
            version,
        })
    }
}
