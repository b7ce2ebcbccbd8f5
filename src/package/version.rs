//! Versions, version-range constraints and version resolution.
//!
//! Constraint syntax follows the recipe language:
//!
//! - `3.12:` at least 3.12
//! - `:2.0` at most 2.0, including refinements such as 2.0.5
//! - `1.0:2.0` inclusive range
//! - `0.4.3` that version or any refinement of it (0.4.3.1)
//! - `=0.4.3` exactly that version
//! - `:` any version
//! - `1.0:1.4,2.0:` union of the comma separated alternatives

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

/// Branch names that compare above every numbered release, lowest first.
const BRANCH_NAMES: &[&str] = &["stable", "trunk", "head", "master", "main", "develop"];

/// A version string could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct VersionParseError(String);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Segment {
    Number(u64),
    Name(String),
}

impl Segment {
    /// All-digit segments are numbers and must fit in a `u64`.
    fn parse(s: &str) -> Result<Self, VersionParseError> {
        if !s.chars().all(|c| c.is_ascii_digit()) {
            return Ok(Segment::Name(s.to_string()));
        }
        s.parse::<u64>()
            .map(Segment::Number)
            .map_err(|_| VersionParseError(format!("numeric segment '{}' is too large", s)))
    }

    fn branch_rank(&self) -> Option<usize> {
        match self {
            Segment::Name(name) => BRANCH_NAMES.iter().position(|b| b == name),
            Segment::Number(_) => None,
        }
    }
}

impl Ord for Segment {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Segment::Number(a), Segment::Number(b)) => a.cmp(b),
            (Segment::Name(a), Segment::Name(b)) => match (self.branch_rank(), other.branch_rank())
            {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Greater,
                (None, Some(_)) => Ordering::Less,
                (None, None) => a.cmp(b),
            },
            (Segment::Number(_), Segment::Name(_)) => {
                if other.branch_rank().is_some() {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            }
            (Segment::Name(_), Segment::Number(_)) => {
                if self.branch_rank().is_some() {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }
            }
        }
    }
}

impl PartialOrd for Segment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A package version such as `3.12`, `0.4.3` or `main`.
///
/// Segments are separated by `.`, `-` or `_`. Numeric segments compare
/// numerically, other names compare below numbers, and well-known branch
/// names (`main`, `develop`, ...) compare above every number. A version that
/// is a prefix of another is the smaller one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    text: String,
    segments: Vec<Segment>,
}

impl Version {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns true if `self` extends `prefix` with more segments, or equals it.
    pub fn is_refinement_of(&self, prefix: &Version) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Returns true if this version names a tracked branch rather than a release.
    pub fn is_branch(&self) -> bool {
        self.segments.len() == 1 && self.segments[0].branch_rank().is_some()
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.is_empty() {
            return Err(VersionParseError("empty version".into()));
        }
        let mut segments = Vec::new();
        for part in text.split(['.', '-', '_']) {
            if part.is_empty() {
                return Err(VersionParseError(format!(
                    "empty segment in version '{}'",
                    text
                )));
            }
            if !part.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(VersionParseError(format!(
                    "invalid character in version '{}'",
                    text
                )));
            }
            segments.push(Segment::parse(part)?);
        }
        Ok(Version {
            text: text.to_string(),
            segments,
        })
    }
}

impl TryFrom<String> for Version {
    type Error = VersionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(v: Version) -> Self {
        v.text
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.segments.hash(state);
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.segments.cmp(&other.segments)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One alternative of a [`VersionConstraint`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionRange {
    /// `=1.2`
    Exact(Version),
    /// `1.2`, which also admits `1.2.x`
    Refinement(Version),
    /// `lo:hi` with either bound optional
    Between {
        lower: Option<Version>,
        upper: Option<Version>,
    },
}

impl VersionRange {
    pub fn contains(&self, version: &Version) -> bool {
        match self {
            VersionRange::Exact(v) => version == v,
            VersionRange::Refinement(v) => version.is_refinement_of(v),
            VersionRange::Between { lower, upper } => {
                let above = lower.as_ref().is_none_or(|lo| version >= lo);
                let below = upper
                    .as_ref()
                    .is_none_or(|hi| version <= hi || version.is_refinement_of(hi));
                above && below
            }
        }
    }

    /// A range is satisfiable unless its lower bound lies above its upper bound.
    pub fn is_satisfiable(&self) -> bool {
        match self {
            VersionRange::Between {
                lower: Some(lo),
                upper: Some(hi),
            } => lo <= hi || lo.is_refinement_of(hi),
            _ => true,
        }
    }
}

impl FromStr for VersionRange {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(VersionParseError("empty version range".into()));
        }
        if let Some(exact) = s.strip_prefix('=') {
            return Ok(VersionRange::Exact(exact.parse()?));
        }
        match s.split_once(':') {
            None => Ok(VersionRange::Refinement(s.parse()?)),
            Some((lo, hi)) => {
                if hi.contains(':') {
                    return Err(VersionParseError(format!(
                        "too many ':' in version range '{}'",
                        s
                    )));
                }
                let bound = |b: &str| -> Result<Option<Version>, VersionParseError> {
                    let b = b.trim();
                    if b.is_empty() {
                        Ok(None)
                    } else {
                        b.parse().map(Some)
                    }
                };
                Ok(VersionRange::Between {
                    lower: bound(lo)?,
                    upper: bound(hi)?,
                })
            }
        }
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionRange::Exact(v) => write!(f, "={}", v),
            VersionRange::Refinement(v) => write!(f, "{}", v),
            VersionRange::Between { lower, upper } => {
                if let Some(lo) = lower {
                    write!(f, "{}", lo)?;
                }
                f.write_str(":")?;
                if let Some(hi) = upper {
                    write!(f, "{}", hi)?;
                }
                Ok(())
            }
        }
    }
}

/// A union of version ranges restricting acceptable versions of a dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionConstraint {
    ranges: Vec<VersionRange>,
}

impl VersionConstraint {
    /// Constraint accepting every version (`:`).
    pub fn any() -> Self {
        VersionConstraint {
            ranges: vec![VersionRange::Between {
                lower: None,
                upper: None,
            }],
        }
    }

    /// Constraint of the form `min:`.
    pub fn at_least(min: Version) -> Self {
        VersionConstraint {
            ranges: vec![VersionRange::Between {
                lower: Some(min),
                upper: None,
            }],
        }
    }

    pub fn ranges(&self) -> &[VersionRange] {
        &self.ranges
    }

    pub fn satisfies(&self, version: &Version) -> bool {
        self.ranges.iter().any(|r| r.contains(version))
    }

    /// Returns the first alternative that can never match, if any.
    pub fn unsatisfiable_range(&self) -> Option<&VersionRange> {
        self.ranges.iter().find(|r| !r.is_satisfiable())
    }

    pub fn is_satisfiable(&self) -> bool {
        self.unsatisfiable_range().is_none()
    }
}

impl FromStr for VersionConstraint {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(VersionParseError("empty version constraint".into()));
        }
        let ranges = s
            .split(',')
            .map(str::parse)
            .collect::<Result<Vec<VersionRange>, _>>()?;
        Ok(VersionConstraint { ranges })
    }
}

impl TryFrom<String> for VersionConstraint {
    type Error = VersionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VersionConstraint> for String {
    fn from(c: VersionConstraint) -> Self {
        c.to_string()
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, range) in self.ranges.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", range)?;
        }
        Ok(())
    }
}

/// Where a tracked version comes from in the version-control source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VcsRef {
    Branch(String),
    Tag(String),
    Commit(String),
}

impl fmt::Display for VcsRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VcsRef::Branch(b) => write!(f, "branch {}", b),
            VcsRef::Tag(t) => write!(f, "tag {}", t),
            VcsRef::Commit(c) => write!(f, "commit {}", c),
        }
    }
}

/// A version a recipe knows how to build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VersionEntry {
    pub label: Version,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<VcsRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl VersionEntry {
    pub fn new(label: Version) -> Self {
        VersionEntry {
            label,
            reference: None,
            sha256: None,
        }
    }

    /// A version is pinned when it names a commit or carries a checksum.
    /// Branches and tags can move underneath the recipe.
    pub fn is_pinned(&self) -> bool {
        self.sha256.is_some() || matches!(self.reference, Some(VcsRef::Commit(_)))
    }
}

/// Version resolver - pure functions over a recipe's version list.
pub struct VersionResolver;

impl VersionResolver {
    /// Resolve a constraint to the highest entry satisfying it.
    pub fn resolve<'a>(
        entries: &'a [VersionEntry],
        constraint: &VersionConstraint,
    ) -> Option<&'a VersionEntry> {
        entries
            .iter()
            .filter(|e| constraint.satisfies(&e.label))
            .max_by(|a, b| a.label.cmp(&b.label))
    }

    /// The entry a host engine should build when nothing else is requested.
    pub fn find_preferred(entries: &[VersionEntry]) -> Option<&VersionEntry> {
        entries.iter().max_by(|a, b| a.label.cmp(&b.label))
    }
}
