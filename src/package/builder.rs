//! Fluent construction of descriptors, mirroring how recipes are written.
//!
//! ```
//! use pkgrecipe::package::{BuildCapability, PackageDescriptor};
//!
//! let descriptor = PackageDescriptor::builder("demo")
//!     .url("https://example.com/demo.zip")
//!     .version_branch("main", "main")
//!     .capability(BuildCapability::CMake)
//!     .variant("doc", false, "Documentation")
//!     .depends_on("cmake@3.12:")
//!     .depends_on_when("py-sphinx", "+doc")
//!     .build()
//!     .unwrap();
//! assert_eq!(descriptor.all_dependencies().len(), 2);
//! ```

use crate::error::ValidationError;

use super::capability::BuildCapability;
use super::condition::Condition;
use super::dependency::{Dependency, DependencySpec};
use super::descriptor::{Manifest, PackageDescriptor, PinningPolicy};
use super::source::Source;
use super::variant::Variant;
use super::version::{VcsRef, VersionConstraint, VersionEntry};

/// Collects recipe declarations and validates them in [`build`](Self::build).
///
/// The first malformed declaration is remembered and reported by `build`.
#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    manifest: Manifest,
    policy: PinningPolicy,
    error: Option<ValidationError>,
}

impl DescriptorBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        DescriptorBuilder {
            manifest: Manifest {
                name: name.into(),
                ..Default::default()
            },
            policy: PinningPolicy::Allow,
            error: None,
        }
    }

    fn fail(&mut self, error: ValidationError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.manifest.description = description.into();
        self
    }

    pub fn homepage(mut self, homepage: impl Into<String>) -> Self {
        self.manifest.homepage = homepage.into();
        self
    }

    /// Archive download location.
    pub fn url(self, location: impl Into<String>) -> Self {
        self.source(Source::archive(location))
    }

    /// Version-control remote.
    pub fn git(self, location: impl Into<String>) -> Self {
        self.source(Source::vcs(location))
    }

    pub fn source(mut self, source: Source) -> Self {
        self.manifest.sources.push(source);
        self
    }

    fn push_version(mut self, label: &str, reference: Option<VcsRef>, sha256: Option<String>) -> Self {
        match label.parse() {
            Ok(label) => self.manifest.versions.push(VersionEntry {
                label,
                reference,
                sha256,
            }),
            Err(e) => {
                let package = self.manifest.name.clone();
                self.fail(ValidationError::InvalidVersion {
                    package,
                    label: label.to_string(),
                    reason: e.to_string(),
                });
            }
        }
        self
    }

    pub fn version(self, label: &str) -> Self {
        self.push_version(label, None, None)
    }

    /// A version that follows the head of a branch.
    pub fn version_branch(self, label: &str, branch: impl Into<String>) -> Self {
        self.push_version(label, Some(VcsRef::Branch(branch.into())), None)
    }

    pub fn version_tag(self, label: &str, tag: impl Into<String>) -> Self {
        self.push_version(label, Some(VcsRef::Tag(tag.into())), None)
    }

    pub fn version_commit(self, label: &str, commit: impl Into<String>) -> Self {
        self.push_version(label, Some(VcsRef::Commit(commit.into())), None)
    }

    /// A released archive identified by its checksum.
    pub fn version_sha256(self, label: &str, sha256: impl Into<String>) -> Self {
        self.push_version(label, None, Some(sha256.into()))
    }

    pub fn capability(mut self, capability: BuildCapability) -> Self {
        self.manifest.build_capabilities.insert(capability);
        self
    }

    pub fn variant(
        mut self,
        name: impl Into<String>,
        default: bool,
        description: impl Into<String>,
    ) -> Self {
        self.manifest.variants.insert(
            name.into(),
            Variant {
                default,
                description: description.into(),
            },
        );
        self
    }

    pub fn dependency(mut self, dependency: Dependency) -> Self {
        self.manifest.dependencies.push(dependency);
        self
    }

    /// Unconditional dependency in `name@constraint` form.
    pub fn depends_on(self, spec: &str) -> Self {
        self.add_dependency(spec, None)
    }

    /// Dependency active only when `when` (e.g. `+doc`) holds.
    pub fn depends_on_when(self, spec: &str, when: &str) -> Self {
        self.add_dependency(spec, Some(when))
    }

    fn add_dependency(mut self, spec: &str, when: Option<&str>) -> Self {
        let package = self.manifest.name.clone();

        let parsed = match spec.parse::<DependencySpec>() {
            Ok(parsed) => parsed,
            Err(reason) => {
                self.fail(ValidationError::InvalidDependencySpec {
                    package,
                    spec: spec.to_string(),
                    reason,
                });
                return self;
            }
        };

        let version = match parsed.version.as_deref().map(str::parse::<VersionConstraint>) {
            None => None,
            Some(Ok(constraint)) => Some(constraint),
            Some(Err(e)) => {
                self.fail(ValidationError::InvalidVersionConstraint {
                    package,
                    dependency: parsed.package,
                    constraint: parsed.version.unwrap_or_default(),
                    reason: e.to_string(),
                });
                return self;
            }
        };

        let when = match when.map(str::parse::<Condition>) {
            None => None,
            Some(Ok(condition)) => Some(condition),
            Some(Err(reason)) => {
                self.fail(ValidationError::InvalidCondition {
                    package,
                    condition: when.unwrap_or_default().to_string(),
                    reason,
                });
                return self;
            }
        };

        self.manifest.dependencies.push(Dependency {
            package: parsed.package,
            version,
            when,
        });
        self
    }

    pub fn pinning(mut self, policy: PinningPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn build(self) -> Result<PackageDescriptor, ValidationError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        PackageDescriptor::new(self.manifest, self.policy)
    }
}
