use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::error::ValidationError;

use super::builder::DescriptorBuilder;
use super::capability::BuildCapability;
use super::dependency::{Dependency, Requirement, is_valid_package_name};
use super::source::Source;
use super::variant::{Variant, VariantSetting, VariantState, is_valid_variant_name};
use super::version::{VersionEntry, VersionResolver};

/// Whether versions tracking a moving reference (a branch or tag without a
/// checksum) are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PinningPolicy {
    #[default]
    Allow,
    RequirePinned,
}

/// The plain declarative record of a recipe, as written in recipe files.
///
/// A manifest is not validated; turn it into a [`PackageDescriptor`] to use it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub homepage: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub versions: Vec<VersionEntry>,
    #[serde(default)]
    pub build_capabilities: BTreeSet<BuildCapability>,
    #[serde(default)]
    pub variants: BTreeMap<String, Variant>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

fn is_valid_sha256(s: &str) -> bool {
    s.len() == 64 && s.chars().all(|c| c.is_ascii_hexdigit())
}

impl Manifest {
    #[tracing::instrument(skip(self), fields(package = %self.name))]
    pub fn validate(&self, policy: PinningPolicy) -> Result<(), ValidationError> {
        let package = || self.name.clone();

        if self.name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if !is_valid_package_name(&self.name) {
            return Err(ValidationError::InvalidName(self.name.clone()));
        }

        if self.sources.is_empty() {
            return Err(ValidationError::NoSources { package: package() });
        }
        if let Some(source) = self.sources.iter().find(|s| !s.has_valid_location()) {
            return Err(ValidationError::InvalidSourceLocation {
                package: package(),
                kind: source.kind.to_string(),
                location: source.location.clone(),
            });
        }

        if self.versions.is_empty() {
            return Err(ValidationError::NoVersions { package: package() });
        }
        let mut seen = HashSet::new();
        for entry in &self.versions {
            let label = entry.label.to_string();
            if !seen.insert(&entry.label) {
                return Err(ValidationError::DuplicateVersion {
                    package: package(),
                    label,
                });
            }
            if entry.sha256.as_deref().is_some_and(|s| !is_valid_sha256(s)) {
                return Err(ValidationError::InvalidChecksum {
                    package: package(),
                    label,
                });
            }
            if !entry.is_pinned() {
                match policy {
                    PinningPolicy::RequirePinned => {
                        return Err(ValidationError::UnpinnedVersion {
                            package: package(),
                            label,
                        });
                    }
                    PinningPolicy::Allow => {
                        debug!("{} version {} tracks a floating reference", self.name, label);
                    }
                }
            }
        }

        if let Some(variant) = self.variants.keys().find(|v| !is_valid_variant_name(v)) {
            return Err(ValidationError::InvalidVariantName {
                package: package(),
                variant: variant.clone(),
            });
        }

        for dep in &self.dependencies {
            if dep.package.is_empty() {
                return Err(ValidationError::EmptyDependencyName { package: package() });
            }
            if !is_valid_package_name(&dep.package) {
                return Err(ValidationError::InvalidDependencyName {
                    package: package(),
                    dependency: dep.package.clone(),
                });
            }
            if let Some(range) = dep.version.as_ref().and_then(|v| v.unsatisfiable_range()) {
                return Err(ValidationError::InvalidVersionConstraint {
                    package: package(),
                    dependency: dep.package.clone(),
                    constraint: range.to_string(),
                    reason: "lower bound is above upper bound".to_string(),
                });
            }
            if let Some(when) = &dep.when
                && let Some(variant) = when
                    .referenced_variants()
                    .into_iter()
                    .find(|v| !self.variants.contains_key(*v))
            {
                return Err(ValidationError::UnknownVariant {
                    package: package(),
                    variant: variant.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// A validated, immutable package recipe.
///
/// Construction goes through [`Manifest::validate`], so every descriptor
/// upholds the recipe invariants: non-empty name, at least one source and
/// one version, satisfiable constraints, and conditions that only mention
/// declared variants. Deserializing validates too.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(try_from = "Manifest", into = "Manifest")]
pub struct PackageDescriptor {
    manifest: Manifest,
}

impl TryFrom<Manifest> for PackageDescriptor {
    type Error = ValidationError;

    fn try_from(manifest: Manifest) -> Result<Self, Self::Error> {
        PackageDescriptor::new(manifest, PinningPolicy::Allow)
    }
}

impl From<PackageDescriptor> for Manifest {
    fn from(d: PackageDescriptor) -> Self {
        d.manifest
    }
}

impl PackageDescriptor {
    pub fn new(manifest: Manifest, policy: PinningPolicy) -> Result<Self, ValidationError> {
        manifest.validate(policy)?;
        Ok(PackageDescriptor { manifest })
    }

    pub fn builder(name: impl Into<String>) -> DescriptorBuilder {
        DescriptorBuilder::new(name)
    }

    /// Re-check an already valid descriptor against a stricter policy.
    pub fn check_policy(&self, policy: PinningPolicy) -> Result<(), ValidationError> {
        self.manifest.validate(policy)
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    pub fn description(&self) -> &str {
        &self.manifest.description
    }

    pub fn homepage(&self) -> &str {
        &self.manifest.homepage
    }

    /// Source locations in declaration order. Never empty.
    pub fn sources(&self) -> &[Source] {
        &self.manifest.sources
    }

    /// Known versions in declaration order. Never empty.
    pub fn versions(&self) -> &[VersionEntry] {
        &self.manifest.versions
    }

    /// The version to build when the caller does not ask for one.
    pub fn preferred_version(&self) -> Option<&VersionEntry> {
        VersionResolver::find_preferred(&self.manifest.versions)
    }

    /// True when every version is pinned to a commit or checksum.
    pub fn is_reproducible(&self) -> bool {
        self.manifest.versions.iter().all(VersionEntry::is_pinned)
    }

    pub fn build_capabilities(&self) -> &BTreeSet<BuildCapability> {
        &self.manifest.build_capabilities
    }

    pub fn supports(&self, capability: BuildCapability) -> bool {
        self.manifest.build_capabilities.contains(&capability)
    }

    /// Variant names mapped to their defaults.
    pub fn variants(&self) -> BTreeMap<&str, bool> {
        self.manifest
            .variants
            .iter()
            .map(|(name, v)| (name.as_str(), v.default))
            .collect()
    }

    pub fn variant_definitions(&self) -> &BTreeMap<String, Variant> {
        &self.manifest.variants
    }

    pub fn default_variant_state(&self) -> VariantState {
        VariantState::from_defaults(&self.manifest.variants)
    }

    /// Apply user settings on top of the defaults, rejecting undeclared variants.
    pub fn resolve_variants(
        &self,
        settings: &[VariantSetting],
    ) -> Result<VariantState, ValidationError> {
        let mut state = self.default_variant_state();
        for setting in settings {
            if !self.manifest.variants.contains_key(&setting.name) {
                return Err(ValidationError::UnknownVariant {
                    package: self.manifest.name.clone(),
                    variant: setting.name.clone(),
                });
            }
            state.set(setting.name.clone(), setting.value);
        }
        Ok(state)
    }

    /// Every declared dependency, active or not.
    pub fn all_dependencies(&self) -> &[Dependency] {
        &self.manifest.dependencies
    }

    /// Dependencies active for the given variant values.
    ///
    /// Declared variants missing from `active` take their default; values for
    /// undeclared variants are ignored. Unconditional dependencies are always
    /// included.
    pub fn dependencies(&self, active: &VariantState) -> Vec<Requirement> {
        let mut state = self.default_variant_state();
        for (name, value) in active.iter() {
            if self.manifest.variants.contains_key(name) {
                state.set(name, value);
            }
        }
        self.manifest
            .dependencies
            .iter()
            .filter(|d| d.is_active(&state))
            .map(Dependency::requirement)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::{Condition, VcsRef, Version};

    fn manifest() -> Manifest {
        let mut variants = BTreeMap::new();
        variants.insert(
            "doc".to_string(),
            Variant {
                default: false,
                description: "docs".into(),
            },
        );
        Manifest {
            name: "demo".into(),
            description: "demo package".into(),
            homepage: "https://example.com".into(),
            sources: vec![Source::archive("https://example.com/demo.zip")],
            versions: vec![VersionEntry {
                label: "main".parse().unwrap(),
                reference: Some(VcsRef::Branch("main".into())),
                sha256: None,
            }],
            build_capabilities: BTreeSet::from([BuildCapability::CMake]),
            variants,
            dependencies: vec![
                Dependency::new("cmake").version("3.12:".parse().unwrap()),
                Dependency::new("py-sphinx").when(Condition::enabled("doc")),
            ],
        }
    }

    #[test]
    fn test_valid_manifest() {
        let descriptor = PackageDescriptor::try_from(manifest()).unwrap();
        assert_eq!(descriptor.name(), "demo");
        assert!(descriptor.supports(BuildCapability::CMake));
        assert!(!descriptor.supports(BuildCapability::Cuda));
    }

    #[test]
    fn test_empty_name() {
        let mut m = manifest();
        m.name = String::new();
        assert_eq!(m.validate(PinningPolicy::Allow), Err(ValidationError::EmptyName));
    }

    #[test]
    fn test_invalid_name() {
        let mut m = manifest();
        m.name = "Has Space".into();
        assert!(matches!(
            m.validate(PinningPolicy::Allow),
            Err(ValidationError::InvalidName(_))
        ));
    }

    #[test]
    fn test_no_sources() {
        let mut m = manifest();
        m.sources.clear();
        assert!(matches!(
            m.validate(PinningPolicy::Allow),
            Err(ValidationError::NoSources { .. })
        ));
    }

    #[test]
    fn test_invalid_source_location() {
        let mut m = manifest();
        m.sources.push(Source::vcs(""));
        assert!(matches!(
            m.validate(PinningPolicy::Allow),
            Err(ValidationError::InvalidSourceLocation { .. })
        ));
    }

    #[test]
    fn test_no_versions() {
        let mut m = manifest();
        m.versions.clear();
        assert!(matches!(
            m.validate(PinningPolicy::Allow),
            Err(ValidationError::NoVersions { .. })
        ));
    }

    #[test]
    fn test_duplicate_versions() {
        let mut m = manifest();
        m.versions.push(VersionEntry::new("main".parse().unwrap()));
        assert!(matches!(
            m.validate(PinningPolicy::Allow),
            Err(ValidationError::DuplicateVersion { .. })
        ));
    }

    #[test]
    fn test_invalid_checksum() {
        let mut m = manifest();
        let mut entry = VersionEntry::new("1.0".parse().unwrap());
        entry.sha256 = Some("not-a-hash".into());
        m.versions.push(entry);
        assert!(matches!(
            m.validate(PinningPolicy::Allow),
            Err(ValidationError::InvalidChecksum { .. })
        ));
    }

    #[test]
    fn test_unknown_variant_in_condition() {
        let mut m = manifest();
        m.dependencies
            .push(Dependency::new("cuda").when(Condition::enabled("gpu")));
        let err = m.validate(PinningPolicy::Allow).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownVariant {
                package: "demo".into(),
                variant: "gpu".into()
            }
        );
        assert!(err.to_string().contains("undeclared variant 'gpu'"));
    }

    #[test]
    fn test_unsatisfiable_constraint() {
        let mut m = manifest();
        m.dependencies
            .push(Dependency::new("zlib").version("2.0:1.0".parse().unwrap()));
        assert!(matches!(
            m.validate(PinningPolicy::Allow),
            Err(ValidationError::InvalidVersionConstraint { .. })
        ));
    }

    #[test]
    fn test_pinning_policy() {
        let m = manifest();
        assert!(m.validate(PinningPolicy::Allow).is_ok());
        assert!(matches!(
            m.validate(PinningPolicy::RequirePinned),
            Err(ValidationError::UnpinnedVersion { .. })
        ));

        let mut pinned = manifest();
        pinned.versions[0].reference = Some(VcsRef::Commit("0123abcd".into()));
        assert!(pinned.validate(PinningPolicy::RequirePinned).is_ok());

        let descriptor = PackageDescriptor::new(pinned, PinningPolicy::RequirePinned).unwrap();
        assert!(descriptor.is_reproducible());
    }

    #[test]
    fn test_dependencies_use_defaults() {
        let descriptor = PackageDescriptor::try_from(manifest()).unwrap();

        let names = |state: &VariantState| -> Vec<String> {
            descriptor
                .dependencies(state)
                .into_iter()
                .map(|r| r.package)
                .collect()
        };

        assert_eq!(names(&VariantState::new()), vec!["cmake"]);
        assert_eq!(
            names(&VariantState::new().with("doc", true)),
            vec!["cmake", "py-sphinx"]
        );
        // undeclared variants are ignored
        assert_eq!(names(&VariantState::new().with("gpu", true)), vec!["cmake"]);
    }

    #[test]
    fn test_resolve_variants() {
        let descriptor = PackageDescriptor::try_from(manifest()).unwrap();

        let state = descriptor
            .resolve_variants(&[VariantSetting::new("doc", true)])
            .unwrap();
        assert_eq!(state.get("doc"), Some(true));

        let err = descriptor
            .resolve_variants(&[VariantSetting::new("cuda", true)])
            .unwrap_err();
        assert!(matches!(err, ValidationError::UnknownVariant { .. }));
    }

    #[test]
    fn test_preferred_version() {
        let mut m = manifest();
        m.versions.push(VersionEntry::new("2.0".parse().unwrap()));
        let descriptor = PackageDescriptor::try_from(m).unwrap();
        let preferred: &Version = &descriptor.preferred_version().unwrap().label;
        assert_eq!(preferred.as_str(), "main");
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"{"name": "demo", "versions": [{"label": "1.0"}]}"#;
        let err = serde_json::from_str::<PackageDescriptor>(json).unwrap_err();
        assert!(err.to_string().contains("declares no sources"));
    }

    #[test]
    fn test_invalid_dependency_name() {
        let mut m = manifest();
        m.dependencies.push(Dependency::new("Bad Name!"));
        assert_eq!(
            m.validate(PinningPolicy::Allow),
            Err(ValidationError::InvalidDependencyName {
                package: "demo".into(),
                dependency: "Bad Name!".into()
            })
        );
    }

    #[test]
    fn test_invalid_variant_name() {
        for name in ["", "a b", "+doc"] {
            let mut m = manifest();
            m.variants.insert(
                name.to_string(),
                Variant {
                    default: false,
                    description: String::new(),
                },
            );
            assert!(
                matches!(
                    m.validate(PinningPolicy::Allow),
                    Err(ValidationError::InvalidVariantName { .. })
                ),
                "variant {:?} should be rejected",
                name
            );
        }
    }

    #[test]
    fn test_deserialize_rejects_bad_names() {
        let json = r#"{
            "name": "demo",
            "sources": [{"kind": "archive", "location": "https://example.com/demo.zip"}],
            "versions": [{"label": "1.0"}],
            "dependencies": [{"package": "Bad Name!"}]
        }"#;
        let err = serde_json::from_str::<PackageDescriptor>(json).unwrap_err();
        assert!(err.to_string().contains("invalid name 'Bad Name!'"));

        let json = r#"{
            "name": "demo",
            "sources": [{"kind": "archive", "location": "https://example.com/demo.zip"}],
            "versions": [{"label": "1.0"}],
            "variants": {"a b": {"default": false, "description": ""}}
        }"#;
        let err = serde_json::from_str::<PackageDescriptor>(json).unwrap_err();
        assert!(err.to_string().contains("invalid name 'a b'"));
    }

    #[test]
    fn test_deserialize_rejects_unknown_fields() {
        let base = r#"{
            "name": "demo",
            "sources": [{"kind": "archive", "location": "https://example.com/demo.zip"}],
            "versions": [{"label": "1.0"}]
        }"#;
        assert!(serde_json::from_str::<PackageDescriptor>(base).is_ok());

        let cases = [
            (r#""versions": [{"label": "1.0"}]"#, r#""versions": [{"label": "1.0"}], "dependecies": []"#),
            (r#""location": "https://example.com/demo.zip""#, r#""location": "https://example.com/demo.zip", "branch": "main""#),
            (r#"{"label": "1.0"}"#, r#"{"label": "1.0", "sha": "00"}"#),
            (r#""versions": [{"label": "1.0"}]"#, r#""versions": [{"label": "1.0"}], "dependencies": [{"package": "cmake", "versoin": "3.12:"}]"#),
            (r#""versions": [{"label": "1.0"}]"#, r#""versions": [{"label": "1.0"}], "variants": {"doc": {"default": false, "description": "", "sticky": true}}"#),
        ];
        for (from, to) in cases {
            let json = base.replacen(from, to, 1);
            let err = serde_json::from_str::<PackageDescriptor>(&json).unwrap_err();
            assert!(
                err.to_string().contains("unknown field"),
                "expected unknown field error for {}: {}",
                to,
                err
            );
        }
    }
}
