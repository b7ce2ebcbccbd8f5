//! Error types for descriptor validation and registry operations.

use thiserror::Error;

/// A descriptor failed validation while being constructed or loaded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Package name must not be empty")]
    EmptyName,

    #[error("Invalid package name '{0}': only lowercase letters, digits, '-', '_' and '.' are allowed")]
    InvalidName(String),

    #[error("Package {package} declares no sources")]
    NoSources { package: String },

    #[error("Package {package} has a {kind} source with an invalid location '{location}'")]
    InvalidSourceLocation {
        package: String,
        kind: String,
        location: String,
    },

    #[error("Package {package} declares no versions")]
    NoVersions { package: String },

    #[error("Invalid version '{label}' in package {package}: {reason}")]
    InvalidVersion {
        package: String,
        label: String,
        reason: String,
    },

    #[error("Package {package} declares version '{label}' more than once")]
    DuplicateVersion { package: String, label: String },

    #[error("Package {package} version '{label}' has an invalid sha256 checksum")]
    InvalidChecksum { package: String, label: String },

    #[error(
        "Package {package} version '{label}' is not pinned to a commit or checksum"
    )]
    UnpinnedVersion { package: String, label: String },

    #[error("Package {package} declares a dependency with an empty name")]
    EmptyDependencyName { package: String },

    #[error("Package {package} declares a dependency with an invalid name '{dependency}'")]
    InvalidDependencyName { package: String, dependency: String },

    #[error("Package {package} declares a variant with an invalid name '{variant}'")]
    InvalidVariantName { package: String, variant: String },

    #[error("Invalid dependency spec '{spec}' in package {package}: {reason}")]
    InvalidDependencySpec {
        package: String,
        spec: String,
        reason: String,
    },

    #[error("Invalid version constraint '{constraint}' for dependency {dependency} of {package}: {reason}")]
    InvalidVersionConstraint {
        package: String,
        dependency: String,
        constraint: String,
        reason: String,
    },

    #[error("Invalid condition '{condition}' in package {package}: {reason}")]
    InvalidCondition {
        package: String,
        condition: String,
        reason: String,
    },

    #[error("Package {package} references undeclared variant '{variant}'")]
    UnknownVariant { package: String, variant: String },
}

/// Errors raised by the descriptor registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Package {0} is already registered")]
    Duplicate(String),

    #[error("No package registered with name: {0}")]
    NotFound(String),
}
