//! Package descriptors.
//!
//! This module provides the recipe data model (sources, versions, variants,
//! dependencies and build capabilities), its validation, and loading and
//! saving recipe files.

mod builder;
mod capability;
mod condition;
mod dependency;
mod descriptor;
mod discovery;
mod repository;
mod source;
mod variant;
mod version;

pub use builder::DescriptorBuilder;
pub use capability::BuildCapability;
pub use condition::Condition;
pub use dependency::{Dependency, DependencySpec, Requirement};
pub use descriptor::{Manifest, PackageDescriptor, PinningPolicy};
pub use discovery::find_all_recipes;
pub use repository::{RecipeFormat, RecipeStore};
pub use source::{Source, SourceKind};
pub use variant::{Variant, VariantSetting, VariantState};
pub use version::{
    VcsRef, Version, VersionConstraint, VersionEntry, VersionParseError, VersionRange,
    VersionResolver,
};
