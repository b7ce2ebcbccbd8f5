use anyhow::Result;
use log::debug;

use crate::{
    config::Config,
    package::{PackageDescriptor, Requirement, VariantSetting},
    runtime::Runtime,
};

use super::load_registry;

/// Print the dependencies active for the given variant settings
#[tracing::instrument(skip(runtime, config))]
pub fn deps<R: Runtime>(
    runtime: &R,
    config: &Config,
    name: &str,
    settings: &[String],
) -> Result<()> {
    let registry = load_registry(runtime, config)?;
    let descriptor = registry.require(name)?;

    let requirements = active_requirements(descriptor, settings)?;
    if requirements.is_empty() {
        println!("No dependencies.");
    }
    for requirement in requirements {
        println!("{}", requirement);
    }
    Ok(())
}

pub(crate) fn active_requirements(
    descriptor: &PackageDescriptor,
    settings: &[String],
) -> Result<Vec<Requirement>> {
    let settings = settings
        .iter()
        .map(|s| s.parse::<VariantSetting>())
        .collect::<Result<Vec<_>>>()?;
    let state = descriptor.resolve_variants(&settings)?;
    debug!("Resolving dependencies of {} with {}", descriptor.name(), state);
    Ok(descriptor.dependencies(&state))
}
