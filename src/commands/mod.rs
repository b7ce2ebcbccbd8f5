use anyhow::{Context, Result};
use log::{debug, info};

use crate::{
    config::Config,
    package::{PackageDescriptor, RecipeStore},
    recipes,
    registry::Registry,
    runtime::Runtime,
};

mod check;
mod deps;
mod export;
mod list;
mod show;

pub use check::check;
pub use deps::deps;
pub use export::export;
pub use list::list;
pub use show::show;

/// Build the registry for a command run.
///
/// Recipe files are registered first, in directory priority order, so a
/// recipe directory can replace a built-in recipe of the same name. Two
/// recipe files with the same name are an error. Every recipe is checked
/// against the configured pinning policy.
#[tracing::instrument(skip(runtime, config))]
pub fn load_registry<R: Runtime>(runtime: &R, config: &Config) -> Result<Registry> {
    let store = RecipeStore::new(runtime);
    let mut registry = Registry::new();

    for (path, descriptor) in store.load_all(&config.recipe_dirs)? {
        check_policy(&descriptor, config)
            .with_context(|| format!("Recipe {:?} violates the pinning policy", path))?;
        registry
            .register(descriptor)
            .with_context(|| format!("Failed to register recipe from {:?}", path))?;
    }

    for descriptor in recipes::builtin()? {
        if registry.contains(descriptor.name()) {
            info!(
                "Built-in recipe {} is overridden by a recipe directory",
                descriptor.name()
            );
            continue;
        }
        check_policy(&descriptor, config)?;
        registry.register(descriptor)?;
    }

    debug!("Registry holds {} package(s)", registry.len());
    Ok(registry)
}

fn check_policy(descriptor: &PackageDescriptor, config: &Config) -> Result<()> {
    descriptor.check_policy(config.pinning)?;
    Ok(())
}
