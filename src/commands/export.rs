use anyhow::Result;
use std::path::Path;

use crate::{
    config::Config,
    package::{RecipeFormat, RecipeStore},
    runtime::Runtime,
};

use super::load_registry;

/// Serialize a recipe to stdout or to a file.
///
/// When writing to a file the format follows its extension. An existing file
/// is only replaced after confirmation, or when `yes` is set.
#[tracing::instrument(skip(runtime, config))]
pub fn export<R: Runtime>(
    runtime: &R,
    config: &Config,
    name: &str,
    format: RecipeFormat,
    output: Option<&Path>,
    yes: bool,
) -> Result<()> {
    let registry = load_registry(runtime, config)?;
    let descriptor = registry.require(name)?;

    let Some(path) = output else {
        print!("{}", format.serialize(descriptor)?);
        return Ok(());
    };

    if runtime.exists(path)
        && !yes
        && !runtime.confirm(&format!("Overwrite {}?", path.display()))?
    {
        println!("Export cancelled.");
        return Ok(());
    }

    RecipeStore::new(runtime).save(descriptor, path)?;
    println!("Exported {} to {}", descriptor.name(), path.display());
    Ok(())
}
