use anyhow::Result;
use log::warn;
use std::path::PathBuf;

use crate::{config::Config, package::RecipeStore, runtime::Runtime};

/// Validate recipe files, reporting every failure before returning an error.
#[tracing::instrument(skip(runtime, config))]
pub fn check<R: Runtime>(runtime: &R, config: &Config, files: &[PathBuf]) -> Result<()> {
    let store = RecipeStore::new(runtime);
    let mut failures = 0;

    for path in files {
        let result = store.load(path).and_then(|descriptor| {
            descriptor.check_policy(config.pinning)?;
            Ok(descriptor)
        });
        match result {
            Ok(descriptor) => println!("ok {} ({})", path.display(), descriptor.name()),
            Err(e) => {
                warn!("Recipe {:?} failed validation", path);
                eprintln!("error {}: {:#}", path.display(), e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} recipe(s) failed validation", failures, files.len());
    }
    Ok(())
}
