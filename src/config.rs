use anyhow::Result;
use log::debug;
use std::path::PathBuf;

use crate::package::PinningPolicy;
use crate::runtime::Runtime;

/// Extra recipe directories, separated like `PATH`.
pub const PATH_ENV: &str = "PKGRECIPE_PATH";

/// Where recipes are looked up and how strictly they are validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directories scanned for recipe files, in search order.
    /// A package name may appear in only one of them.
    pub recipe_dirs: Vec<PathBuf>,
    pub pinning: PinningPolicy,
}

impl Config {
    /// Merge command-line options with the environment.
    ///
    /// Directories given on the command line come first, then those from
    /// `PKGRECIPE_PATH`. When neither provides any, `<config_dir>/pkgrecipe/packages`
    /// is used. `require_pinned` already folds in `PKGRECIPE_REQUIRE_PINNED`,
    /// which the command line parser reads.
    pub fn new<R: Runtime>(runtime: &R, repos: Vec<PathBuf>, require_pinned: bool) -> Result<Self> {
        let mut recipe_dirs = repos;

        if let Ok(value) = runtime.env_var(PATH_ENV) {
            debug!("Using {}={}", PATH_ENV, value);
            recipe_dirs.extend(std::env::split_paths(&value).filter(|p| !p.as_os_str().is_empty()));
        }

        if recipe_dirs.is_empty()
            && let Some(config_dir) = runtime.config_dir()
        {
            recipe_dirs.push(config_dir.join("pkgrecipe").join("packages"));
        }

        let pinning = if require_pinned {
            PinningPolicy::RequirePinned
        } else {
            PinningPolicy::Allow
        };

        debug!("Recipe directories: {:?}, pinning: {:?}", recipe_dirs, pinning);

        Ok(Self {
            recipe_dirs,
            pinning,
        })
    }
}
