use anyhow::Result;

use crate::{config::Config, registry::Registry, runtime::Runtime};

use super::load_registry;

/// List all known recipes
#[tracing::instrument(skip(runtime, config))]
pub fn list<R: Runtime>(runtime: &R, config: &Config) -> Result<()> {
    let registry = load_registry(runtime, config)?;
    print!("{}", render_list(&registry));
    Ok(())
}

fn render_list(registry: &Registry) -> String {
    if registry.is_empty() {
        return "No recipes found.\n".to_string();
    }
    let mut out = String::new();
    for descriptor in registry.iter() {
        let version = descriptor
            .preferred_version()
            .map(|v| v.label.to_string())
            .unwrap_or_else(|| "(unknown)".to_string());
        out.push_str(&format!("{} {}\n", descriptor.name(), version));
    }
    out
}
