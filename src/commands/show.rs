use anyhow::Result;
use log::debug;
use std::fmt::{self, Write};

use crate::{config::Config, package::PackageDescriptor, runtime::Runtime};

use super::load_registry;

/// Show detailed information about a recipe
#[tracing::instrument(skip(runtime, config))]
pub fn show<R: Runtime>(runtime: &R, config: &Config, name: &str) -> Result<()> {
    debug!("Showing recipe {}", name);
    let registry = load_registry(runtime, config)?;
    let descriptor = registry.require(name)?;
    print!("{}", render_descriptor(descriptor)?);
    Ok(())
}

pub(crate) fn render_descriptor(d: &PackageDescriptor) -> Result<String> {
    let mut out = String::new();
    write_descriptor(&mut out, d)?;
    Ok(out)
}

fn write_descriptor(out: &mut impl Write, d: &PackageDescriptor) -> fmt::Result {
    writeln!(out, "Package: {}", d.name())?;
    if !d.description().is_empty() {
        writeln!(out, "Description: {}", d.description())?;
    }
    if !d.homepage().is_empty() {
        writeln!(out, "Homepage: {}", d.homepage())?;
    }

    writeln!(out, "\nSources:")?;
    for source in d.sources() {
        writeln!(out, "  {}", source)?;
    }

    writeln!(out, "\nVersions:")?;
    let preferred = d.preferred_version().map(|v| &v.label);
    for entry in d.versions() {
        let mut line = format!("  {}", entry.label);
        if let Some(reference) = &entry.reference {
            line.push_str(&format!(" ({})", reference));
        }
        if let Some(sha) = &entry.sha256 {
            line.push_str(&format!(" sha256:{}", sha));
        }
        if Some(&entry.label) == preferred {
            line.push_str(" [preferred]");
        }
        if !entry.is_pinned() {
            line.push_str(" [floating]");
        }
        writeln!(out, "{}", line)?;
    }

    if !d.build_capabilities().is_empty() {
        let caps: Vec<&str> = d.build_capabilities().iter().map(|c| c.as_str()).collect();
        writeln!(out, "\nBuild capabilities: {}", caps.join(", "))?;
    }

    writeln!(out, "\nVariants:")?;
    if d.variant_definitions().is_empty() {
        writeln!(out, "  (none)")?;
    }
    for (name, variant) in d.variant_definitions() {
        writeln!(
            out,
            "  {} [default: {}] {}",
            name, variant.default, variant.description
        )?;
    }

    writeln!(out, "\nDependencies:")?;
    if d.all_dependencies().is_empty() {
        writeln!(out, "  (none)")?;
    }
    for dep in d.all_dependencies() {
        match &dep.when {
            Some(when) => writeln!(out, "  {} when {}", dep.requirement(), when)?,
            None => writeln!(out, "  {}", dep.requirement())?,
        }
    }

    Ok(())
}
