//! Reading and writing recipe files.
//!
//! Recipes are stored as JSON or YAML; the format follows the file extension.
//! Loading always validates, so a file that parses is a usable descriptor.

use anyhow::{Context, Result};
use log::{debug, info};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::runtime::Runtime;

use super::{PackageDescriptor, find_all_recipes};

/// Serialization format of a recipe file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecipeFormat {
    #[default]
    Json,
    Yaml,
}

impl RecipeFormat {
    /// Pick the format from a file extension (`json`, `yaml`, `yml`).
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_lowercase().as_str() {
            "json" => Some(RecipeFormat::Json),
            "yaml" | "yml" => Some(RecipeFormat::Yaml),
            _ => None,
        }
    }

    pub fn serialize(&self, descriptor: &PackageDescriptor) -> Result<String> {
        match self {
            RecipeFormat::Json => Ok(serde_json::to_string_pretty(descriptor)?),
            RecipeFormat::Yaml => Ok(serde_yaml_ng::to_string(descriptor)?),
        }
    }

    pub fn parse(&self, content: &str) -> Result<PackageDescriptor> {
        match self {
            RecipeFormat::Json => Ok(serde_json::from_str(content)?),
            RecipeFormat::Yaml => Ok(serde_yaml_ng::from_str(content)?),
        }
    }
}

impl fmt::Display for RecipeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipeFormat::Json => write!(f, "json"),
            RecipeFormat::Yaml => write!(f, "yaml"),
        }
    }
}

impl FromStr for RecipeFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(RecipeFormat::Json),
            "yaml" | "yml" => Ok(RecipeFormat::Yaml),
            _ => anyhow::bail!("Unknown recipe format: {}. Expected json or yaml.", s),
        }
    }
}

/// Loads and saves recipe files through a [`Runtime`].
pub struct RecipeStore<'a, R: Runtime> {
    runtime: &'a R,
}

impl<'a, R: Runtime> RecipeStore<'a, R> {
    pub fn new(runtime: &'a R) -> Self {
        Self { runtime }
    }

    /// Load and validate a single recipe file.
    #[tracing::instrument(skip(self))]
    pub fn load(&self, path: &Path) -> Result<PackageDescriptor> {
        let format = RecipeFormat::from_path(path)
            .with_context(|| format!("Unsupported recipe file extension: {:?}", path))?;
        let content = self.runtime.read_to_string(path)?;
        let descriptor = format
            .parse(&content)
            .with_context(|| format!("Failed to load recipe from {:?}", path))?;
        debug!("Loaded recipe {} from {:?}", descriptor.name(), path);
        Ok(descriptor)
    }

    /// Write a recipe, creating the parent directory if needed.
    ///
    /// The format follows the extension of `path`.
    #[tracing::instrument(skip(self, descriptor), fields(package = descriptor.name()))]
    pub fn save(&self, descriptor: &PackageDescriptor, path: &Path) -> Result<()> {
        let format = RecipeFormat::from_path(path)
            .with_context(|| format!("Unsupported recipe file extension: {:?}", path))?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !self.runtime.exists(parent)
        {
            self.runtime.create_dir_all(parent)?;
        }

        let content = format.serialize(descriptor)?;
        self.runtime
            .write(path, content.as_bytes())
            .with_context(|| format!("Failed to save recipe to {:?}", path))?;
        info!("Saved recipe {} to {:?}", descriptor.name(), path);
        Ok(())
    }

    /// Find recipe files in every directory of `roots`, in order.
    pub fn find_all(&self, roots: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for root in roots {
            files.extend(find_all_recipes(self.runtime, root)?);
        }
        Ok(files)
    }

    /// Find and load all recipes. The first invalid recipe aborts loading.
    pub fn load_all(&self, roots: &[PathBuf]) -> Result<Vec<(PathBuf, PackageDescriptor)>> {
        let files = self.find_all(roots)?;
        let mut results = Vec::with_capacity(files.len());
        for path in files {
            let descriptor = self.load(&path)?;
            results.push((path, descriptor));
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipes::ports_of_call;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            RecipeFormat::from_path(Path::new("a/package.json")),
            Some(RecipeFormat::Json)
        );
        assert_eq!(
            RecipeFormat::from_path(Path::new("zlib.YML")),
            Some(RecipeFormat::Yaml)
        );
        assert_eq!(RecipeFormat::from_path(Path::new("package.py")), None);
        assert_eq!(RecipeFormat::from_path(Path::new("package")), None);
    }

    #[test]
    fn test_format_parse_name() {
        assert_eq!("JSON".parse::<RecipeFormat>().unwrap(), RecipeFormat::Json);
        assert_eq!("yml".parse::<RecipeFormat>().unwrap(), RecipeFormat::Yaml);
        assert!("toml".parse::<RecipeFormat>().is_err());
        assert_eq!(RecipeFormat::Yaml.to_string(), "yaml");
    }

    #[test]
    fn test_round_trip_json_and_yaml() {
        let descriptor = ports_of_call().unwrap();
        for format in [RecipeFormat::Json, RecipeFormat::Yaml] {
            let text = format.serialize(&descriptor).unwrap();
            let parsed = format.parse(&text).unwrap();
            assert_eq!(parsed, descriptor, "round trip through {}", format);
            // serializing again is stable
            assert_eq!(format.serialize(&parsed).unwrap(), text);
        }
    }

    #[test]
    fn test_load_valid_recipe() {
        let mut runtime = MockRuntime::new();
        let path = PathBuf::from("/recipes/ports-of-call/package.json");
        let content = RecipeFormat::Json
            .serialize(&ports_of_call().unwrap())
            .unwrap();

        runtime
            .expect_read_to_string()
            .with(eq(path.clone()))
            .returning(move |_| Ok(content.clone()));

        let store = RecipeStore::new(&runtime);
        let descriptor = store.load(&path).unwrap();
        assert_eq!(descriptor.name(), "ports-of-call");
    }

    #[test]
    fn test_load_rejects_undeclared_variant() {
        let mut runtime = MockRuntime::new();
        let path = PathBuf::from("/recipes/bad.yaml");
        let content = r#"
name: bad
sources:
  - kind: archive
    location: https://example.com/bad.zip
versions:
  - label: "1.0"
dependencies:
  - package: py-sphinx
    when:
      type: variant_equals
      variant: doc
      value: true
"#;

        runtime
            .expect_read_to_string()
            .with(eq(path.clone()))
            .returning(move |_| Ok(content.to_string()));

        let store = RecipeStore::new(&runtime);
        let err = store.load(&path).unwrap_err();
        let chain = format!("{:#}", err);
        assert!(chain.contains("Failed to load recipe"));
        assert!(chain.contains("undeclared variant 'doc'"));
    }

    #[test]
    fn test_load_rejects_malformed_constraint() {
        let mut runtime = MockRuntime::new();
        let path = PathBuf::from("/recipes/bad.json");
        let content = r#"{
            "name": "bad",
            "sources": [{"kind": "vcs", "location": "https://example.com/bad.git"}],
            "versions": [{"label": "main", "reference": {"branch": "main"}}],
            "dependencies": [{"package": "cmake", "version": "3.12::"}]
        }"#;

        runtime
            .expect_read_to_string()
            .returning(move |_| Ok(content.to_string()));

        let store = RecipeStore::new(&runtime);
        let err = store.load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("too many ':'"));
    }

    #[test]
    fn test_load_unsupported_extension() {
        let runtime = MockRuntime::new();
        let store = RecipeStore::new(&runtime);
        let err = store.load(Path::new("/recipes/package.py")).unwrap_err();
        assert!(err.to_string().contains("Unsupported recipe file extension"));
    }

    #[test]
    fn test_save_creates_parent_dir() {
        let mut runtime = MockRuntime::new();
        let path = PathBuf::from("/out/ports-of-call/package.yaml");
        let parent = PathBuf::from("/out/ports-of-call");

        runtime
            .expect_exists()
            .with(eq(parent.clone()))
            .returning(|_| false);
        runtime
            .expect_create_dir_all()
            .with(eq(parent))
            .times(1)
            .returning(|_| Ok(()));
        runtime
            .expect_write()
            .withf(|p, contents| {
                p == Path::new("/out/ports-of-call/package.yaml")
                    && String::from_utf8_lossy(contents).contains("name: ports-of-call")
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let store = RecipeStore::new(&runtime);
        store.save(&ports_of_call().unwrap(), &path).unwrap();
    }

    #[test]
    fn test_load_all_fails_on_first_invalid() {
        let mut runtime = MockRuntime::new();
        let root = PathBuf::from("/recipes");

        runtime
            .expect_exists()
            .with(eq(root.clone()))
            .returning(|_| true);
        runtime
            .expect_read_dir()
            .with(eq(root.clone()))
            .returning(|p| Ok(vec![p.join("broken.json")]));
        runtime.expect_is_dir().returning(|_| false);
        runtime
            .expect_read_to_string()
            .returning(|_| Ok(r#"{"name": ""}"#.to_string()));

        let store = RecipeStore::new(&runtime);
        let err = store.load_all(&[root]).unwrap_err();
        assert!(format!("{:#}", err).contains("Package name must not be empty"));
    }
}
