use anyhow::Result;
use glob::Pattern;
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

const RECIPE_FILE_PATTERNS: &[&str] = &["*.json", "*.yaml", "*.yml"];
const PACKAGE_FILE_NAMES: &[&str] = &["package.json", "package.yaml", "package.yml"];

/// Find all recipe files under a recipe directory.
///
/// Two layouts are recognized:
/// - `<root>/<name>.{json,yaml,yml}`
/// - `<root>/<name>/package.{json,yaml,yml}` (first match wins)
///
/// The result is sorted so registration order does not depend on the file system.
#[tracing::instrument(skip(runtime, root))]
pub fn find_all_recipes<R: Runtime>(runtime: &R, root: &Path) -> Result<Vec<PathBuf>> {
    let mut recipes = Vec::new();

    if !runtime.exists(root) {
        return Ok(recipes);
    }

    let patterns = RECIPE_FILE_PATTERNS
        .iter()
        .map(|p| Pattern::new(p))
        .collect::<Result<Vec<_>, _>>()?;

    for entry in runtime.read_dir(root)? {
        if runtime.is_dir(&entry) {
            if let Some(file) = PACKAGE_FILE_NAMES
                .iter()
                .map(|name| entry.join(name))
                .find(|path| runtime.exists(path))
            {
                recipes.push(file);
            }
        } else if let Some(name) = entry.file_name().and_then(|n| n.to_str())
            && patterns.iter().any(|p| p.matches(name))
        {
            recipes.push(entry);
        }
    }

    recipes.sort();
    Ok(recipes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;

    #[test]
    fn test_find_all_recipes_both_layouts() {
        let mut runtime = MockRuntime::new();

        // --- Setup Paths ---
        let root = PathBuf::from("/recipes");
        let package_dir = root.join("ports-of-call"); // /recipes/ports-of-call
        let flat_file = root.join("zlib.yaml"); // /recipes/zlib.yaml
        let readme = root.join("README.md");

        // --- 1. Check Root Exists ---
        runtime
            .expect_exists()
            .with(eq(root.clone()))
            .returning(|_| true);

        // --- 2. Scan Root Directory ---
        runtime
            .expect_read_dir()
            .with(eq(root.clone()))
            .returning(|p| {
                Ok(vec![
                    p.join("zlib.yaml"),
                    p.join("ports-of-call"),
                    p.join("README.md"),
                ])
            });

        runtime
            .expect_is_dir()
            .with(eq(package_dir.clone()))
            .returning(|_| true);
        runtime
            .expect_is_dir()
            .with(eq(flat_file.clone()))
            .returning(|_| false);
        runtime
            .expect_is_dir()
            .with(eq(readme))
            .returning(|_| false);

        // --- 3. Check for package file ---
        runtime
            .expect_exists()
            .with(eq(package_dir.join("package.json")))
            .returning(|_| true);

        // --- Execute & Verify ---
        let recipes = find_all_recipes(&runtime, &root).unwrap();
        assert_eq!(recipes, vec![package_dir.join("package.json"), flat_file]);
    }

    #[test]
    fn test_find_all_recipes_yaml_package_file() {
        let mut runtime = MockRuntime::new();
        let root = PathBuf::from("/recipes");
        let package_dir = root.join("demo");

        runtime
            .expect_exists()
            .with(eq(root.clone()))
            .returning(|_| true);
        runtime
            .expect_read_dir()
            .with(eq(root.clone()))
            .returning(|p| Ok(vec![p.join("demo")]));
        runtime.expect_is_dir().returning(|_| true);

        // package.json is missing, package.yaml exists
        runtime
            .expect_exists()
            .with(eq(package_dir.join("package.json")))
            .returning(|_| false);
        runtime
            .expect_exists()
            .with(eq(package_dir.join("package.yaml")))
            .returning(|_| true);

        let recipes = find_all_recipes(&runtime, &root).unwrap();
        assert_eq!(recipes, vec![package_dir.join("package.yaml")]);
    }

    #[test]
    fn test_find_all_recipes_no_root() {
        let mut runtime = MockRuntime::new();
        let root = PathBuf::from("/non-existent");

        runtime
            .expect_exists()
            .with(eq(root.clone()))
            .returning(|_| false);

        let recipes = find_all_recipes(&runtime, &root).unwrap();
        assert!(recipes.is_empty());
    }

    #[test]
    fn test_find_all_recipes_empty_dir_without_package_file() {
        let mut runtime = MockRuntime::new();
        let root = PathBuf::from("/recipes");

        runtime
            .expect_exists()
            .with(eq(root.clone()))
            .returning(|_| true);
        runtime
            .expect_read_dir()
            .with(eq(root.clone()))
            .returning(|p| Ok(vec![p.join("empty")]));
        runtime.expect_is_dir().returning(|_| true);
        runtime
            .expect_exists()
            .with(mockall::predicate::ne(root.clone()))
            .returning(|_| false);

        let recipes = find_all_recipes(&runtime, &root).unwrap();
        assert!(recipes.is_empty());
    }
}
