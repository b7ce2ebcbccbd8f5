//! ports-of-call: performance portability utilities for scientific codes.

use crate::error::ValidationError;
use crate::package::{BuildCapability, PackageDescriptor};

pub const NAME: &str = "ports-of-call";

pub fn ports_of_call() -> Result<PackageDescriptor, ValidationError> {
    PackageDescriptor::builder(NAME)
        .description("ports-of-call")
        .homepage("https://github.com/lanl/ports-of-call")
        .url("https://github.com/lanl/ports-of-call/archive/refs/heads/main.zip")
        .git("git@github.com:lanl/ports-of-call.git")
        .version_branch("main", "main")
        .capability(BuildCapability::CMake)
        .capability(BuildCapability::Cuda)
        .variant("doc", false, "Sphinx Documentation Support")
        .depends_on("cmake@3.12:")
        .depends_on_when("py-sphinx", "+doc")
        .depends_on_when("py-sphinx-rtd-theme@0.4.3", "+doc")
        .depends_on_when("py-sphinx-multiversion", "+doc")
        .build()
}
