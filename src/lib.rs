pub mod commands;
pub mod config;
pub mod error;
pub mod package;
pub mod recipes;
pub mod registry;
pub mod runtime;

pub use error::{RegistryError, ValidationError};
pub use package::PackageDescriptor;
pub use registry::Registry;
