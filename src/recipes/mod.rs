//! Recipes shipped with the crate.

mod ports_of_call;

pub use ports_of_call::ports_of_call;

use crate::error::ValidationError;
use crate::package::PackageDescriptor;

/// All built-in recipes, validated.
pub fn builtin() -> Result<Vec<PackageDescriptor>, ValidationError> {
    Ok(vec![ports_of_call()?])
}
