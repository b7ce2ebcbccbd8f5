//! Boolean build variants and the variant state a host engine builds with.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A user-toggleable boolean build option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Variant {
    pub default: bool,
    pub description: String,
}

/// Snapshot of variant values used to evaluate dependency conditions.
///
/// Variants missing from the state are treated by the descriptor as holding
/// their declared default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantState {
    values: BTreeMap<String, bool>,
}

impl VariantState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a state from declared variant defaults.
    pub fn from_defaults(variants: &BTreeMap<String, Variant>) -> Self {
        VariantState {
            values: variants
                .iter()
                .map(|(name, v)| (name.clone(), v.default))
                .collect(),
        }
    }

    /// Builder-style setter.
    pub fn with(mut self, name: impl Into<String>, value: bool) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: bool) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<bool> {
        self.values.get(name).copied()
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.get(name).unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, bool)> for VariantState {
    fn from_iter<I: IntoIterator<Item = (String, bool)>>(iter: I) -> Self {
        VariantState {
            values: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<&'a VariantSetting> for VariantState {
    fn from_iter<I: IntoIterator<Item = &'a VariantSetting>>(iter: I) -> Self {
        iter.into_iter()
            .map(|s| (s.name.clone(), s.value))
            .collect()
    }
}

impl fmt::Display for VariantState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.values {
            write!(f, "{}{}", if *value { '+' } else { '~' }, name)?;
        }
        Ok(())
    }
}

/// A single variant value as written on a command line: `+doc`, `~doc` or `doc=true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSetting {
    pub name: String,
    pub value: bool,
}

impl VariantSetting {
    pub fn new(name: impl Into<String>, value: bool) -> Self {
        VariantSetting {
            name: name.into(),
            value,
        }
    }
}

pub(crate) fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

pub(crate) fn is_valid_variant_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl FromStr for VariantSetting {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, value) = if let Some(name) = s.strip_prefix('+') {
            (name, true)
        } else if let Some(name) = s.strip_prefix('~') {
            (name, false)
        } else if let Some((name, value)) = s.split_once('=') {
            let value = parse_bool(value).ok_or_else(|| {
                anyhow::anyhow!("Invalid value '{}' for variant {}. Expected true or false.", value, name)
            })?;
            (name, value)
        } else {
            anyhow::bail!(
                "Invalid variant setting '{}'. Expected +name, ~name or name=true|false.",
                s
            )
        };
        if !is_valid_variant_name(name) {
            anyhow::bail!("Invalid variant name '{}'", name);
        }
        Ok(VariantSetting::new(name, value))
    }
}

impl fmt::Display for VariantSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", if self.value { '+' } else { '~' }, self.name)
    }
}
