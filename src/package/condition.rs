//! Conditions under which a dependency is active.
//!
//! A closed predicate algebra over variant state. The recipe shorthand
//! (`+doc`, `~doc`, `doc=true`, `+doc~cuda`) parses into it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::variant::{VariantState, is_valid_variant_name, parse_bool};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// Example: { type = "variant_equals", variant = "doc", value = true }
    VariantEquals { variant: String, value: bool },

    /// Logical NOT operator
    Not { condition: Box<Condition> },

    /// Logical AND operator; empty is true
    And { conditions: Vec<Condition> },

    /// Logical OR operator; empty is false
    Or { conditions: Vec<Condition> },
}

impl Condition {
    pub fn variant_equals(variant: impl Into<String>, value: bool) -> Self {
        Condition::VariantEquals {
            variant: variant.into(),
            value,
        }
    }

    /// `+variant`
    pub fn enabled(variant: impl Into<String>) -> Self {
        Self::variant_equals(variant, true)
    }

    /// `~variant`
    pub fn disabled(variant: impl Into<String>) -> Self {
        Self::variant_equals(variant, false)
    }

    pub fn all(conditions: Vec<Condition>) -> Self {
        Condition::And { conditions }
    }

    pub fn any(conditions: Vec<Condition>) -> Self {
        Condition::Or { conditions }
    }

    pub fn negate(condition: Condition) -> Self {
        Condition::Not {
            condition: Box::new(condition),
        }
    }

    /// Evaluate against a variant snapshot. Variants absent from the
    /// snapshot count as disabled.
    pub fn evaluate(&self, state: &VariantState) -> bool {
        match self {
            Condition::VariantEquals { variant, value } => state.is_enabled(variant) == *value,
            Condition::Not { condition } => !condition.evaluate(state),
            Condition::And { conditions } => conditions.iter().all(|c| c.evaluate(state)),
            Condition::Or { conditions } => conditions.iter().any(|c| c.evaluate(state)),
        }
    }

    /// All variant names this condition mentions, in order of appearance.
    pub fn referenced_variants(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_variants(&mut out);
        out
    }

    fn collect_variants<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Condition::VariantEquals { variant, .. } => out.push(variant),
            Condition::Not { condition } => condition.collect_variants(out),
            Condition::And { conditions } | Condition::Or { conditions } => {
                for c in conditions {
                    c.collect_variants(out);
                }
            }
        }
    }

    fn is_compound(&self) -> bool {
        matches!(self, Condition::And { .. } | Condition::Or { .. })
    }
}

fn parse_term(term: &str, out: &mut Vec<Condition>) -> Result<(), String> {
    if let Some((name, value)) = term.split_once('=') {
        if !is_valid_variant_name(name) {
            return Err(format!("invalid variant name '{}'", name));
        }
        let value = parse_bool(value).ok_or_else(|| format!("invalid value '{}'", value))?;
        out.push(Condition::variant_equals(name, value));
        return Ok(());
    }

    let mut rest = term;
    while !rest.is_empty() {
        let value = match rest.chars().next() {
            Some('+') => true,
            Some('~') => false,
            _ => return Err(format!("expected '+' or '~' before '{}'", rest)),
        };
        rest = &rest[1..];
        let end = rest.find(['+', '~']).unwrap_or(rest.len());
        let name = &rest[..end];
        if !is_valid_variant_name(name) {
            return Err(format!("invalid variant name '{}'", name));
        }
        out.push(Condition::variant_equals(name, value));
        rest = &rest[end..];
    }
    Ok(())
}

impl FromStr for Condition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut terms = Vec::new();
        for chunk in s.split_whitespace() {
            parse_term(chunk, &mut terms)?;
        }
        match terms.len() {
            0 => Err("empty condition".to_string()),
            1 => Ok(terms.remove(0)),
            _ => Ok(Condition::all(terms)),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, conditions: &[Condition], sep: &str) -> fmt::Result {
    for (i, c) in conditions.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        if c.is_compound() {
            write!(f, "({})", c)?;
        } else {
            write!(f, "{}", c)?;
        }
    }
    Ok(())
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::VariantEquals { variant, value } => {
                write!(f, "{}{}", if *value { '+' } else { '~' }, variant)
            }
            Condition::Not { condition } if condition.is_compound() => write!(f, "!({})", condition),
            Condition::Not { condition } => write!(f, "!{}", condition),
            Condition::And { conditions } => write_joined(f, conditions, " & "),
            Condition::Or { conditions } => write_joined(f, conditions, " | "),
        }
    }
}
