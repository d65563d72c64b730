//! Entity types served by the query layer.
//!
//! Every entity declares its collection and which of its columns hold canonical fields. The
//! ingestion cleaners and the read-path adapter both take the column list from here.

pub mod armor;
pub mod boss;
pub mod class;
pub mod spell;
pub mod weapon;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::normalize::{ColumnSchema, FieldDomain};

pub use armor::Armor;
pub use boss::{Boss, BossTier};
pub use class::{Archetype, CharacterClass};
pub use spell::Spell;
pub use weapon::Weapon;

/// Maximum length of an entity name.
pub const MAX_NAME_LEN: usize = 200;

/// A document type stored in one collection.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Default collection holding this entity.
    const COLLECTION: &'static str;

    /// Human-readable name used in messages.
    const LABEL: &'static str;

    /// Columns holding composite fields and the domain each normalizes into.
    const DOMAIN_COLUMNS: &'static [(&'static str, FieldDomain)];

    /// Columns holding a list that may be stored as an encoded string.
    const LIST_COLUMNS: &'static [&'static str] = &[];

    /// Scalar columns coerced to numbers.
    const NUMERIC_COLUMNS: &'static [&'static str] = &[];

    /// The column schema shared by ingestion and the read path.
    fn column_schema() -> ColumnSchema {
        ColumnSchema {
            domain_columns: Self::DOMAIN_COLUMNS,
            list_columns: Self::LIST_COLUMNS,
            numeric_columns: Self::NUMERIC_COLUMNS,
        }
    }

    fn id(&self) -> Option<&str>;

    fn name(&self) -> &str;

    /// Tidies scalar fields and computes derived values.
    fn finalize(&mut self) {}

    /// Checks constraints that typing alone cannot express.
    fn validate(&self) -> Result<(), String>;
}

/// Checks the shared name constraint.
pub fn validate_name(name: &str) -> Result<(), String> {
    let length = name.trim().chars().count();
    if length == 0 {
        return Err("name must not be empty".to_string());
    }
    if length > MAX_NAME_LEN {
        return Err(format!(
            "name must be at most {} characters, got {}",
            MAX_NAME_LEN, length
        ));
    }
    Ok(())
}

pub(crate) fn validate_non_negative(field: &str, value: Option<f64>) -> Result<(), String> {
    match value {
        Some(v) if v < 0.0 => Err(format!("{} must be >= 0, got {}", field, v)),
        _ => Ok(()),
    }
}

/// Capitalizes the first letter of every whitespace-separated word.
pub(crate) fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn tidy_optional(value: &mut Option<String>, f: impl Fn(&str) -> String) {
    if let Some(text) = value.as_deref() {
        let tidied = f(text);
        *value = if tidied.is_empty() { None } else { Some(tidied) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        assert!(validate_name("Uchigatana").is_ok());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(201)).is_err());
    }

    #[test]
    fn title_casing() {
        assert_eq!(title_case("  leg  armor "), "Leg Armor");
        assert_eq!(title_case("STORMVEIL castle"), "Stormveil Castle");
    }

    #[test]
    fn rounding() {
        assert_eq!(round2(10.0 / 3.0), 3.33);
    }
}
