use std::fmt;

use serde::{Deserialize, Serialize};

use super::{title_case, validate_name, Entity};
use crate::normalize::{CharacterStats, DomainFields, FieldDomain};

/// Play style implied by a class's highest starting attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Archetype {
    Quality,
    Strength,
    Dexterity,
    Sorcerer,
    Cleric,
    Occult,
    Tank,
    Hybrid,
    #[default]
    Balanced,
}

impl Archetype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Archetype::Quality => "Quality",
            Archetype::Strength => "Strength",
            Archetype::Dexterity => "Dexterity",
            Archetype::Sorcerer => "Sorcerer",
            Archetype::Cleric => "Cleric",
            Archetype::Occult => "Occult",
            Archetype::Tank => "Tank",
            Archetype::Hybrid => "Hybrid",
            Archetype::Balanced => "Balanced",
        }
    }

    /// Derives the archetype from up to three primary stat names.
    pub fn from_primary_stats(primary: &[String]) -> Self {
        let has = |stat: &str| primary.iter().any(|p| p == stat);
        if primary.is_empty() {
            Archetype::Balanced
        } else if has("Strength") && has("Dexterity") {
            Archetype::Quality
        } else if has("Strength") {
            Archetype::Strength
        } else if has("Dexterity") {
            Archetype::Dexterity
        } else if has("Intelligence") {
            Archetype::Sorcerer
        } else if has("Faith") {
            Archetype::Cleric
        } else if has("Arcane") {
            Archetype::Occult
        } else if has("Mind") || has("Vigor") {
            Archetype::Tank
        } else {
            Archetype::Hybrid
        }
    }

    /// Case-insensitive lookup by name.
    pub fn parse(name: &str) -> Option<Self> {
        let wanted = name.trim();
        [
            Archetype::Quality,
            Archetype::Strength,
            Archetype::Dexterity,
            Archetype::Sorcerer,
            Archetype::Cleric,
            Archetype::Occult,
            Archetype::Tank,
            Archetype::Hybrid,
            Archetype::Balanced,
        ]
        .into_iter()
        .find(|a| a.as_str().eq_ignore_ascii_case(wanted))
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterClass {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    pub name: String,
    pub image: Option<String>,
    pub description: Option<String>,
    pub stats: Option<CharacterStats>,

    #[serde(default, skip_deserializing)]
    pub starting_level: Option<f64>,
    #[serde(default, skip_deserializing)]
    pub total_stats: f64,
    #[serde(default, skip_deserializing)]
    pub primary_stats: Vec<String>,
    #[serde(default, skip_deserializing)]
    pub archetype: Archetype,
}

impl CharacterClass {
    pub fn stat(&self, name: &str) -> Option<f64> {
        self.stats.as_ref().and_then(|s| s.get(name))
    }
}

/// The three highest attributes, ties kept in attribute order.
fn primary_stats(stats: &CharacterStats) -> Vec<String> {
    let mut present: Vec<(&str, f64)> = stats
        .attributes()
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect();
    present.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    present
        .into_iter()
        .take(3)
        .map(|(name, _)| name.to_string())
        .collect()
}

impl Entity for CharacterClass {
    const COLLECTION: &'static str = "classes";
    const LABEL: &'static str = "Class";
    const DOMAIN_COLUMNS: &'static [(&'static str, FieldDomain)] =
        &[("stats", FieldDomain::CharacterStats)];

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn finalize(&mut self) {
        self.name = title_case(&self.name);
        self.starting_level = self.stats.as_ref().and_then(|s| s.level);
        self.total_stats = self.stats.as_ref().map_or(0.0, CharacterStats::total);
        self.primary_stats = self.stats.as_ref().map(primary_stats).unwrap_or_default();
        self.archetype = Archetype::from_primary_stats(&self.primary_stats);
    }

    fn validate(&self) -> Result<(), String> {
        validate_name(&self.name)?;
        if let Some(stats) = &self.stats {
            stats.validate()?;
        }
        Ok(())
    }
}
