use serde::{Deserialize, Serialize};

use super::{round2, tidy_optional, title_case, validate_name, validate_non_negative, Entity};
use crate::normalize::{ArmorDefenseFields, DomainFields, FieldDomain, ResistanceFields};

/// Armor slots as they appear in exported data.
pub const ARMOR_SLOTS: &[&str] = &["Head", "Chest", "Arms", "Legs", "Helm", "Armor", "Gauntlets", "Leg Armor"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Armor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    pub name: String,
    pub image: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub weight: Option<f64>,
    #[serde(rename = "dmgNegation")]
    pub dmg_negation: Option<ArmorDefenseFields>,
    pub resistance: Option<ResistanceFields>,

    #[serde(default, skip_deserializing)]
    pub average_physical_defense: Option<f64>,
    #[serde(default, skip_deserializing)]
    pub average_elemental_defense: Option<f64>,
    #[serde(default, skip_deserializing)]
    pub defense_to_weight_ratio: Option<f64>,
    #[serde(default, skip_deserializing)]
    pub total_resistance: f64,
}

impl Armor {
    pub fn poise(&self) -> Option<f64> {
        self.resistance.as_ref().and_then(|r| r.poise)
    }

    /// First word of the name, used to group armor into sets.
    pub fn set_name(&self) -> Option<&str> {
        self.name.split_whitespace().next()
    }
}

impl Entity for Armor {
    const COLLECTION: &'static str = "armors";
    const LABEL: &'static str = "Armor";
    const DOMAIN_COLUMNS: &'static [(&'static str, FieldDomain)] = &[
        ("dmgNegation", FieldDomain::ArmorDefense),
        ("resistance", FieldDomain::Resistance),
    ];
    const NUMERIC_COLUMNS: &'static [&'static str] = &["weight"];

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn finalize(&mut self) {
        self.name = self.name.trim().to_string();
        tidy_optional(&mut self.category, title_case);

        self.average_physical_defense = self
            .dmg_negation
            .as_ref()
            .and_then(ArmorDefenseFields::average_physical)
            .map(round2);
        self.average_elemental_defense = self
            .dmg_negation
            .as_ref()
            .and_then(ArmorDefenseFields::average_elemental)
            .map(round2);
        self.defense_to_weight_ratio = match (self.weight, self.average_physical_defense) {
            (Some(weight), Some(defense)) if weight > 0.0 && defense > 0.0 => {
                Some(round2(defense / weight))
            }
            _ => None,
        };
        self.total_resistance = self
            .resistance
            .as_ref()
            .map_or(0.0, ResistanceFields::total);
    }

    fn validate(&self) -> Result<(), String> {
        validate_name(&self.name)?;
        validate_non_negative("weight", self.weight)?;
        if let Some(negation) = &self.dmg_negation {
            negation.validate()?;
        }
        if let Some(resistance) = &self.resistance {
            resistance.validate()?;
        }
        Ok(())
    }
}
