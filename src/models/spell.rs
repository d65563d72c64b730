use serde::{Deserialize, Serialize};

use super::{round2, tidy_optional, title_case, validate_name, validate_non_negative, Entity};
use crate::normalize::{DomainFields, FieldDomain, RequirementFields};

pub const SPELL_TYPES: &[&str] = &["Sorcery", "Incantation"];

/// A sorcery or incantation. The same type serves both collections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Spell {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    pub name: String,
    pub image: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub spell_type: Option<String>,
    pub cost: Option<f64>,
    pub slots: Option<f64>,
    pub effects: Option<String>,
    pub requires: Option<RequirementFields>,

    #[serde(default, skip_deserializing)]
    pub efficiency_rating: Option<f64>,
    #[serde(default, skip_deserializing)]
    pub total_requirements: f64,
}

impl Spell {
    pub fn requirement(&self, attribute: &str) -> Option<f64> {
        let req = self.requires.as_ref()?;
        match attribute {
            "intelligence" => req.intelligence,
            "faith" => req.faith,
            "arcane" => req.arcane,
            "strength" => req.strength,
            "dexterity" => req.dexterity,
            _ => None,
        }
    }
}

impl Entity for Spell {
    const COLLECTION: &'static str = "sorceries";
    const LABEL: &'static str = "Spell";
    const DOMAIN_COLUMNS: &'static [(&'static str, FieldDomain)] =
        &[("requires", FieldDomain::Requirement)];
    const NUMERIC_COLUMNS: &'static [&'static str] = &["cost", "slots"];

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn finalize(&mut self) {
        self.name = self.name.trim().to_string();
        tidy_optional(&mut self.spell_type, title_case);

        self.efficiency_rating = match (self.cost, self.slots) {
            (Some(cost), Some(slots)) if cost > 0.0 && slots > 0.0 => Some(round2(cost / slots)),
            _ => None,
        };
        self.total_requirements = self
            .requires
            .as_ref()
            .map_or(0.0, RequirementFields::total);
    }

    fn validate(&self) -> Result<(), String> {
        validate_name(&self.name)?;
        validate_non_negative("cost", self.cost)?;
        if let Some(slots) = self.slots {
            if !(0.0..=10.0).contains(&slots) {
                return Err(format!("slots must be between 0 and 10, got {}", slots));
            }
        }
        if let Some(spell_type) = self.spell_type.as_deref() {
            if !SPELL_TYPES.contains(&spell_type) {
                return Err(format!(
                    "type must be 'Sorcery' or 'Incantation', got '{}'",
                    spell_type
                ));
            }
        }
        if let Some(requires) = &self.requires {
            requires.validate()?;
        }
        Ok(())
    }
}
