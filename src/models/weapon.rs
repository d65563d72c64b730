use serde::{Deserialize, Serialize};

use super::{round2, tidy_optional, title_case, validate_name, validate_non_negative, Entity};
use crate::normalize::{
    AttackFields, DomainFields, FieldDomain, GuardFields, RequirementFields, ScalingFields,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    pub name: String,
    pub image: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub weight: Option<f64>,
    pub attack: Option<AttackFields>,
    pub defence: Option<GuardFields>,
    #[serde(rename = "scalesWith")]
    pub scales_with: Option<ScalingFields>,
    #[serde(rename = "requiredAttributes")]
    pub required_attributes: Option<RequirementFields>,
    pub passive: Option<String>,
    pub critical: Option<f64>,

    #[serde(default, skip_deserializing)]
    pub total_attack_power: f64,
    #[serde(default, skip_deserializing)]
    pub damage_to_weight_ratio: Option<f64>,
    #[serde(default, skip_deserializing)]
    pub total_requirements: f64,
}

impl Weapon {
    /// Requirement for one attribute, `None` when unknown.
    pub fn requirement(&self, attribute: &str) -> Option<f64> {
        let req = self.required_attributes.as_ref()?;
        match attribute {
            "strength" => req.strength,
            "dexterity" => req.dexterity,
            "intelligence" => req.intelligence,
            "faith" => req.faith,
            "arcane" => req.arcane,
            _ => None,
        }
    }
}

impl Entity for Weapon {
    const COLLECTION: &'static str = "weapons";
    const LABEL: &'static str = "Weapon";
    const DOMAIN_COLUMNS: &'static [(&'static str, FieldDomain)] = &[
        ("attack", FieldDomain::Attack),
        ("defence", FieldDomain::Guard),
        ("scalesWith", FieldDomain::Scaling),
        ("requiredAttributes", FieldDomain::Requirement),
    ];
    const NUMERIC_COLUMNS: &'static [&'static str] = &["weight", "critical"];

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn finalize(&mut self) {
        self.name = self.name.trim().to_string();
        tidy_optional(&mut self.category, title_case);

        self.total_attack_power = self
            .attack
            .as_ref()
            .map_or(0.0, AttackFields::total_damage);
        self.damage_to_weight_ratio = match self.weight {
            Some(weight) if weight > 0.0 && self.total_attack_power > 0.0 => {
                Some(round2(self.total_attack_power / weight))
            }
            _ => None,
        };
        self.total_requirements = self
            .required_attributes
            .as_ref()
            .map_or(0.0, RequirementFields::total);
    }

    fn validate(&self) -> Result<(), String> {
        validate_name(&self.name)?;
        validate_non_negative("weight", self.weight)?;
        validate_non_negative("critical", self.critical)?;
        if let Some(attack) = &self.attack {
            attack.validate()?;
        }
        if let Some(defence) = &self.defence {
            defence.validate()?;
        }
        if let Some(scaling) = &self.scales_with {
            scaling.validate()?;
        }
        if let Some(requirements) = &self.required_attributes {
            requirements.validate()?;
        }
        Ok(())
    }
}
