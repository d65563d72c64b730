//! Statically typed views over normalized fields.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::field::normalize_domain;
use super::tables::FieldDomain;

/// Letter grades a scaling value may take.
pub const VALID_GRADES: &[&str] = &["E", "D", "C", "B", "A", "S", "-"];

/// A typed canonical field for one domain.
pub trait DomainFields: Serialize + DeserializeOwned + Default + Clone {
    const DOMAIN: FieldDomain;

    /// Range checks applied after normalization.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Normalizes `raw` into the typed struct of `T`'s domain.
pub fn normalize_as<T: DomainFields>(raw: &Value) -> Result<T, serde_json::Error> {
    serde_json::from_value(normalize_domain(T::DOMAIN, raw).into_value())
}

fn check_min(field: &str, value: Option<f64>, min: f64) -> Result<(), String> {
    match value {
        Some(v) if v < min => Err(format!("{} must be >= {}, got {}", field, min, v)),
        _ => Ok(()),
    }
}

fn check_range(field: &str, value: Option<f64>, min: f64, max: f64) -> Result<(), String> {
    match value {
        Some(v) if v < min || v > max => Err(format!(
            "{} must be between {} and {}, got {}",
            field, min, max, v
        )),
        _ => Ok(()),
    }
}

fn sum_present(values: &[Option<f64>]) -> f64 {
    values.iter().flatten().sum()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttackFields {
    pub physical: Option<f64>,
    pub magic: Option<f64>,
    pub fire: Option<f64>,
    pub lightning: Option<f64>,
    pub holy: Option<f64>,
    pub critical: Option<f64>,
    pub status_effects: Option<Value>,
}

impl AttackFields {
    /// Sum of the five damage types.
    pub fn total_damage(&self) -> f64 {
        sum_present(&[
            self.physical,
            self.magic,
            self.fire,
            self.lightning,
            self.holy,
        ])
    }
}

impl DomainFields for AttackFields {
    const DOMAIN: FieldDomain = FieldDomain::Attack;

    fn validate(&self) -> Result<(), String> {
        check_min("attack.fire", self.fire, 0.0)?;
        check_min("attack.lightning", self.lightning, 0.0)?;
        check_min("attack.holy", self.holy, 0.0)?;
        check_min("attack.critical", self.critical, 0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuardFields {
    pub physical: Option<f64>,
    pub magic: Option<f64>,
    pub fire: Option<f64>,
    pub lightning: Option<f64>,
    pub holy: Option<f64>,
    pub boost: Option<f64>,
}

impl DomainFields for GuardFields {
    const DOMAIN: FieldDomain = FieldDomain::Guard;

    fn validate(&self) -> Result<(), String> {
        check_min("defence.physical", self.physical, 0.0)?;
        check_min("defence.magic", self.magic, 0.0)?;
        check_min("defence.fire", self.fire, 0.0)?;
        check_min("defence.lightning", self.lightning, 0.0)?;
        check_min("defence.holy", self.holy, 0.0)?;
        check_min("defence.boost", self.boost, 0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArmorDefenseFields {
    pub physical: Option<f64>,
    pub strike: Option<f64>,
    pub slash: Option<f64>,
    pub pierce: Option<f64>,
    pub magic: Option<f64>,
    pub fire: Option<f64>,
    pub lightning: Option<f64>,
    pub holy: Option<f64>,
}

fn mean_present(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }
    Some(present.iter().sum::<f64>() / present.len() as f64)
}

impl ArmorDefenseFields {
    pub fn average_physical(&self) -> Option<f64> {
        mean_present(&[self.physical, self.strike, self.slash, self.pierce])
    }

    pub fn average_elemental(&self) -> Option<f64> {
        mean_present(&[self.magic, self.fire, self.lightning, self.holy])
    }

    pub fn total(&self) -> f64 {
        sum_present(&[
            self.physical,
            self.strike,
            self.slash,
            self.pierce,
            self.magic,
            self.fire,
            self.lightning,
            self.holy,
        ])
    }
}

impl DomainFields for ArmorDefenseFields {
    const DOMAIN: FieldDomain = FieldDomain::ArmorDefense;

    fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("physical", self.physical),
            ("strike", self.strike),
            ("slash", self.slash),
            ("pierce", self.pierce),
            ("magic", self.magic),
            ("fire", self.fire),
            ("lightning", self.lightning),
            ("holy", self.holy),
        ] {
            check_min(&format!("dmgNegation.{}", name), value, 0.0)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResistanceFields {
    pub immunity: Option<f64>,
    pub robustness: Option<f64>,
    pub focus: Option<f64>,
    pub vitality: Option<f64>,
    pub poise: Option<f64>,
}

impl ResistanceFields {
    /// Sum of the four status resistances; poise is not a resistance.
    pub fn total(&self) -> f64 {
        sum_present(&[self.immunity, self.robustness, self.focus, self.vitality])
    }
}

impl DomainFields for ResistanceFields {
    const DOMAIN: FieldDomain = FieldDomain::Resistance;

    fn validate(&self) -> Result<(), String> {
        check_min("resistance.immunity", self.immunity, 0.0)?;
        check_min("resistance.robustness", self.robustness, 0.0)?;
        check_min("resistance.focus", self.focus, 0.0)?;
        check_min("resistance.vitality", self.vitality, 0.0)?;
        check_min("resistance.poise", self.poise, 0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScalingFields {
    pub strength: Option<String>,
    pub dexterity: Option<String>,
    pub intelligence: Option<String>,
    pub faith: Option<String>,
    pub arcane: Option<String>,
}

impl ScalingFields {
    pub fn grades(&self) -> [(&'static str, Option<&str>); 5] {
        [
            ("strength", self.strength.as_deref()),
            ("dexterity", self.dexterity.as_deref()),
            ("intelligence", self.intelligence.as_deref()),
            ("faith", self.faith.as_deref()),
            ("arcane", self.arcane.as_deref()),
        ]
    }
}

impl DomainFields for ScalingFields {
    const DOMAIN: FieldDomain = FieldDomain::Scaling;

    fn validate(&self) -> Result<(), String> {
        for (name, grade) in self.grades() {
            if let Some(grade) = grade {
                if !VALID_GRADES.contains(&grade) {
                    return Err(format!(
                        "scalesWith.{} must be one of {}, got {:?}",
                        name,
                        VALID_GRADES.join(" "),
                        grade
                    ));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequirementFields {
    pub strength: Option<f64>,
    pub dexterity: Option<f64>,
    pub intelligence: Option<f64>,
    pub faith: Option<f64>,
    pub arcane: Option<f64>,
}

impl RequirementFields {
    pub fn total(&self) -> f64 {
        sum_present(&[
            self.strength,
            self.dexterity,
            self.intelligence,
            self.faith,
            self.arcane,
        ])
    }
}

impl DomainFields for RequirementFields {
    const DOMAIN: FieldDomain = FieldDomain::Requirement;

    fn validate(&self) -> Result<(), String> {
        check_range("requirement.strength", self.strength, 0.0, 99.0)?;
        check_range("requirement.dexterity", self.dexterity, 0.0, 99.0)?;
        check_range("requirement.intelligence", self.intelligence, 0.0, 99.0)?;
        check_range("requirement.faith", self.faith, 0.0, 99.0)?;
        check_range("requirement.arcane", self.arcane, 0.0, 99.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterStats {
    pub level: Option<f64>,
    pub vigor: Option<f64>,
    pub mind: Option<f64>,
    pub endurance: Option<f64>,
    pub strength: Option<f64>,
    pub dexterity: Option<f64>,
    pub intelligence: Option<f64>,
    pub faith: Option<f64>,
    pub arcane: Option<f64>,
}

impl CharacterStats {
    /// The eight attributes with their display names, level excluded.
    pub fn attributes(&self) -> [(&'static str, Option<f64>); 8] {
        [
            ("Vigor", self.vigor),
            ("Mind", self.mind),
            ("Endurance", self.endurance),
            ("Strength", self.strength),
            ("Dexterity", self.dexterity),
            ("Intelligence", self.intelligence),
            ("Faith", self.faith),
            ("Arcane", self.arcane),
        ]
    }

    /// Attribute value by lowercase name, including `level`.
    pub fn get(&self, name: &str) -> Option<f64> {
        if name == "level" {
            return self.level;
        }
        self.attributes()
            .into_iter()
            .find(|(attr, _)| attr.eq_ignore_ascii_case(name))
            .and_then(|(_, value)| value)
    }

    pub fn total(&self) -> f64 {
        self.attributes().iter().filter_map(|(_, v)| *v).sum()
    }
}

impl DomainFields for CharacterStats {
    const DOMAIN: FieldDomain = FieldDomain::CharacterStats;

    fn validate(&self) -> Result<(), String> {
        check_range("stats.level", self.level, 1.0, 713.0)?;
        for (name, value) in self.attributes() {
            check_range(&format!("stats.{}", name.to_lowercase()), value, 1.0, 99.0)?;
        }
        Ok(())
    }
}

/// One normalized composite field, typed by domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "domain", content = "fields", rename_all = "snake_case")]
pub enum CanonicalField {
    Attack(AttackFields),
    Guard(GuardFields),
    ArmorDefense(ArmorDefenseFields),
    Resistance(ResistanceFields),
    Scaling(ScalingFields),
    Requirement(RequirementFields),
    Stats(CharacterStats),
}

impl CanonicalField {
    /// Normalizes `raw` for `domain` and deserializes it into the matching variant.
    pub fn from_domain(domain: FieldDomain, raw: &Value) -> Result<Self, serde_json::Error> {
        Ok(match domain {
            FieldDomain::Attack => CanonicalField::Attack(normalize_as(raw)?),
            FieldDomain::Guard => CanonicalField::Guard(normalize_as(raw)?),
            FieldDomain::ArmorDefense => CanonicalField::ArmorDefense(normalize_as(raw)?),
            FieldDomain::Resistance => CanonicalField::Resistance(normalize_as(raw)?),
            FieldDomain::Scaling => CanonicalField::Scaling(normalize_as(raw)?),
            FieldDomain::Requirement => CanonicalField::Requirement(normalize_as(raw)?),
            FieldDomain::CharacterStats => CanonicalField::Stats(normalize_as(raw)?),
        })
    }

    pub fn domain(&self) -> FieldDomain {
        match self {
            CanonicalField::Attack(_) => FieldDomain::Attack,
            CanonicalField::Guard(_) => FieldDomain::Guard,
            CanonicalField::ArmorDefense(_) => FieldDomain::ArmorDefense,
            CanonicalField::Resistance(_) => FieldDomain::Resistance,
            CanonicalField::Scaling(_) => FieldDomain::Scaling,
            CanonicalField::Requirement(_) => FieldDomain::Requirement,
            CanonicalField::Stats(_) => FieldDomain::CharacterStats,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            CanonicalField::Attack(f) => f.validate(),
            CanonicalField::Guard(f) => f.validate(),
            CanonicalField::ArmorDefense(f) => f.validate(),
            CanonicalField::Resistance(f) => f.validate(),
            CanonicalField::Scaling(f) => f.validate(),
            CanonicalField::Requirement(f) => f.validate(),
            CanonicalField::Stats(f) => f.validate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn typed_attack_from_literal() {
        let attack: AttackFields =
            normalize_as(&json!("[{'name': 'Phy', 'amount': 120}, {'name': 'Crit', 'amount': 100}]"))
                .unwrap();
        assert_eq!(attack.physical, Some(120.0));
        assert_eq!(attack.critical, Some(100.0));
        assert_eq!(attack.magic, None);
        assert_eq!(attack.total_damage(), 120.0);
    }

    #[test]
    fn typed_view_of_unusable_input_is_default() {
        let defense: ArmorDefenseFields = normalize_as(&json!("")).unwrap();
        assert_eq!(defense, ArmorDefenseFields::default());
        assert_eq!(defense.average_physical(), None);
    }

    #[test]
    fn non_numeric_leftover_fails_typed_view() {
        let result: Result<CharacterStats, _> = normalize_as(&json!({"Vig": "lots"}));
        assert!(result.is_err());
    }

    #[test]
    fn scaling_grades_validate() {
        let field = CanonicalField::from_domain(FieldDomain::Scaling, &json!("{'Str': 'a'}")).unwrap();
        assert_eq!(field.domain(), FieldDomain::Scaling);
        assert!(field.validate().is_ok());

        let bad = CanonicalField::from_domain(FieldDomain::Scaling, &json!({"Dex": "Z"})).unwrap();
        assert!(bad.validate().unwrap_err().contains("dexterity"));
    }

    #[test]
    fn stat_ranges() {
        let stats: CharacterStats = normalize_as(&json!({"Lvl": 9, "Vig": 15, "Str": 100})).unwrap();
        assert!(stats.validate().unwrap_err().contains("strength"));

        let stats: CharacterStats = normalize_as(&json!({"Lvl": 9, "Vig": 15, "Str": 14})).unwrap();
        assert!(stats.validate().is_ok());
        assert_eq!(stats.total(), 29.0);
        assert_eq!(stats.get("strength"), Some(14.0));
        assert_eq!(stats.get("level"), Some(9.0));
    }

    #[test]
    fn only_elemental_attack_is_bounded() {
        let attack: AttackFields = normalize_as(&json!({"Phy": -1, "Mag": -3})).unwrap();
        assert!(attack.validate().is_ok());

        let attack: AttackFields = normalize_as(&json!({"Phy": 10, "Fire": -1})).unwrap();
        assert!(attack.validate().unwrap_err().contains("attack.fire"));
    }

    #[test]
    fn requirement_range() {
        let req: RequirementFields = normalize_as(&json!({"Int": 120})).unwrap();
        assert!(req.validate().is_err());
    }
}
