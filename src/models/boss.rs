use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{tidy_optional, title_case, validate_name, Entity};
use crate::error::EldenDataError;
use crate::normalize::FieldDomain;

/// Importance of a boss, derived from what it drops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum BossTier {
    Legendary,
    Major,
    #[default]
    Minor,
}

impl BossTier {
    pub const ALL: [BossTier; 3] = [BossTier::Legendary, BossTier::Major, BossTier::Minor];

    pub fn as_str(&self) -> &'static str {
        match self {
            BossTier::Legendary => "Legendary",
            BossTier::Major => "Major",
            BossTier::Minor => "Minor",
        }
    }
}

impl fmt::Display for BossTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BossTier {
    type Err = EldenDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match title_case(s).as_str() {
            "Legendary" => Ok(BossTier::Legendary),
            "Major" => Ok(BossTier::Major),
            "Minor" => Ok(BossTier::Minor),
            _ => Err(EldenDataError::bad_request(format!(
                "boss tier must be Legendary, Major or Minor, got '{}'",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Boss {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    pub name: String,
    pub image: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub region: Option<String>,
    pub drops: Option<Vec<String>>,
    #[serde(rename = "healthPoints")]
    pub health_points: Option<String>,

    #[serde(default, skip_deserializing)]
    pub drop_count: usize,
    #[serde(default, skip_deserializing)]
    pub has_remembrance: bool,
    #[serde(default, skip_deserializing)]
    pub has_great_rune: bool,
    #[serde(default, skip_deserializing)]
    pub is_shardbearer: bool,
    #[serde(default, skip_deserializing)]
    pub boss_tier: BossTier,
    #[serde(default, skip_deserializing)]
    pub is_required_for_ending: bool,
}

impl Boss {
    fn drops_any(&self, needle: &str) -> bool {
        self.drops
            .as_ref()
            .map_or(false, |drops| drops.iter().any(|item| item.contains(needle)))
    }
}

impl Entity for Boss {
    const COLLECTION: &'static str = "bosses";
    const LABEL: &'static str = "Boss";
    const DOMAIN_COLUMNS: &'static [(&'static str, FieldDomain)] = &[];
    const LIST_COLUMNS: &'static [&'static str] = &["drops"];

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn finalize(&mut self) {
        self.name = self.name.trim().to_string();
        tidy_optional(&mut self.region, title_case);
        tidy_optional(&mut self.location, title_case);

        self.drop_count = self.drops.as_ref().map_or(0, Vec::len);
        self.has_remembrance = self.drops_any("Remembrance");
        self.has_great_rune = self.drops_any("Great Rune");
        self.is_shardbearer = self.has_great_rune;
        self.is_required_for_ending = self.is_shardbearer;
        self.boss_tier = if self.has_great_rune {
            BossTier::Legendary
        } else if self.has_remembrance {
            BossTier::Major
        } else {
            BossTier::Minor
        };
    }

    fn validate(&self) -> Result<(), String> {
        validate_name(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boss(drops: &[&str]) -> Boss {
        let mut boss = Boss {
            name: "Godrick the Grafted".to_string(),
            region: Some("limgrave".to_string()),
            drops: Some(drops.iter().map(|d| d.to_string()).collect()),
            ..Default::default()
        };
        boss.finalize();
        boss
    }

    #[test]
    fn tiers_follow_drops() {
        let legendary = boss(&["Remembrance of the Grafted", "Godrick's Great Rune"]);
        assert_eq!(legendary.boss_tier, BossTier::Legendary);
        assert!(legendary.is_shardbearer);
        assert!(legendary.is_required_for_ending);
        assert_eq!(legendary.drop_count, 2);
        assert_eq!(legendary.region.as_deref(), Some("Limgrave"));

        let major = boss(&["Remembrance of the Grafted"]);
        assert_eq!(major.boss_tier, BossTier::Major);
        assert!(!major.is_shardbearer);

        let minor = boss(&["Golden Seed"]);
        assert_eq!(minor.boss_tier, BossTier::Minor);
    }

    #[test]
    fn tier_parsing() {
        assert_eq!("legendary".parse::<BossTier>().unwrap(), BossTier::Legendary);
        assert!("epic".parse::<BossTier>().is_err());
    }
}
