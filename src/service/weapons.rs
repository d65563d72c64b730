//! Weapon filters and derived weapon queries.

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    average, check_bounds, check_id_list, check_limit, count_by, descending, non_blank,
    GroupCount, Repository,
};
use crate::error::{EldenDataError, EldenDataResult};
use crate::models::{round2, Weapon};
use crate::normalize::AttackFields;
use crate::store::filter::{contains_ci, exact_ci};
use crate::store::{Condition, Filter, FindOptions, SortOrder};

/// Scaling grades from weakest to strongest.
pub const SCALING_GRADES: [&str; 6] = ["E", "D", "C", "B", "A", "S"];

const SCALED_ATTRIBUTES: [&str; 5] = ["strength", "dexterity", "intelligence", "faith", "arcane"];

/// Build types accepted by [`by_build_type`].
pub const BUILD_TYPES: [&str; 6] = ["strength", "dexterity", "quality", "intelligence", "faith", "arcane"];

const BUILD_RESULT_LIMIT: usize = 20;

/// Query parameters accepted by the weapon list.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WeaponFilter {
    pub name: Option<String>,
    pub category: Option<String>,
    pub min_weight: Option<f64>,
    pub max_weight: Option<f64>,
    pub min_damage: Option<f64>,
    pub max_damage: Option<f64>,
    pub min_strength: Option<f64>,
    pub max_strength: Option<f64>,
    pub min_dexterity: Option<f64>,
    pub max_dexterity: Option<f64>,
    /// Minimum grade on at least one attribute.
    pub scaling_grade: Option<String>,
    pub has_passive: Option<bool>,
}

impl WeaponFilter {
    pub fn to_filter(&self) -> EldenDataResult<Filter> {
        check_bounds("weight", self.min_weight, self.max_weight)?;
        check_bounds("damage", self.min_damage, self.max_damage)?;
        check_bounds("strength", self.min_strength, self.max_strength)?;
        check_bounds("dexterity", self.min_dexterity, self.max_dexterity)?;

        let mut filter = Filter::new();
        if let Some(name) = non_blank(&self.name) {
            filter.add("name", Condition::Regex(contains_ci(name)?));
        }
        if let Some(category) = non_blank(&self.category) {
            filter.add("category", Condition::Regex(exact_ci(category)?));
        }
        let mut filter = filter
            .range("weight", self.min_weight, self.max_weight)
            .range("attack.physical", self.min_damage, self.max_damage)
            .range("requiredAttributes.strength", self.min_strength, self.max_strength)
            .range("requiredAttributes.dexterity", self.min_dexterity, self.max_dexterity);

        if let Some(grade) = non_blank(&self.scaling_grade) {
            let grades = grades_at_least(grade)?;
            filter = filter.any(
                SCALED_ATTRIBUTES
                    .iter()
                    .map(|attr| {
                        Filter::new().with(format!("scalesWith.{}", attr), Condition::In(grades.clone()))
                    })
                    .collect(),
            );
        }
        match self.has_passive {
            Some(true) => filter.add("passive", Condition::NotNull),
            Some(false) => filter.add("passive", Condition::Not(Box::new(Condition::NotNull))),
            None => {}
        }
        Ok(filter)
    }
}

/// `grade` and every stronger grade.
fn grades_at_least(grade: &str) -> EldenDataResult<Vec<Value>> {
    let wanted = grade.trim().to_uppercase();
    let start = SCALING_GRADES
        .iter()
        .position(|g| *g == wanted)
        .ok_or_else(|| {
            EldenDataError::bad_request(format!(
                "scaling_grade must be one of {}, got '{}'",
                SCALING_GRADES.join(", "),
                grade
            ))
        })?;
    Ok(SCALING_GRADES[start..].iter().map(|g| Value::from(*g)).collect())
}

pub fn by_category(repo: &Repository<Weapon>, category: &str) -> EldenDataResult<Vec<Weapon>> {
    let filter = Filter::new().with("category", Condition::Regex(exact_ci(category.trim())?));
    repo.find_all(&filter)
}

/// A weapon ranked by physical damage per unit of weight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeaponRatio {
    pub id: Option<String>,
    pub name: String,
    pub category: Option<String>,
    pub weight: f64,
    pub attack: Option<AttackFields>,
    pub damage_to_weight_ratio: f64,
    pub image: Option<String>,
}

pub fn best_damage_to_weight(
    repo: &Repository<Weapon>,
    limit: usize,
    category: Option<&str>,
) -> EldenDataResult<Vec<WeaponRatio>> {
    let limit = check_limit(limit)?;
    let mut filter = Filter::new()
        .with("weight", Condition::Gt(0.0))
        .with("attack.physical", Condition::Gt(0.0));
    if let Some(category) = category.map(str::trim).filter(|c| !c.is_empty()) {
        filter.add("category", Condition::Regex(exact_ci(category)?));
    }

    let mut ranked: Vec<WeaponRatio> = repo
        .find_all(&filter)?
        .into_iter()
        .filter_map(|weapon| {
            let weight = weapon.weight.filter(|w| *w > 0.0)?;
            let physical = weapon.attack.as_ref()?.physical?;
            Some(WeaponRatio {
                damage_to_weight_ratio: round2(physical / weight),
                id: weapon.id,
                name: weapon.name,
                category: weapon.category,
                weight,
                attack: weapon.attack,
                image: weapon.image,
            })
        })
        .collect();
    ranked.sort_by(|a, b| descending(a.damage_to_weight_ratio, b.damage_to_weight_ratio));
    ranked.truncate(limit);
    Ok(ranked)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeaponStatsComparison {
    pub damage: BTreeMap<String, f64>,
    pub weight: BTreeMap<String, Option<f64>>,
    pub damage_to_weight_ratio: BTreeMap<String, Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeaponComparison {
    pub weapons: Vec<Weapon>,
    pub stats_comparison: WeaponStatsComparison,
    pub winner_by_damage: String,
    pub winner_by_ratio: String,
    pub lightest: String,
}

fn physical(weapon: &Weapon) -> f64 {
    weapon.attack.as_ref().and_then(|a| a.physical).unwrap_or(0.0)
}

/// Compares two to five distinct weapons; any unknown id fails the whole comparison.
pub fn compare(repo: &Repository<Weapon>, ids: &[String]) -> EldenDataResult<WeaponComparison> {
    check_id_list(ids, 2, 5)?;
    let weapons = ids
        .iter()
        .map(|id| repo.get_by_id(id))
        .collect::<EldenDataResult<Vec<_>>>()?;

    let stats_comparison = WeaponStatsComparison {
        damage: weapons.iter().map(|w| (w.name.clone(), physical(w))).collect(),
        weight: weapons.iter().map(|w| (w.name.clone(), w.weight)).collect(),
        damage_to_weight_ratio: weapons
            .iter()
            .map(|w| (w.name.clone(), w.damage_to_weight_ratio))
            .collect(),
    };
    // Ties go to the earliest id in the request.
    let best_by = |score: &dyn Fn(&Weapon) -> f64| {
        weapons
            .iter()
            .fold(None::<&Weapon>, |best, w| match best {
                Some(b) if score(b) >= score(w) => Some(b),
                _ => Some(w),
            })
            .map(|w| w.name.clone())
            .unwrap_or_default()
    };
    let winner_by_damage = best_by(&physical);
    let winner_by_ratio = best_by(&|w: &Weapon| w.damage_to_weight_ratio.unwrap_or(0.0));
    let lightest = best_by(&|w: &Weapon| -w.weight.unwrap_or(f64::INFINITY));

    Ok(WeaponComparison {
        weapons,
        stats_comparison,
        winner_by_damage,
        winner_by_ratio,
        lightest,
    })
}

/// Weapons that scale well with the attributes of `build_type`.
pub fn by_build_type(repo: &Repository<Weapon>, build_type: &str) -> EldenDataResult<Vec<Weapon>> {
    let build_type = build_type.trim().to_lowercase();
    if !BUILD_TYPES.contains(&build_type.as_str()) {
        return Err(EldenDataError::bad_request(format!(
            "invalid build type '{}', expected one of {}",
            build_type,
            BUILD_TYPES.join(", ")
        )));
    }
    let grades = |list: &[&str]| Condition::In(list.iter().map(|g| Value::from(*g)).collect());
    let filter = if build_type == "quality" {
        Filter::new().any(vec![
            Filter::new().with("scalesWith.strength", grades(&["B", "A", "S"])),
            Filter::new().with("scalesWith.dexterity", grades(&["B", "A", "S"])),
        ])
    } else {
        Filter::new().with(format!("scalesWith.{}", build_type), grades(&["A", "S"]))
    };
    debug!("weapons for {} build", build_type);
    repo.find_with(&filter, &FindOptions::default().with_limit(BUILD_RESULT_LIMIT))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopDamage {
    pub name: String,
    pub category: Option<String>,
    pub damage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeaponStatistics {
    pub by_category: Vec<GroupCount>,
    pub avg_weight: Option<f64>,
    pub avg_physical_damage: Option<f64>,
    pub total_weapons: usize,
    pub top_damage: Vec<TopDamage>,
}

pub fn statistics(repo: &Repository<Weapon>) -> EldenDataResult<WeaponStatistics> {
    let weapons = repo.find_with(
        &Filter::new(),
        &FindOptions::sorted("attack.physical", SortOrder::Descending),
    )?;
    Ok(WeaponStatistics {
        by_category: count_by(weapons.iter().map(|w| w.category.clone())),
        avg_weight: average(weapons.iter().filter_map(|w| w.weight)),
        avg_physical_damage: average(
            weapons
                .iter()
                .filter_map(|w| w.attack.as_ref().and_then(|a| a.physical)),
        ),
        total_weapons: weapons.len(),
        top_damage: weapons
            .iter()
            .take(5)
            .map(|w| TopDamage {
                name: w.name.clone(),
                category: w.category.clone(),
                damage: w.attack.as_ref().and_then(|a| a.physical),
            })
            .collect(),
    })
}
