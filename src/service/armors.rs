//! Armor filters, rankings and set building.

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{average, check_bounds, check_limit, count_by, descending, non_blank, GroupCount, Repository};
use crate::error::{EldenDataError, EldenDataResult};
use crate::models::armor::ARMOR_SLOTS;
use crate::models::{round2, Armor};
use crate::normalize::{ArmorDefenseFields, ResistanceFields};
use crate::store::filter::{contains_ci, exact_ci};
use crate::store::{Condition, Filter, FindOptions, SortOrder};

/// Each body slot and the category names used for it in exported data.
pub const SLOT_GROUPS: [(&str, [&str; 2]); 4] = [
    ("Head", ["Head", "Helm"]),
    ("Chest", ["Chest", "Armor"]),
    ("Arms", ["Arms", "Gauntlets"]),
    ("Legs", ["Legs", "Leg Armor"]),
];

const MIN_SET_PIECES: usize = 3;
const MAX_SETS: usize = 20;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ArmorFilter {
    pub name: Option<String>,
    pub category: Option<String>,
    /// Takes precedence over `category`.
    pub armor_slot: Option<String>,
    pub min_weight: Option<f64>,
    pub max_weight: Option<f64>,
    pub min_physical_defense: Option<f64>,
    pub max_physical_defense: Option<f64>,
    pub min_magic_defense: Option<f64>,
    pub max_magic_defense: Option<f64>,
    pub min_poise: Option<f64>,
    pub min_immunity: Option<f64>,
}

impl ArmorFilter {
    pub fn to_filter(&self) -> EldenDataResult<Filter> {
        check_bounds("weight", self.min_weight, self.max_weight)?;
        check_bounds("physical_defense", self.min_physical_defense, self.max_physical_defense)?;
        check_bounds("magic_defense", self.min_magic_defense, self.max_magic_defense)?;
        check_bounds("poise", self.min_poise, None)?;
        check_bounds("immunity", self.min_immunity, None)?;

        let mut filter = Filter::new();
        if let Some(name) = non_blank(&self.name) {
            filter.add("name", Condition::Regex(contains_ci(name)?));
        }
        if let Some(category) = non_blank(&self.armor_slot).or_else(|| non_blank(&self.category)) {
            filter.add("category", Condition::Regex(contains_ci(category)?));
        }
        Ok(filter
            .range("weight", self.min_weight, self.max_weight)
            .range("dmgNegation.physical", self.min_physical_defense, self.max_physical_defense)
            .range("dmgNegation.magic", self.min_magic_defense, self.max_magic_defense)
            .range("resistance.poise", self.min_poise, None)
            .range("resistance.immunity", self.min_immunity, None))
    }
}

pub fn by_slot(repo: &Repository<Armor>, slot: &str) -> EldenDataResult<Vec<Armor>> {
    let slot = slot.trim();
    let Some(known) = ARMOR_SLOTS.iter().find(|s| s.eq_ignore_ascii_case(slot)) else {
        return Err(EldenDataError::bad_request(format!(
            "invalid armor slot '{}', expected one of {}",
            slot,
            ARMOR_SLOTS.join(", ")
        )));
    };
    repo.find_all(&Filter::new().with("category", Condition::Regex(exact_ci(known)?)))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArmorRatio {
    pub id: Option<String>,
    pub name: String,
    pub category: Option<String>,
    pub weight: f64,
    #[serde(rename = "dmgNegation")]
    pub dmg_negation: Option<ArmorDefenseFields>,
    pub resistance: Option<ResistanceFields>,
    pub defense_to_weight_ratio: f64,
    pub image: Option<String>,
}

/// Armor ranked by physical negation per unit of weight.
pub fn best_defense_to_weight(
    repo: &Repository<Armor>,
    limit: usize,
    slot: Option<&str>,
) -> EldenDataResult<Vec<ArmorRatio>> {
    let limit = check_limit(limit)?;
    let mut filter = Filter::new()
        .with("weight", Condition::Gt(0.0))
        .with("dmgNegation.physical", Condition::NotNull);
    if let Some(slot) = slot.map(str::trim).filter(|s| !s.is_empty()) {
        filter.add("category", Condition::Regex(exact_ci(slot)?));
    }

    let mut ranked: Vec<ArmorRatio> = repo
        .find_all(&filter)?
        .into_iter()
        .filter_map(|armor| {
            let weight = armor.weight.filter(|w| *w > 0.0)?;
            let physical = armor.dmg_negation.as_ref()?.physical?;
            Some(ArmorRatio {
                defense_to_weight_ratio: round2(physical / weight),
                id: armor.id,
                name: armor.name,
                category: armor.category,
                weight,
                dmg_negation: armor.dmg_negation,
                resistance: armor.resistance,
                image: armor.image,
            })
        })
        .collect();
    ranked.sort_by(|a, b| descending(a.defense_to_weight_ratio, b.defense_to_weight_ratio));
    ranked.truncate(limit);
    Ok(ranked)
}

/// Stat an optimized set maximizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Physical,
    Magic,
    Fire,
    Lightning,
    Holy,
    Poise,
    /// Sum of every negation value.
    Balanced,
}

impl Priority {
    fn score(&self, armor: &Armor) -> Option<f64> {
        let negation = armor.dmg_negation.as_ref();
        match self {
            Priority::Physical => negation?.physical,
            Priority::Magic => negation?.magic,
            Priority::Fire => negation?.fire,
            Priority::Lightning => negation?.lightning,
            Priority::Holy => negation?.holy,
            Priority::Poise => armor.poise(),
            Priority::Balanced => negation.map(ArmorDefenseFields::total),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OptimizationRequest {
    pub max_weight: f64,
    #[serde(default)]
    pub prioritize: Priority,
    #[serde(default)]
    pub required_poise: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SetTotals {
    pub physical_defense: f64,
    pub magic_defense: f64,
    pub fire_defense: f64,
    pub lightning_defense: f64,
    pub holy_defense: f64,
    pub poise: f64,
    pub immunity: f64,
    pub robustness: f64,
    pub focus: f64,
    pub vitality: f64,
}

impl SetTotals {
    fn add(&mut self, armor: &Armor) {
        let sum = |total: &mut f64, value: Option<f64>| *total += value.unwrap_or(0.0);
        if let Some(n) = &armor.dmg_negation {
            sum(&mut self.physical_defense, n.physical);
            sum(&mut self.magic_defense, n.magic);
            sum(&mut self.fire_defense, n.fire);
            sum(&mut self.lightning_defense, n.lightning);
            sum(&mut self.holy_defense, n.holy);
        }
        if let Some(r) = &armor.resistance {
            sum(&mut self.poise, r.poise);
            sum(&mut self.immunity, r.immunity);
            sum(&mut self.robustness, r.robustness);
            sum(&mut self.focus, r.focus);
            sum(&mut self.vitality, r.vitality);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizedSet {
    /// Chosen piece per slot, keyed by lowercase slot name.
    pub optimized_set: BTreeMap<String, Armor>,
    pub total_weight: f64,
    pub weight_percentage: f64,
    pub total_stats: SetTotals,
    pub optimization_criteria: Priority,
    pub meets_poise_requirement: Option<bool>,
}

/// Greedy set builder: head, chest, arms then legs, each taking the best piece that still fits
/// the remaining weight.
pub fn optimize_set(repo: &Repository<Armor>, request: &OptimizationRequest) -> EldenDataResult<OptimizedSet> {
    if request.max_weight.is_nan() || request.max_weight <= 0.0 {
        return Err(EldenDataError::bad_request(format!(
            "max_weight must be > 0, got {}",
            request.max_weight
        )));
    }
    check_bounds("poise", request.required_poise, None)?;

    let mut optimized_set = BTreeMap::new();
    let mut totals = SetTotals::default();
    let mut total_weight = 0.0;

    for (slot, categories) in SLOT_GROUPS {
        let mut filter = Filter::new()
            .with(
                "category",
                Condition::In(categories.iter().map(|c| Value::from(*c)).collect()),
            )
            .with("weight", Condition::Lte(request.max_weight - total_weight));
        if let Some(poise) = request.required_poise {
            if request.prioritize != Priority::Poise {
                filter.add("resistance.poise", Condition::Gte(poise / 4.0));
            }
        }

        let best = repo
            .find_all(&filter)?
            .into_iter()
            .filter_map(|armor| request.prioritize.score(&armor).map(|score| (score, armor)))
            .fold(None::<(f64, Armor)>, |best, candidate| match best {
                Some(current) if current.0 >= candidate.0 => Some(current),
                _ => Some(candidate),
            });
        if let Some((_, piece)) = best {
            debug!("optimized {} slot: {}", slot, piece.name);
            total_weight += piece.weight.unwrap_or(0.0);
            totals.add(&piece);
            optimized_set.insert(slot.to_lowercase(), piece);
        }
    }

    let meets_poise_requirement = request
        .required_poise
        .filter(|p| *p > 0.0)
        .map(|required| totals.poise >= required);
    Ok(OptimizedSet {
        optimized_set,
        total_weight: round2(total_weight),
        weight_percentage: round2(total_weight / request.max_weight * 100.0),
        total_stats: totals,
        optimization_criteria: request.prioritize,
        meets_poise_requirement,
    })
}

/// Armor pieces sharing the first word of their names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArmorSet {
    pub set_name: String,
    pub piece_count: usize,
    pub helm: Option<Armor>,
    pub chest: Option<Armor>,
    pub gauntlets: Option<Armor>,
    pub legs: Option<Armor>,
}

fn piece_for(pieces: &[Armor], categories: &[&str]) -> Option<Armor> {
    categories.iter().find_map(|category| {
        pieces
            .iter()
            .find(|p| p.category.as_deref().map_or(false, |c| c.eq_ignore_ascii_case(category)))
            .cloned()
    })
}

pub fn find_sets(repo: &Repository<Armor>) -> EldenDataResult<Vec<ArmorSet>> {
    let mut groups: BTreeMap<String, Vec<Armor>> = BTreeMap::new();
    for armor in repo.find_all(&Filter::new())? {
        if let Some(set_name) = armor.set_name().map(str::to_string) {
            groups.entry(set_name).or_default().push(armor);
        }
    }

    let mut sets: Vec<(String, Vec<Armor>)> = groups
        .into_iter()
        .filter(|(_, pieces)| pieces.len() >= MIN_SET_PIECES)
        .collect();
    sets.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
    sets.truncate(MAX_SETS);

    Ok(sets
        .into_iter()
        .map(|(set_name, pieces)| ArmorSet {
            piece_count: pieces.len(),
            helm: piece_for(&pieces, &SLOT_GROUPS[0].1),
            chest: piece_for(&pieces, &SLOT_GROUPS[1].1),
            gauntlets: piece_for(&pieces, &SLOT_GROUPS[2].1),
            legs: piece_for(&pieces, &SLOT_GROUPS[3].1),
            set_name,
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArmorWeight {
    pub name: String,
    pub category: Option<String>,
    pub weight: Option<f64>,
}

impl From<&Armor> for ArmorWeight {
    fn from(armor: &Armor) -> Self {
        Self {
            name: armor.name.clone(),
            category: armor.category.clone(),
            weight: armor.weight,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArmorStatistics {
    pub by_slot: Vec<GroupCount>,
    pub avg_weight: Option<f64>,
    pub avg_physical_defense: Option<f64>,
    pub avg_poise: Option<f64>,
    pub total_armors: usize,
    pub heaviest: Vec<ArmorWeight>,
    pub lightest: Vec<ArmorWeight>,
}

pub fn statistics(repo: &Repository<Armor>) -> EldenDataResult<ArmorStatistics> {
    let by_weight = repo.find_with(&Filter::new(), &FindOptions::sorted("weight", SortOrder::Ascending))?;
    let lightest = by_weight
        .iter()
        .filter(|a| a.weight.map_or(false, |w| w > 0.0))
        .take(5)
        .map(ArmorWeight::from)
        .collect();
    let heaviest = by_weight.iter().rev().take(5).map(ArmorWeight::from).collect();

    Ok(ArmorStatistics {
        by_slot: count_by(by_weight.iter().map(|a| a.category.clone())),
        avg_weight: average(by_weight.iter().filter_map(|a| a.weight)),
        avg_physical_defense: average(
            by_weight
                .iter()
                .filter_map(|a| a.dmg_negation.as_ref().and_then(|n| n.physical)),
        ),
        avg_poise: average(by_weight.iter().filter_map(Armor::poise)),
        total_armors: by_weight.len(),
        heaviest,
        lightest,
    })
}
