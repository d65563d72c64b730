//! Starting class queries and build advice.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{average, check_bounds, check_id_list, descending, non_blank, Page, Pagination, Repository};
use crate::error::{EldenDataError, EldenDataResult};
use crate::models::{round2, Archetype, CharacterClass};
use crate::store::filter::contains_ci;
use crate::store::{Condition, Filter};

/// Stats a comparison may ask for.
pub const COMPARABLE_STATS: [&str; 9] = [
    "vigor",
    "mind",
    "endurance",
    "strength",
    "dexterity",
    "intelligence",
    "faith",
    "arcane",
    "level",
];

fn default_compare_stats() -> Vec<String> {
    ["strength", "dexterity", "intelligence", "faith"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Build types and the stats they value, most important first.
pub const BUILD_PRIORITIES: [(&str, [&str; 3]); 10] = [
    ("strength", ["strength", "vigor", "endurance"]),
    ("dexterity", ["dexterity", "vigor", "endurance"]),
    ("quality", ["strength", "dexterity", "vigor"]),
    ("intelligence", ["intelligence", "mind", "vigor"]),
    ("faith", ["faith", "mind", "vigor"]),
    ("sorcerer", ["intelligence", "mind", "vigor"]),
    ("cleric", ["faith", "mind", "vigor"]),
    ("arcane", ["arcane", "mind", "vigor"]),
    ("tank", ["vigor", "endurance", "strength"]),
    ("glass_cannon", ["intelligence", "faith", "arcane"]),
];

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClassFilter {
    pub name: Option<String>,
    pub min_level: Option<f64>,
    pub max_level: Option<f64>,
    pub min_strength: Option<f64>,
    pub min_intelligence: Option<f64>,
    pub min_faith: Option<f64>,
    /// Derived from stats, so it is applied after adaptation.
    pub archetype: Option<String>,
}

impl ClassFilter {
    pub fn to_filter(&self) -> EldenDataResult<Filter> {
        check_bounds("level", self.min_level, self.max_level)?;
        let mut filter = Filter::new();
        if let Some(name) = non_blank(&self.name) {
            filter.add("name", Condition::Regex(contains_ci(name)?));
        }
        Ok(filter
            .range("stats.level", self.min_level, self.max_level)
            .range("stats.strength", self.min_strength, None)
            .range("stats.intelligence", self.min_intelligence, None)
            .range("stats.faith", self.min_faith, None))
    }

    fn archetype(&self) -> EldenDataResult<Option<Archetype>> {
        non_blank(&self.archetype).map(parse_archetype).transpose()
    }
}

fn parse_archetype(name: &str) -> EldenDataResult<Archetype> {
    Archetype::parse(name).ok_or_else(|| {
        EldenDataError::bad_request(format!("invalid archetype '{}'", name.trim()))
    })
}

/// Lists classes; an archetype filter pages in memory after adaptation.
pub fn list(
    repo: &Repository<CharacterClass>,
    filter: &ClassFilter,
    pagination: &Pagination,
) -> EldenDataResult<Page<CharacterClass>> {
    let store_filter = filter.to_filter()?;
    match filter.archetype()? {
        None => repo.list(&store_filter, pagination),
        Some(archetype) => {
            let mut options = pagination.to_find_options(repo.max_page_size())?;
            options.skip = 0;
            options.limit = None;
            let matching = repo
                .find_with(&store_filter, &options)?
                .into_iter()
                .filter(|class| class.archetype == archetype)
                .collect();
            Page::from_items(matching, pagination, repo.max_page_size())
        }
    }
}

pub fn by_archetype(repo: &Repository<CharacterClass>, archetype: &str) -> EldenDataResult<Vec<CharacterClass>> {
    let archetype = parse_archetype(archetype)?;
    Ok(repo
        .find_all(&Filter::new())?
        .into_iter()
        .filter(|class| class.archetype == archetype)
        .collect())
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClassComparisonRequest {
    pub class_ids: Vec<String>,
    #[serde(default = "default_compare_stats")]
    pub compare_stats: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassComparison {
    pub classes: Vec<CharacterClass>,
    pub stats_comparison: BTreeMap<String, BTreeMap<String, Option<f64>>>,
    pub best_per_stat: BTreeMap<String, String>,
    pub total_stats: BTreeMap<String, f64>,
    pub most_versatile: Option<String>,
    pub archetypes: BTreeMap<String, Archetype>,
}

pub fn compare(
    repo: &Repository<CharacterClass>,
    request: &ClassComparisonRequest,
) -> EldenDataResult<ClassComparison> {
    check_id_list(&request.class_ids, 2, 10)?;
    let stats: Vec<String> = request
        .compare_stats
        .iter()
        .map(|s| s.trim().to_lowercase())
        .collect();
    if let Some(unknown) = stats.iter().find(|s| !COMPARABLE_STATS.contains(&s.as_str())) {
        return Err(EldenDataError::bad_request(format!(
            "cannot compare stat '{}', expected one of {}",
            unknown,
            COMPARABLE_STATS.join(", ")
        )));
    }
    let classes = request
        .class_ids
        .iter()
        .map(|id| repo.get_by_id(id))
        .collect::<EldenDataResult<Vec<_>>>()?;
    let with_stats: Vec<&CharacterClass> = classes.iter().filter(|c| c.stats.is_some()).collect();

    let mut stats_comparison = BTreeMap::new();
    let mut best_per_stat = BTreeMap::new();
    for stat in &stats {
        let values: BTreeMap<String, Option<f64>> = with_stats
            .iter()
            .map(|c| (c.name.clone(), c.stat(stat)))
            .collect();
        let best = with_stats.iter().fold(None::<(&str, f64)>, |best, c| {
            let value = c.stat(stat).unwrap_or(0.0);
            match best {
                Some((_, top)) if top >= value => best,
                _ => Some((c.name.as_str(), value)),
            }
        });
        if let Some((name, _)) = best {
            best_per_stat.insert(stat.clone(), name.to_string());
        }
        stats_comparison.insert(stat.clone(), values);
    }

    let total_stats: BTreeMap<String, f64> = with_stats.iter().map(|c| (c.name.clone(), c.total_stats)).collect();
    let most_versatile = with_stats
        .iter()
        .fold(None::<&CharacterClass>, |best, c| match best {
            Some(b) if b.total_stats >= c.total_stats => Some(b),
            _ => Some(c),
        })
        .map(|c| c.name.clone());
    let archetypes = classes.iter().map(|c| (c.name.clone(), c.archetype)).collect();

    Ok(ClassComparison {
        stats_comparison,
        best_per_stat,
        total_stats,
        most_versatile,
        archetypes,
        classes,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredClass {
    pub class: CharacterClass,
    pub score: f64,
    pub starting_level: f64,
    pub priority_stats: BTreeMap<String, f64>,
    pub archetype: Archetype,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StartingClassAdvice {
    pub build_type: String,
    pub recommended_class: Option<ScoredClass>,
    pub alternatives: Vec<ScoredClass>,
    pub priority_stats: Vec<String>,
    pub recommendation_reason: String,
}

/// Ranks classes for `build_type`: weighted priority stats minus half the starting level.
pub fn best_starting_class(
    repo: &Repository<CharacterClass>,
    build_type: &str,
) -> EldenDataResult<StartingClassAdvice> {
    let build_type = build_type.trim().to_lowercase();
    let Some((_, priorities)) = BUILD_PRIORITIES.iter().find(|(name, _)| *name == build_type) else {
        let known: Vec<&str> = BUILD_PRIORITIES.iter().map(|(name, _)| *name).collect();
        return Err(EldenDataError::bad_request(format!(
            "invalid build type '{}', expected one of {}",
            build_type,
            known.join(", ")
        )));
    };

    let mut scored: Vec<ScoredClass> = repo
        .find_all(&Filter::new())?
        .into_iter()
        .filter(|class| class.stats.is_some())
        .map(|class| {
            let mut score = 0.0;
            let mut priority_stats = BTreeMap::new();
            for (i, stat) in priorities.iter().enumerate() {
                let value = class.stat(stat).unwrap_or(0.0);
                score += value * (priorities.len() - i) as f64;
                priority_stats.insert(stat.to_string(), value);
            }
            let starting_level = class.starting_level.unwrap_or(1.0);
            score -= starting_level * 0.5;
            ScoredClass {
                score,
                starting_level,
                priority_stats,
                archetype: class.archetype,
                class,
            }
        })
        .collect();
    scored.sort_by(|a, b| descending(a.score, b.score));

    let mut ranked = scored.into_iter();
    let recommended_class = ranked.next();
    let alternatives = ranked.take(3).collect();
    Ok(StartingClassAdvice {
        recommendation_reason: format!(
            "Best starting stats for a {} build, maximizing {} and {} while keeping the starting level low.",
            build_type, priorities[0], priorities[1]
        ),
        priority_stats: priorities.iter().map(|s| s.to_string()).collect(),
        build_type,
        recommended_class,
        alternatives,
    })
}

/// Averages of every stat plus the spread of the main attributes, keyed `avg_*`, `max_*`,
/// `min_*`.
pub fn stat_distribution(repo: &Repository<CharacterClass>) -> EldenDataResult<BTreeMap<String, f64>> {
    let classes = repo.find_all(&Filter::new())?;
    let values = |stat: &str| -> Vec<f64> { classes.iter().filter_map(|c| c.stat(stat)).collect() };

    let mut distribution = BTreeMap::new();
    for stat in COMPARABLE_STATS {
        if let Some(avg) = average(values(stat)) {
            distribution.insert(format!("avg_{}", stat), avg);
        }
    }
    for stat in ["vigor", "mind", "strength", "dexterity", "intelligence", "faith"] {
        let present = values(stat);
        if let Some(max) = present.iter().copied().reduce(f64::max) {
            distribution.insert(format!("max_{}", stat), max);
        }
        if let Some(min) = present.iter().copied().reduce(f64::min) {
            distribution.insert(format!("min_{}", stat), min);
        }
    }
    Ok(distribution)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildRecommendation {
    pub class_name: String,
    pub recommended_weapons: Vec<String>,
    pub recommended_spells: Vec<String>,
    pub recommended_stats_priority: Vec<String>,
    pub playstyle: String,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn build_recommendation(repo: &Repository<CharacterClass>, id: &str) -> EldenDataResult<BuildRecommendation> {
    let class = repo.get_by_id(id)?;
    if class.stats.is_none() {
        return Err(EldenDataError::bad_request(format!(
            "class '{}' has no stats",
            class.name
        )));
    }

    let (weapons, spells, priority, playstyle): (&[&str], &[&str], &[&str], &str) = match class.archetype {
        Archetype::Strength => (
            &["Greatsword", "Colossal Sword", "Great Hammer"],
            &[],
            &["Vigor", "Endurance", "Strength"],
            "Heavy weapons and high physical damage. Favor heavy armor and endurance.",
        ),
        Archetype::Dexterity => (
            &["Katana", "Curved Sword", "Spear"],
            &[],
            &["Vigor", "Endurance", "Dexterity"],
            "Fast weapons. Rely on dodging and critical hits.",
        ),
        Archetype::Quality => (
            &["Straight Sword", "Greatsword", "Halberd"],
            &[],
            &["Vigor", "Strength", "Dexterity"],
            "Versatile strength and dexterity build with the widest weapon choice.",
        ),
        Archetype::Sorcerer => (
            &["Staff", "Glintstone Staff"],
            &["Glintstone Pebble", "Rock Sling", "Comet Azur"],
            &["Mind", "Intelligence", "Vigor"],
            "Offensive sorceries. Keep your distance and cast powerful spells.",
        ),
        Archetype::Cleric => (
            &["Sacred Seal", "Cipher Pata"],
            &["Heal", "Lightning Spear", "Black Flame"],
            &["Mind", "Faith", "Vigor"],
            "Faith incantations balancing damage and support.",
        ),
        Archetype::Occult => (
            &["Occult Weapon", "Reduvia"],
            &["Bloodflame Blade", "Dragon Communion"],
            &["Arcane", "Mind", "Vigor"],
            "Arcane build built around status effects and blood loss.",
        ),
        Archetype::Tank => (
            &["Greatshield", "Lance"],
            &[],
            &["Vigor", "Endurance", "Strength"],
            "Defensive build with high HP and heavy armor.",
        ),
        Archetype::Hybrid => (
            &["Quality Weapon", "Faith/Int Weapon"],
            &[],
            &["Vigor", "Mind", "Primary Stats"],
            "Mixed build with several ways to fight.",
        ),
        Archetype::Balanced => (&["Balanced Weapon"], &[], &[], "Balanced, versatile build."),
    };
    let recommended_stats_priority = if priority.is_empty() {
        class.primary_stats.clone()
    } else {
        strings(priority)
    };

    Ok(BuildRecommendation {
        class_name: class.name,
        recommended_weapons: strings(weapons),
        recommended_spells: strings(spells),
        recommended_stats_priority,
        playstyle: playstyle.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelRange {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassStatistics {
    pub total_classes: usize,
    pub archetype_distribution: BTreeMap<Archetype, usize>,
    pub level_range: Option<LevelRange>,
    pub class_names: Vec<String>,
}

pub fn statistics(repo: &Repository<CharacterClass>) -> EldenDataResult<ClassStatistics> {
    let classes = repo.find_all(&Filter::new())?;
    let mut archetype_distribution = BTreeMap::new();
    for class in &classes {
        *archetype_distribution.entry(class.archetype).or_insert(0) += 1;
    }
    let levels: Vec<f64> = classes.iter().filter_map(|c| c.starting_level).collect();
    let level_range = match (
        levels.iter().copied().reduce(f64::min),
        levels.iter().copied().reduce(f64::max),
    ) {
        (Some(min), Some(max)) => Some(LevelRange {
            min,
            max,
            avg: round2(levels.iter().sum::<f64>() / levels.len() as f64),
        }),
        _ => None,
    };
    Ok(ClassStatistics {
        total_classes: classes.len(),
        archetype_distribution,
        level_range,
        class_names: classes.into_iter().map(|c| c.name).collect(),
    })
}
