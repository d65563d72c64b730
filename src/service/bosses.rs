//! Boss filters, groupings and drop analysis.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::{count_by, non_blank, GroupCount, Repository};
use crate::error::EldenDataResult;
use crate::models::{Boss, BossTier};
use crate::store::filter::{contains_ci, exact_ci};
use crate::store::{Condition, Filter};

const REMEMBRANCE: &str = "Remembrance";
const GREAT_RUNE: &str = "Great Rune";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BossFilter {
    pub name: Option<String>,
    pub region: Option<String>,
    pub location: Option<String>,
    pub has_drops: Option<bool>,
    pub drop_item: Option<String>,
    pub has_remembrance: Option<bool>,
    pub has_great_rune: Option<bool>,
    pub boss_tier: Option<String>,
    pub is_required: Option<bool>,
}

fn drops_matching(text: &str) -> EldenDataResult<Condition> {
    Ok(Condition::ElemMatchRegex(contains_ci(text)?))
}

fn negate(condition: Condition) -> Condition {
    Condition::Not(Box::new(condition))
}

impl BossFilter {
    /// Every drop condition is its own clause, so they all apply together.
    pub fn to_filter(&self) -> EldenDataResult<Filter> {
        let mut filter = Filter::new();
        if let Some(name) = non_blank(&self.name) {
            filter.add("name", Condition::Regex(contains_ci(name)?));
        }
        if let Some(region) = non_blank(&self.region) {
            filter.add("region", Condition::Regex(exact_ci(region)?));
        }
        if let Some(location) = non_blank(&self.location) {
            filter.add("location", Condition::Regex(contains_ci(location)?));
        }
        match self.has_drops {
            Some(true) => filter.add("drops", Condition::NotEmpty),
            Some(false) => filter.add("drops", negate(Condition::NotEmpty)),
            None => {}
        }
        if let Some(item) = non_blank(&self.drop_item) {
            filter.add("drops", Condition::Regex(contains_ci(item)?));
        }
        match self.has_remembrance {
            Some(true) => filter.add("drops", drops_matching(REMEMBRANCE)?),
            Some(false) => filter.add("drops", negate(drops_matching(REMEMBRANCE)?)),
            None => {}
        }
        for wanted in [self.has_great_rune, self.is_required].into_iter().flatten() {
            let condition = drops_matching(GREAT_RUNE)?;
            filter.add("drops", if wanted { condition } else { negate(condition) });
        }
        if let Some(tier) = non_blank(&self.boss_tier) {
            let tier: BossTier = tier.parse()?;
            let (remembrance, great_rune) = (drops_matching(REMEMBRANCE)?, drops_matching(GREAT_RUNE)?);
            match tier {
                BossTier::Legendary => filter.add("drops", great_rune),
                BossTier::Major => {
                    filter.add("drops", remembrance);
                    filter.add("drops", negate(great_rune));
                }
                BossTier::Minor => {
                    filter.add("drops", negate(remembrance));
                    filter.add("drops", negate(great_rune));
                }
            }
        }
        Ok(filter)
    }
}

pub fn by_region(repo: &Repository<Boss>, region: &str) -> EldenDataResult<Vec<Boss>> {
    repo.find_all(&Filter::new().with("region", Condition::Regex(exact_ci(region.trim())?)))
}

pub fn search_by_drop(repo: &Repository<Boss>, item: &str) -> EldenDataResult<Vec<Boss>> {
    repo.find_all(&Filter::new().with("drops", drops_matching(item.trim())?))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionGroup {
    pub region: String,
    pub boss_count: usize,
    pub bosses: Vec<Boss>,
}

/// Bosses with a region, grouped by it, largest group first.
pub fn grouped_by_region(repo: &Repository<Boss>) -> EldenDataResult<Vec<RegionGroup>> {
    let mut groups: BTreeMap<String, Vec<Boss>> = BTreeMap::new();
    for boss in repo.find_all(&Filter::new().with("region", Condition::NotNull))? {
        if let Some(region) = boss.region.clone() {
            groups.entry(region).or_default().push(boss);
        }
    }
    let mut grouped: Vec<RegionGroup> = groups
        .into_iter()
        .map(|(region, bosses)| RegionGroup {
            region,
            boss_count: bosses.len(),
            bosses,
        })
        .collect();
    grouped.sort_by(|a, b| b.boss_count.cmp(&a.boss_count));
    Ok(grouped)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierGroup {
    pub tier: BossTier,
    pub boss_count: usize,
    pub bosses: Vec<Boss>,
    pub total_drops: usize,
}

/// Non-empty tiers, Legendary first.
pub fn grouped_by_tier(repo: &Repository<Boss>) -> EldenDataResult<Vec<TierGroup>> {
    let bosses = repo.find_all(&Filter::new())?;
    Ok(BossTier::ALL
        .iter()
        .filter_map(|tier| {
            let members: Vec<Boss> = bosses.iter().filter(|b| b.boss_tier == *tier).cloned().collect();
            (!members.is_empty()).then(|| TierGroup {
                tier: *tier,
                boss_count: members.len(),
                total_drops: members.iter().map(|b| b.drop_count).sum(),
                bosses: members,
            })
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropAnalysis {
    pub item_name: String,
    pub dropped_by: Vec<String>,
    pub drop_count: usize,
}

/// Every distinct drop with the bosses dropping it, most common first.
pub fn drop_analysis(repo: &Repository<Boss>) -> EldenDataResult<Vec<DropAnalysis>> {
    let mut items: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for boss in repo.find_all(&Filter::new().with("drops", Condition::NotEmpty))? {
        for item in boss.drops.iter().flatten() {
            items.entry(item.clone()).or_default().push(boss.name.clone());
        }
    }
    let mut analysis: Vec<DropAnalysis> = items
        .into_iter()
        .map(|(item_name, dropped_by)| DropAnalysis {
            item_name,
            drop_count: dropped_by.len(),
            dropped_by,
        })
        .collect();
    analysis.sort_by(|a, b| b.drop_count.cmp(&a.drop_count));
    Ok(analysis)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShardbearerAnalysis {
    pub total_shardbearers: usize,
    pub shardbearers: Vec<Boss>,
    pub great_runes: Vec<String>,
    pub regions_with_shardbearers: Vec<String>,
}

pub fn shardbearers(repo: &Repository<Boss>) -> EldenDataResult<ShardbearerAnalysis> {
    let shardbearers = repo.find_all(&Filter::new().with("drops", drops_matching(GREAT_RUNE)?))?;
    let great_runes = shardbearers
        .iter()
        .flat_map(|b| b.drops.iter().flatten())
        .filter(|item| item.contains(GREAT_RUNE))
        .cloned()
        .collect();
    let regions: BTreeSet<String> = shardbearers.iter().filter_map(|b| b.region.clone()).collect();
    Ok(ShardbearerAnalysis {
        total_shardbearers: shardbearers.len(),
        shardbearers,
        great_runes,
        regions_with_shardbearers: regions.into_iter().collect(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BossStatistics {
    pub total_bosses: usize,
    pub bosses_by_region: Vec<GroupCount>,
    pub total_unique_drops: usize,
    pub bosses_with_drops: usize,
    pub bosses_without_drops: usize,
}

pub fn statistics(repo: &Repository<Boss>) -> EldenDataResult<BossStatistics> {
    let bosses = repo.find_all(&Filter::new())?;
    let with_drops = bosses.iter().filter(|b| b.drop_count > 0).count();
    let unique: BTreeSet<&String> = bosses.iter().flat_map(|b| b.drops.iter().flatten()).collect();
    Ok(BossStatistics {
        total_bosses: bosses.len(),
        bosses_by_region: count_by(bosses.iter().filter_map(|b| b.region.clone()).map(Some)),
        total_unique_drops: unique.len(),
        bosses_with_drops: with_drops,
        bosses_without_drops: bosses.len() - with_drops,
    })
}
