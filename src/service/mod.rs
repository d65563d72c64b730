//! Query layer over the document store.
//!
//! [`Repository`] carries the generic CRUD behaviour; each entity module adds its filters and
//! the derived queries built on top of it.

pub mod adapter;
pub mod armors;
pub mod bosses;
pub mod classes;
pub mod pagination;
pub mod repository;
pub mod spells;
pub mod weapons;

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::error::{EldenDataError, EldenDataResult};
use crate::models::round2;

pub use adapter::{adapt_document, prepare_payload};
pub use pagination::{Page, Pagination, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use repository::Repository;

/// Number of entities sharing one value of a grouping field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupCount {
    pub name: Option<String>,
    pub count: usize,
}

pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Rejects negative bounds and inverted ranges.
pub(crate) fn check_bounds(label: &str, min: Option<f64>, max: Option<f64>) -> EldenDataResult<()> {
    for bound in [min, max].into_iter().flatten() {
        if bound < 0.0 {
            return Err(EldenDataError::bad_request(format!(
                "{} bounds must be >= 0, got {}",
                label, bound
            )));
        }
    }
    if let (Some(min), Some(max)) = (min, max) {
        if max < min {
            return Err(EldenDataError::bad_request(format!(
                "max_{} must be greater than min_{}",
                label, label
            )));
        }
    }
    Ok(())
}

pub(crate) fn check_limit(limit: usize) -> EldenDataResult<usize> {
    if limit == 0 || limit > MAX_PAGE_SIZE {
        return Err(EldenDataError::bad_request(format!(
            "limit must be between 1 and {}, got {}",
            MAX_PAGE_SIZE, limit
        )));
    }
    Ok(limit)
}

/// Checks a comparison list: distinct ids, between `min` and `max` of them.
pub(crate) fn check_id_list(ids: &[String], min: usize, max: usize) -> EldenDataResult<()> {
    if ids.len() < min || ids.len() > max {
        return Err(EldenDataError::bad_request(format!(
            "between {} and {} ids are required, got {}",
            min,
            max,
            ids.len()
        )));
    }
    let distinct: HashSet<&str> = ids.iter().map(String::as_str).collect();
    if distinct.len() != ids.len() {
        return Err(EldenDataError::bad_request("duplicate ids cannot be compared"));
    }
    Ok(())
}

/// Mean of the present values, rounded to two decimals.
pub(crate) fn average<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| round2(sum / count as f64))
}

pub(crate) fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Counts occurrences, largest group first, ties by name.
pub(crate) fn count_by<I: IntoIterator<Item = Option<String>>>(keys: I) -> Vec<GroupCount> {
    let mut counts: BTreeMap<Option<String>, usize> = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_default() += 1;
    }
    let mut groups: Vec<GroupCount> = counts
        .into_iter()
        .map(|(name, count)| GroupCount { name, count })
        .collect();
    groups.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    groups
}
