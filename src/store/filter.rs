//! Document predicates and query options.

use std::cmp::Ordering;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Document;
use crate::error::{EldenDataError, EldenDataResult};

/// A single condition on the value found at a dotted path.
#[derive(Debug, Clone)]
pub enum Condition {
    Eq(Value),
    In(Vec<Value>),
    Gte(f64),
    Gt(f64),
    Lte(f64),
    Regex(Regex),
    Exists(bool),
    NotNull,
    NotEmpty,
    ElemMatchRegex(Regex),
    Not(Box<Condition>),
}

impl Condition {
    fn matches(&self, found: Option<&Value>) -> bool {
        match self {
            Condition::Exists(expected) => found.is_some() == *expected,
            Condition::NotNull => found.map_or(false, |v| !v.is_null()),
            Condition::NotEmpty => found
                .and_then(Value::as_array)
                .map_or(false, |items| !items.is_empty()),
            Condition::Eq(expected) => found.map_or(false, |v| value_eq_or_contains(v, expected)),
            Condition::In(options) => found.map_or(false, |v| {
                options.iter().any(|option| value_eq_or_contains(v, option))
            }),
            Condition::Gte(bound) => number_at(found).map_or(false, |n| n >= *bound),
            Condition::Gt(bound) => number_at(found).map_or(false, |n| n > *bound),
            Condition::Lte(bound) => number_at(found).map_or(false, |n| n <= *bound),
            Condition::Regex(re) => match found {
                Some(Value::String(s)) => re.is_match(s),
                Some(Value::Array(items)) => items
                    .iter()
                    .any(|item| item.as_str().map_or(false, |s| re.is_match(s))),
                _ => false,
            },
            Condition::ElemMatchRegex(re) => found
                .and_then(Value::as_array)
                .map_or(false, |items| {
                    items
                        .iter()
                        .any(|item| item.as_str().map_or(false, |s| re.is_match(s)))
                }),
            Condition::Not(inner) => !inner.matches(found),
        }
    }
}

fn number_at(found: Option<&Value>) -> Option<f64> {
    found.and_then(Value::as_f64)
}

fn scalar_eq(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Array fields match when any element equals the expected scalar.
fn value_eq_or_contains(found: &Value, expected: &Value) -> bool {
    if scalar_eq(found, expected) {
        return true;
    }
    match found {
        Value::Array(items) if !expected.is_array() => {
            items.iter().any(|item| scalar_eq(item, expected))
        }
        _ => false,
    }
}

/// Builds a case-insensitive regex matching `text` literally anywhere in a string.
pub fn contains_ci(text: &str) -> EldenDataResult<Regex> {
    RegexBuilder::new(&regex::escape(text))
        .case_insensitive(true)
        .build()
        .map_err(|e| EldenDataError::bad_request(format!("invalid search text: {}", e)))
}

/// Builds a case-insensitive regex anchored to the whole string.
pub fn exact_ci(text: &str) -> EldenDataResult<Regex> {
    RegexBuilder::new(&format!("^{}$", regex::escape(text)))
        .case_insensitive(true)
        .build()
        .map_err(|e| EldenDataError::bad_request(format!("invalid search text: {}", e)))
}

/// Resolves a dotted path inside a document.
pub fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = doc.get(segments.next()?)?;
    segments.try_fold(first, |current, segment| current.as_object()?.get(segment))
}

/// Conjunction of path conditions plus any number of disjunction groups.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    clauses: Vec<(String, Condition)>,
    any_groups: Vec<Vec<Filter>>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty() && self.any_groups.is_empty()
    }

    pub fn with(mut self, path: impl Into<String>, condition: Condition) -> Self {
        self.clauses.push((path.into(), condition));
        self
    }

    pub fn add(&mut self, path: impl Into<String>, condition: Condition) {
        self.clauses.push((path.into(), condition));
    }

    pub fn equals(self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(path, Condition::Eq(value.into()))
    }

    /// Adds `min <= path <= max`, skipping absent bounds.
    pub fn range(mut self, path: &str, min: Option<f64>, max: Option<f64>) -> Self {
        if let Some(min) = min {
            self.add(path, Condition::Gte(min));
        }
        if let Some(max) = max {
            self.add(path, Condition::Lte(max));
        }
        self
    }

    /// Requires at least one of `alternatives` to match.
    pub fn any(mut self, alternatives: Vec<Filter>) -> Self {
        self.any_groups.push(alternatives);
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.clauses
            .iter()
            .all(|(path, condition)| condition.matches(lookup(doc, path)))
            && self
                .any_groups
                .iter()
                .all(|group| group.iter().any(|alternative| alternative.matches(doc)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    /// Maps the `1` / `-1` convention used by API clients.
    pub fn from_sign(sign: i32) -> EldenDataResult<Self> {
        match sign {
            1 => Ok(SortOrder::Ascending),
            -1 => Ok(SortOrder::Descending),
            other => Err(EldenDataError::bad_request(format!(
                "sort_order must be 1 or -1, got {}",
                other
            ))),
        }
    }
}

/// Sorting and paging applied after filtering.
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    pub sort_by: Option<String>,
    pub sort_order: SortOrder,
    pub skip: usize,
    pub limit: Option<usize>,
}

impl FindOptions {
    pub fn sorted(path: impl Into<String>, order: SortOrder) -> Self {
        Self {
            sort_by: Some(path.into()),
            sort_order: order,
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Bool(_)) => 3,
        Some(_) => 4,
    }
}

/// Total order over values at `path`: missing/null, numbers, strings, then the rest.
pub fn compare_at(a: &Document, b: &Document, path: &str) -> Ordering {
    let (left, right) = (lookup(a, path), lookup(b, path));
    match (left, right) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => type_rank(left).cmp(&type_rank(right)),
    }
}
