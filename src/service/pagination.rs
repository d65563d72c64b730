use serde::{Deserialize, Serialize};

use crate::error::{EldenDataError, EldenDataResult};
use crate::store::{FindOptions, SortOrder};

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

fn default_limit() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_sort_order() -> i32 {
    1
}

/// Paging parameters accepted by list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default = "default_sort_order")]
    pub sort_order: i32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_PAGE_SIZE,
            sort_by: None,
            sort_order: 1,
        }
    }
}

impl Pagination {
    pub fn new(skip: usize, limit: usize) -> Self {
        Self {
            skip,
            limit,
            ..Self::default()
        }
    }

    /// Checks the bounds and converts into store options.
    pub fn to_find_options(&self, max_page_size: usize) -> EldenDataResult<FindOptions> {
        if self.limit == 0 || self.limit > max_page_size {
            return Err(EldenDataError::bad_request(format!(
                "limit must be between 1 and {}, got {}",
                max_page_size, self.limit
            )));
        }
        Ok(FindOptions {
            sort_by: self.sort_by.clone().filter(|s| !s.trim().is_empty()),
            sort_order: SortOrder::from_sign(self.sort_order)?,
            skip: self.skip,
            limit: Some(self.limit),
        })
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub skip: usize,
    pub limit: usize,
}

impl<T> Page<T> {
    /// Pages an already filtered and ordered list held in memory.
    pub fn from_items(items: Vec<T>, pagination: &Pagination, max_page_size: usize) -> EldenDataResult<Self> {
        pagination.to_find_options(max_page_size)?;
        let total = items.len();
        let items = items
            .into_iter()
            .skip(pagination.skip)
            .take(pagination.limit)
            .collect();
        Ok(Page {
            items,
            total,
            skip: pagination.skip,
            limit: pagination.limit,
        })
    }
}
