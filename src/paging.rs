//! Page requests: boundary (1-based) parameters normalized to zero-based index, size and sort.

use crate::config::PagingConfig;
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(AppError::InvalidArgument(format!(
                "sort order must be 'asc' or 'desc', got '{}'",
                other
            ))),
        }
    }
}

/// Sort column as given by the client (not yet checked against the field registry) and direction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Sort {
    pub column: String,
    pub direction: SortDirection,
}

/// Zero-based page index, page size and ordering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: Sort,
}

impl PageRequest {
    /// Normalize boundary parameters. `page_no` is 1-based; anything below 2 maps to page index 0.
    /// `column` is passed through; repositories reject names outside the field registry.
    pub fn normalize(
        page_no: i64,
        page_size: i64,
        column: &str,
        order: &str,
        limits: &PagingConfig,
    ) -> Result<Self, AppError> {
        let page = page_no.saturating_sub(1).max(0);
        let page = u32::try_from(page).map_err(|_| AppError::InvalidArgument(format!("page number {} is too large", page_no)))?;
        if page_size < 1 {
            return Err(AppError::InvalidArgument(format!(
                "page size must be at least 1, got {}",
                page_size
            )));
        }
        let max = limits.max_page_size.clamp(1, i64::from(u32::MAX));
        let size = u32::try_from(page_size.min(max)).unwrap_or(u32::MAX);
        Ok(PageRequest {
            page,
            size,
            sort: Sort {
                column: column.trim().to_string(),
                direction: order.parse()?,
            },
        })
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

/// Query string of `get-all`: `?pageNo=&pageSize=&column=&order=`. Missing values take the configured defaults.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub page_no: Option<i64>,
    pub page_size: Option<i64>,
    pub column: Option<String>,
    pub order: Option<String>,
}

/// [`PageParams`] with every default filled in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedPageParams {
    pub page_no: i64,
    pub page_size: i64,
    pub column: String,
    pub order: String,
}

impl PageParams {
    pub fn with_defaults(self, defaults: &PagingConfig) -> ResolvedPageParams {
        ResolvedPageParams {
            page_no: self.page_no.unwrap_or(0),
            page_size: self.page_size.unwrap_or(defaults.default_page_size),
            column: self.column.unwrap_or_else(|| defaults.default_sort_column.clone()),
            order: self.order.unwrap_or_else(|| defaults.default_sort_order.clone()),
        }
    }
}
