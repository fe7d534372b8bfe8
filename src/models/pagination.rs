//! Offset pagination shared by every list endpoint

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{AppError, AppResult};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

/// Page selection query parameters
#[derive(Debug, Clone, Copy, Deserialize, Validate, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page number, starting at 1 (default: 1)
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: Option<i64>,
    /// Records per page, 1 to 100 (default: 10)
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<i64>,
}

impl PageQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(DEFAULT_PAGE)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }

    /// Rows to skip; saturates instead of overflowing on absurd pages
    pub fn offset(&self) -> i64 {
        self.page().saturating_sub(1).saturating_mul(self.limit())
    }
}

/// Pagination metadata returned next to each page of data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Pagination {
    /// Total number of matching records
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Records per page
    pub limit: i64,
    /// Total number of pages
    pub pages: i64,
}

impl Pagination {
    /// Build metadata for `query` over `total` records.
    ///
    /// Requesting a page past the last one is an error, except when there
    /// are no records at all: an empty first page is a valid answer.
    pub fn new(total: i64, query: &PageQuery) -> AppResult<Self> {
        let page = query.page();
        let limit = query.limit();
        let pages = (total + limit - 1) / limit;

        if pages > 0 && page > pages {
            return Err(AppError::InvalidOperation(format!(
                "Page {} exceeds total pages {}",
                page, pages
            )));
        }

        Ok(Self {
            total,
            page,
            limit,
            pages,
        })
    }
}

/// Paginated response envelope
#[derive(Debug, Serialize, ToSchema)]
pub struct Paginated<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// Records of the current page
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Paginated<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub fn new(data: Vec<T>, pagination: Pagination) -> Self {
        Self { data, pagination }
    }
}
