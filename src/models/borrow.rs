//! Borrow record model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::book::BookSummary;
use super::member::MemberSummary;
use super::pagination::PageQuery;

/// Borrow record from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowRecord {
    pub id: i32,
    pub book_id: i32,
    pub member_id: i32,
    pub borrowed_at: DateTime<Utc>,
    /// Null while the book is on loan; set once on return
    pub returned_at: Option<DateTime<Utc>>,
}

impl BorrowRecord {
    pub fn is_returned(&self) -> bool {
        self.returned_at.is_some()
    }
}

/// Borrow record with the book and member it links
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BorrowDetails {
    pub id: i32,
    pub book_id: i32,
    pub member_id: i32,
    pub borrowed_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub book: BookSummary,
    pub member: MemberSummary,
}

/// Flat row produced by the borrow/book/member join
#[derive(Debug, FromRow)]
pub struct BorrowDetailsRow {
    pub id: i32,
    pub book_id: i32,
    pub member_id: i32,
    pub borrowed_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub book_title: String,
    pub book_author: String,
    pub book_published_year: Option<i32>,
    pub member_name: String,
    pub member_email: String,
}

impl From<BorrowDetailsRow> for BorrowDetails {
    fn from(row: BorrowDetailsRow) -> Self {
        Self {
            id: row.id,
            book_id: row.book_id,
            member_id: row.member_id,
            borrowed_at: row.borrowed_at,
            returned_at: row.returned_at,
            book: BookSummary {
                id: row.book_id,
                title: row.book_title,
                author: row.book_author,
                published_year: row.book_published_year,
            },
            member: MemberSummary {
                id: row.member_id,
                name: row.member_name,
                email: row.member_email,
            },
        }
    }
}

/// Borrow request
#[derive(Debug, Clone, Copy, Deserialize, Validate, ToSchema)]
pub struct CreateBorrow {
    #[validate(range(min = 1, message = "Book id must be positive"))]
    pub book_id: i32,
    #[validate(range(min = 1, message = "Member id must be positive"))]
    pub member_id: i32,
}

/// Borrow listing filters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BorrowFilter {
    /// `Some(false)` keeps only open loans; `Some(true)` and `None` keep all
    pub returned: Option<bool>,
    pub member_id: Option<i32>,
    pub book_id: Option<i32>,
}

/// Borrow listing query parameters
#[derive(Debug, Clone, Copy, Deserialize, Validate, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BorrowQuery {
    /// `false` keeps only unreturned records; `true` (default) lists all
    pub returned: Option<bool>,
    #[validate(range(min = 1, message = "Member id must be positive"))]
    pub member_id: Option<i32>,
    #[validate(range(min = 1, message = "Book id must be positive"))]
    pub book_id: Option<i32>,
    /// Page number, starting at 1 (default: 1)
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: Option<i64>,
    /// Records per page, 1 to 100 (default: 10)
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<i64>,
}

impl BorrowQuery {
    pub fn filter(&self) -> BorrowFilter {
        BorrowFilter {
            returned: self.returned,
            member_id: self.member_id,
            book_id: self.book_id,
        }
    }

    pub fn page_query(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            limit: self.limit,
        }
    }
}
