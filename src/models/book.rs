//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Book record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub published_year: Option<i32>,
    /// False while an unreturned borrow record exists for the book
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Book fields embedded in borrow details
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookSummary {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub published_year: Option<i32>,
}

/// Create book request.
///
/// New books always start available; an `available` field in the body is
/// ignored.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 255, message = "Author must be between 1 and 255 characters"))]
    pub author: String,
    #[validate(range(min = 1000, max = 2100, message = "Published year must be between 1000 and 2100"))]
    pub published_year: Option<i32>,
}

impl CreateBook {
    /// Trim surrounding whitespace from text fields
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.author = self.author.trim().to_string();
        self
    }
}

/// Update book request.
///
/// Absent fields are left unchanged. `published_year` may also be sent as
/// `null` to clear it. Availability is owned by the borrow workflow and
/// cannot be patched.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Author must be between 1 and 255 characters"))]
    pub author: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>)]
    #[validate(range(min = 1000, max = 2100, message = "Published year must be between 1000 and 2100"))]
    pub published_year: Option<Option<i32>>,
}

impl UpdateBook {
    pub fn normalized(mut self) -> Self {
        self.title = self.title.map(|t| t.trim().to_string());
        self.author = self.author.map(|a| a.trim().to_string());
        self
    }

    /// Year that would be stored after applying the patch, if one is set
    pub fn new_published_year(&self) -> Option<i32> {
        self.published_year.flatten()
    }
}
