//! Member model and related types

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").expect("valid email regex")
});

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9 ().\-]+$").expect("valid phone regex"));

/// Member record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Member {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Only active members may borrow
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Member fields embedded in borrow details
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MemberSummary {
    pub id: i32,
    pub name: String,
    pub email: String,
}

/// Create member request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateMember {
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: String,
    #[validate(
        length(max = 255, message = "Email must be at most 255 characters"),
        custom(function = "validate_email_format")
    )]
    pub email: String,
    #[validate(
        length(min = 10, max = 20, message = "Phone must be between 10 and 20 characters"),
        custom(function = "validate_phone_format")
    )]
    pub phone: Option<String>,
}

impl CreateMember {
    /// Trim text, lower-case the email and turn a blank phone into none
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.email = normalize_email(&self.email);
        self.phone = self.phone.and_then(normalize_phone);
        self
    }
}

/// Update member request.
///
/// Absent fields are left unchanged; `phone` may be `null` to clear it.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateMember {
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: Option<String>,
    #[validate(
        length(max = 255, message = "Email must be at most 255 characters"),
        custom(function = "validate_email_format")
    )]
    pub email: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    #[validate(
        length(min = 10, max = 20, message = "Phone must be between 10 and 20 characters"),
        custom(function = "validate_phone_format")
    )]
    pub phone: Option<Option<String>>,
    /// Inactive members cannot borrow
    pub active: Option<bool>,
}

impl UpdateMember {
    pub fn normalized(mut self) -> Self {
        self.name = self.name.map(|n| n.trim().to_string());
        self.email = self.email.map(|e| normalize_email(&e));
        self.phone = self.phone.map(|p| p.and_then(normalize_phone));
        self
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn normalize_phone(phone: String) -> Option<String> {
    let trimmed = phone.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn validate_email_format(email: &str) -> Result<(), ValidationError> {
    if email.contains("..") || !EMAIL_RE.is_match(email) {
        let mut err = ValidationError::new("email");
        err.message = Some("Invalid email format".into());
        return Err(err);
    }
    Ok(())
}

fn validate_phone_format(phone: &str) -> Result<(), ValidationError> {
    if !PHONE_RE.is_match(phone) || !phone.chars().any(|c| c.is_ascii_digit()) {
        let mut err = ValidationError::new("phone");
        err.message = Some("Phone may only contain digits, spaces, - . ( ) and a leading +".into());
        return Err(err);
    }
    Ok(())
}
