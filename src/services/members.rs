//! Member management service

use crate::{
    error::{AppError, AppResult},
    models::{
        member::{CreateMember, Member, UpdateMember},
        pagination::{PageQuery, Paginated, Pagination},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct MembersService {
    repository: Repository,
}

impl MembersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List members one page at a time
    pub async fn list(&self, query: &PageQuery) -> AppResult<Paginated<Member>> {
        tracing::info!("Listing members (page={}, limit={})", query.page(), query.limit());

        let mut conn = self.repository.acquire().await?;
        let total = self.repository.members.count(&mut conn).await?;
        let pagination = Pagination::new(total, query).inspect_err(|e| {
            tracing::warn!("Rejected member listing: {}", e);
        })?;

        let members = if pagination.pages == 0 {
            Vec::new()
        } else {
            self.repository
                .members
                .list(&mut conn, query.offset(), query.limit())
                .await?
        };
        Ok(Paginated::new(members, pagination))
    }

    /// Get a member by ID
    pub async fn get(&self, id: i32) -> AppResult<Member> {
        let mut conn = self.repository.acquire().await?;
        self.repository
            .members
            .get_by_id(&mut conn, id)
            .await?
            .ok_or_else(|| member_not_found(id))
    }

    /// Register a member; the email must not be taken
    pub async fn create(&self, data: &CreateMember) -> AppResult<Member> {
        tracing::info!("Creating member with email={}", data.email);

        let mut conn = self.repository.acquire().await?;
        let member = self
            .repository
            .members
            .create(&mut conn, data)
            .await
            .map_err(|e| duplicate_email(e, &data.email))?;

        tracing::info!("Member created: {}", member.id);
        Ok(member)
    }

    /// Update the fields present in `data`
    pub async fn update(&self, id: i32, data: &UpdateMember) -> AppResult<Member> {
        tracing::info!("Updating member {}", id);

        let mut conn = self.repository.acquire().await?;
        let member = self
            .repository
            .members
            .update(&mut conn, id, data)
            .await
            .map_err(|e| match data.email {
                Some(ref email) => duplicate_email(e, email),
                None => e,
            })?
            .ok_or_else(|| member_not_found(id))?;

        tracing::info!("Member updated: {}", id);
        Ok(member)
    }
}

pub(crate) fn member_not_found(id: i32) -> AppError {
    tracing::warn!("Member not found: {}", id);
    AppError::NotFound(format!("Member with id {} not found", id))
}

/// Turn a unique violation on the email column into a business-rule error
fn duplicate_email(err: AppError, email: &str) -> AppError {
    if err.is_unique_violation() {
        tracing::warn!("Rejected duplicate email {}", email);
        AppError::InvalidOperation(format!("Member with email {} already exists", email))
    } else {
        err
    }
}
