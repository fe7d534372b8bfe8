//! Members repository for database operations

use chrono::Utc;
use sqlx::PgConnection;

use crate::{
    error::AppResult,
    models::member::{CreateMember, Member, UpdateMember},
};

#[derive(Clone, Copy, Default)]
pub struct MembersRepository;

impl MembersRepository {
    /// Count all members
    pub async fn count(&self, conn: &mut PgConnection) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members")
            .fetch_one(conn)
            .await?;
        Ok(total)
    }

    /// List one page of members, oldest first
    pub async fn list(
        &self,
        conn: &mut PgConnection,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<Member>> {
        let members = sqlx::query_as::<_, Member>(
            "SELECT * FROM members ORDER BY id LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(conn)
        .await?;

        Ok(members)
    }

    /// Get member by ID
    pub async fn get_by_id(&self, conn: &mut PgConnection, id: i32) -> AppResult<Option<Member>> {
        let member = sqlx::query_as::<_, Member>("SELECT * FROM members WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await?;
        Ok(member)
    }

    /// Create a new member. A taken email surfaces as a unique violation.
    pub async fn create(&self, conn: &mut PgConnection, data: &CreateMember) -> AppResult<Member> {
        let now = Utc::now();

        let member = sqlx::query_as::<_, Member>(
            r#"
            INSERT INTO members (name, email, phone, active, created_at, updated_at)
            VALUES ($1, $2, $3, TRUE, $4, $4)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(now)
        .fetch_one(conn)
        .await?;

        Ok(member)
    }

    /// Apply the fields present in `data`; `None` when the member does not exist
    pub async fn update(
        &self,
        conn: &mut PgConnection,
        id: i32,
        data: &UpdateMember,
    ) -> AppResult<Option<Member>> {
        let now = Utc::now();
        let mut sets = vec!["updated_at = $2".to_string()];
        let mut idx = 3;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.name, "name");
        add_field!(data.email, "email");
        add_field!(data.phone, "phone");
        add_field!(data.active, "active");

        let query = format!("UPDATE members SET {} WHERE id = $1 RETURNING *", sets.join(", "));

        let mut builder = sqlx::query_as::<_, Member>(&query).bind(id).bind(now);

        if let Some(ref name) = data.name {
            builder = builder.bind(name);
        }
        if let Some(ref email) = data.email {
            builder = builder.bind(email);
        }
        if let Some(ref phone) = data.phone {
            builder = builder.bind(phone);
        }
        if let Some(active) = data.active {
            builder = builder.bind(active);
        }

        let member = builder.fetch_optional(conn).await?;
        Ok(member)
    }
}
