//! Borrow records repository for database operations

use chrono::Utc;
use sqlx::PgConnection;

use crate::{
    error::AppResult,
    models::borrow::{BorrowDetails, BorrowDetailsRow, BorrowFilter, BorrowRecord},
};

const DETAILS_SELECT: &str = r#"
    SELECT br.id, br.book_id, br.member_id, br.borrowed_at, br.returned_at,
           b.title AS book_title, b.author AS book_author,
           b.published_year AS book_published_year,
           m.name AS member_name, m.email AS member_email
    FROM borrow_records br
    JOIN books b ON b.id = br.book_id
    JOIN members m ON m.id = br.member_id
"#;

#[derive(Clone, Copy, Default)]
pub struct BorrowsRepository;

/// WHERE clause and its bound ids for a borrow listing filter
fn filter_clause(filter: &BorrowFilter) -> (String, Vec<i32>) {
    let mut conditions = Vec::new();
    let mut params: Vec<i32> = Vec::new();

    // Only an explicit `returned=false` narrows the listing
    if filter.returned == Some(false) {
        conditions.push("br.returned_at IS NULL".to_string());
    }

    if let Some(member_id) = filter.member_id {
        params.push(member_id);
        conditions.push(format!("br.member_id = ${}", params.len()));
    }

    if let Some(book_id) = filter.book_id {
        params.push(book_id);
        conditions.push(format!("br.book_id = ${}", params.len()));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    (where_clause, params)
}

impl BorrowsRepository {
    /// Count borrow records matching `filter`
    pub async fn count(&self, conn: &mut PgConnection, filter: &BorrowFilter) -> AppResult<i64> {
        let (where_clause, params) = filter_clause(filter);

        let query = format!("SELECT COUNT(*) FROM borrow_records br {}", where_clause);
        let mut builder = sqlx::query_scalar::<_, i64>(&query);
        for param in &params {
            builder = builder.bind(param);
        }
        let total = builder.fetch_one(conn).await?;
        Ok(total)
    }

    /// List one page of borrow records matching `filter`, most recent first
    pub async fn list(
        &self,
        conn: &mut PgConnection,
        filter: &BorrowFilter,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<BorrowDetails>> {
        let (where_clause, params) = filter_clause(filter);

        let query = format!(
            "{} {} ORDER BY br.borrowed_at DESC, br.id DESC LIMIT ${} OFFSET ${}",
            DETAILS_SELECT,
            where_clause,
            params.len() + 1,
            params.len() + 2
        );
        let mut builder = sqlx::query_as::<_, BorrowDetailsRow>(&query);
        for param in &params {
            builder = builder.bind(param);
        }
        let rows = builder.bind(limit).bind(offset).fetch_all(conn).await?;

        tracing::debug!("Retrieved {} borrow records", rows.len());
        Ok(rows.into_iter().map(BorrowDetails::from).collect())
    }

    /// Get borrow record by ID
    pub async fn get_by_id(
        &self,
        conn: &mut PgConnection,
        id: i32,
    ) -> AppResult<Option<BorrowRecord>> {
        let record = sqlx::query_as::<_, BorrowRecord>("SELECT * FROM borrow_records WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await?;
        Ok(record)
    }

    /// Get borrow record by ID and lock its row until the transaction ends
    pub async fn get_by_id_for_update(
        &self,
        conn: &mut PgConnection,
        id: i32,
    ) -> AppResult<Option<BorrowRecord>> {
        let record = sqlx::query_as::<_, BorrowRecord>(
            "SELECT * FROM borrow_records WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;
        Ok(record)
    }

    /// Get a borrow record joined with its book and member
    pub async fn get_details(
        &self,
        conn: &mut PgConnection,
        id: i32,
    ) -> AppResult<Option<BorrowDetails>> {
        let query = format!("{} WHERE br.id = $1", DETAILS_SELECT);
        let row = sqlx::query_as::<_, BorrowDetailsRow>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await?;
        Ok(row.map(BorrowDetails::from))
    }

    /// Insert an open borrow record stamped with the current time
    pub async fn create(
        &self,
        conn: &mut PgConnection,
        book_id: i32,
        member_id: i32,
    ) -> AppResult<BorrowRecord> {
        let record = sqlx::query_as::<_, BorrowRecord>(
            r#"
            INSERT INTO borrow_records (book_id, member_id, borrowed_at, returned_at)
            VALUES ($1, $2, $3, NULL)
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(member_id)
        .bind(Utc::now())
        .fetch_one(conn)
        .await?;

        Ok(record)
    }

    /// Stamp `returned_at` on a record that is still open
    pub async fn mark_returned(&self, conn: &mut PgConnection, id: i32) -> AppResult<BorrowRecord> {
        let record = sqlx::query_as::<_, BorrowRecord>(
            r#"
            UPDATE borrow_records SET returned_at = $1
            WHERE id = $2 AND returned_at IS NULL
            RETURNING *
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .fetch_one(conn)
        .await?;

        Ok(record)
    }
}
