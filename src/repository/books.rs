//! Books repository for database operations

use chrono::Utc;
use sqlx::PgConnection;

use crate::{
    error::AppResult,
    models::book::{Book, CreateBook, UpdateBook},
};

#[derive(Clone, Copy, Default)]
pub struct BooksRepository;

impl BooksRepository {
    /// Count all books
    pub async fn count(&self, conn: &mut PgConnection) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(conn)
            .await?;
        Ok(total)
    }

    /// List one page of books, oldest first
    pub async fn list(
        &self,
        conn: &mut PgConnection,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT * FROM books ORDER BY id LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(conn)
        .await?;

        tracing::debug!("Retrieved {} books", books.len());
        Ok(books)
    }

    /// Get book by ID
    pub async fn get_by_id(&self, conn: &mut PgConnection, id: i32) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await?;
        Ok(book)
    }

    /// Get book by ID and lock its row until the transaction ends
    pub async fn get_by_id_for_update(
        &self,
        conn: &mut PgConnection,
        id: i32,
    ) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?;
        Ok(book)
    }

    /// Create a new book; it starts available
    pub async fn create(&self, conn: &mut PgConnection, data: &CreateBook) -> AppResult<Book> {
        let now = Utc::now();

        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, published_year, available, created_at, updated_at)
            VALUES ($1, $2, $3, TRUE, $4, $4)
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(&data.author)
        .bind(data.published_year)
        .bind(now)
        .fetch_one(conn)
        .await?;

        Ok(book)
    }

    /// Apply the fields present in `data`; `None` when the book does not exist
    pub async fn update(
        &self,
        conn: &mut PgConnection,
        id: i32,
        data: &UpdateBook,
    ) -> AppResult<Option<Book>> {
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

        add_field!(data.title, "title");
        add_field!(data.author, "author");
        add_field!(data.published_year, "published_year");

        let query = format!("UPDATE books SET {} WHERE id = $1 RETURNING *", sets.join(", "));

        let mut builder = sqlx::query_as::<_, Book>(&query).bind(id).bind(now);

        if let Some(ref title) = data.title {
            builder = builder.bind(title);
        }
        if let Some(ref author) = data.author {
            builder = builder.bind(author);
        }
        if let Some(year) = data.published_year {
            builder = builder.bind(year);
        }

        let book = builder.fetch_optional(conn).await?;
        Ok(book)
    }

    /// Set the availability flag; part of the borrow/return unit of work
    pub async fn set_available(
        &self,
        conn: &mut PgConnection,
        id: i32,
        available: bool,
    ) -> AppResult<()> {
        sqlx::query("UPDATE books SET available = $1, updated_at = $2 WHERE id = $3")
            .bind(available)
            .bind(Utc::now())
            .bind(id)
            .execute(conn)
            .await?;
        Ok(())
    }
}
