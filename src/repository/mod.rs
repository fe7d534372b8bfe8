//! Repository layer for database operations
//!
//! Repositories never own a connection: every method runs on the session
//! handed in by the service, either a pooled connection for reads or an open
//! transaction for writes that must commit together.

pub mod books;
pub mod borrows;
pub mod members;

use sqlx::{pool::PoolConnection, Pool, Postgres, Transaction};

use crate::error::AppResult;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub members: members::MembersRepository,
    pub borrows: borrows::BorrowsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository,
            members: members::MembersRepository,
            borrows: borrows::BorrowsRepository,
            pool,
        }
    }

    /// Check out a pooled connection; it returns to the pool when dropped
    pub async fn acquire(&self) -> AppResult<PoolConnection<Postgres>> {
        Ok(self.pool.acquire().await?)
    }

    /// Open a transaction; it rolls back when dropped without `commit`
    pub async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        Ok(self.pool.begin().await?)
    }

    /// Round-trip to the database
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
