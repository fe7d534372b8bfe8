//! Book catalog service

use crate::{
    config::CatalogConfig,
    error::{AppError, AppResult},
    models::{
        book::{Book, CreateBook, UpdateBook},
        pagination::{PageQuery, Paginated, Pagination},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
    catalog: CatalogConfig,
}

impl BooksService {
    pub fn new(repository: Repository, catalog: CatalogConfig) -> Self {
        Self {
            repository,
            catalog,
        }
    }

    /// List books one page at a time
    pub async fn list(&self, query: &PageQuery) -> AppResult<Paginated<Book>> {
        tracing::info!("Listing books (page={}, limit={})", query.page(), query.limit());

        let mut conn = self.repository.acquire().await?;
        let total = self.repository.books.count(&mut conn).await?;
        let pagination = Pagination::new(total, query).inspect_err(|e| {
            tracing::warn!("Rejected book listing: {}", e);
        })?;

        let books = if pagination.pages == 0 {
            Vec::new()
        } else {
            self.repository
                .books
                .list(&mut conn, query.offset(), query.limit())
                .await?
        };
        Ok(Paginated::new(books, pagination))
    }

    /// Get a book by ID
    pub async fn get(&self, id: i32) -> AppResult<Book> {
        let mut conn = self.repository.acquire().await?;
        self.repository
            .books
            .get_by_id(&mut conn, id)
            .await?
            .ok_or_else(|| book_not_found(id))
    }

    /// Create a book
    pub async fn create(&self, data: &CreateBook) -> AppResult<Book> {
        tracing::info!("Creating book: {}", data.title);
        self.check_published_year(data.published_year)?;

        let mut conn = self.repository.acquire().await?;
        let book = self.repository.books.create(&mut conn, data).await?;

        tracing::info!("Book created: {}", book.id);
        Ok(book)
    }

    /// Update the fields present in `data`
    pub async fn update(&self, id: i32, data: &UpdateBook) -> AppResult<Book> {
        tracing::info!("Updating book {}", id);
        self.check_published_year(data.new_published_year())?;

        let mut conn = self.repository.acquire().await?;
        let book = self
            .repository
            .books
            .update(&mut conn, id, data)
            .await?
            .ok_or_else(|| book_not_found(id))?;

        tracing::info!("Book updated: {}", id);
        Ok(book)
    }

    fn check_published_year(&self, year: Option<i32>) -> AppResult<()> {
        check_published_year(year, self.catalog.max_published_year)
    }
}

pub(crate) fn book_not_found(id: i32) -> AppError {
    tracing::warn!("Book not found: {}", id);
    AppError::NotFound(format!("Book with id {} not found", id))
}

fn check_published_year(year: Option<i32>, max_year: i32) -> AppResult<()> {
    match year {
        Some(year) if year > max_year => {
            tracing::warn!("Rejected future published year {}", year);
            Err(AppError::InvalidOperation(format!(
                "Published year cannot be in the future (provided: {})",
                year
            )))
        }
        _ => Ok(()),
    }
}
