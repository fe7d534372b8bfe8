//! Borrow workflow service
//!
//! Borrowing and returning each run in a single transaction: the checks read
//! locked rows, and the borrow record and the book's availability flag are
//! written and committed together. Any early return drops the transaction,
//! which rolls it back.

use crate::{
    error::{AppError, AppResult},
    models::{
        borrow::{BorrowDetails, BorrowFilter, BorrowRecord, CreateBorrow},
        pagination::{PageQuery, Paginated, Pagination},
    },
    repository::Repository,
    services::{books::book_not_found, members::member_not_found},
};

#[derive(Clone)]
pub struct BorrowsService {
    repository: Repository,
}

impl BorrowsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List borrow records matching `filter`, most recent first
    pub async fn list(
        &self,
        filter: &BorrowFilter,
        query: &PageQuery,
    ) -> AppResult<Paginated<BorrowDetails>> {
        tracing::info!(
            "Listing borrow records (returned={:?}, member={:?}, book={:?}, page={}, limit={})",
            filter.returned,
            filter.member_id,
            filter.book_id,
            query.page(),
            query.limit()
        );

        let mut conn = self.repository.acquire().await?;
        let total = self.repository.borrows.count(&mut conn, filter).await?;
        let pagination = Pagination::new(total, query).inspect_err(|e| {
            tracing::warn!("Rejected borrow listing: {}", e);
        })?;

        let records = if pagination.pages == 0 {
            Vec::new()
        } else {
            self.repository
                .borrows
                .list(&mut conn, filter, query.offset(), query.limit())
                .await?
        };
        Ok(Paginated::new(records, pagination))
    }

    /// Get a borrow record with its book and member
    pub async fn get(&self, id: i32) -> AppResult<BorrowDetails> {
        let mut conn = self.repository.acquire().await?;
        self.repository
            .borrows
            .get_details(&mut conn, id)
            .await?
            .ok_or_else(|| borrow_not_found(id))
    }

    /// Lend a book to a member.
    ///
    /// Checks, in order: the book exists, the book is available, the member
    /// exists, the member is active. Nothing is written unless all pass.
    pub async fn borrow(&self, request: &CreateBorrow) -> AppResult<BorrowRecord> {
        let CreateBorrow { book_id, member_id } = *request;
        tracing::info!("Borrowing book {} for member {}", book_id, member_id);

        let mut tx = self.repository.begin().await?;

        let book = self
            .repository
            .books
            .get_by_id_for_update(&mut tx, book_id)
            .await?
            .ok_or_else(|| book_not_found(book_id))?;

        if !book.available {
            tracing::warn!("Book not available: {}", book_id);
            return Err(AppError::InvalidOperation(format!(
                "Book with id {} is not available",
                book_id
            )));
        }

        let member = self
            .repository
            .members
            .get_by_id(&mut tx, member_id)
            .await?
            .ok_or_else(|| member_not_found(member_id))?;

        if !member.active {
            tracing::warn!("Member not active: {}", member_id);
            return Err(AppError::InvalidOperation(format!(
                "Member with id {} is not active",
                member_id
            )));
        }

        let record = self.repository.borrows.create(&mut tx, book_id, member_id).await?;
        self.repository.books.set_available(&mut tx, book_id, false).await?;
        tx.commit().await?;

        tracing::info!("Borrow record created: {}", record.id);
        Ok(record)
    }

    /// Close a borrow record and make its book available again.
    ///
    /// Fails if the record does not exist, was already returned, or its book
    /// is gone.
    pub async fn return_borrow(&self, borrow_id: i32) -> AppResult<BorrowDetails> {
        tracing::info!("Returning borrow {}", borrow_id);

        let mut tx = self.repository.begin().await?;

        let record = self
            .repository
            .borrows
            .get_by_id_for_update(&mut tx, borrow_id)
            .await?
            .ok_or_else(|| borrow_not_found(borrow_id))?;

        if record.is_returned() {
            tracing::warn!("Borrow already returned: {}", borrow_id);
            return Err(AppError::InvalidOperation(format!(
                "Borrow record with id {} has already been returned",
                borrow_id
            )));
        }

        self.repository
            .books
            .get_by_id_for_update(&mut tx, record.book_id)
            .await?
            .ok_or_else(|| book_not_found(record.book_id))?;

        self.repository.borrows.mark_returned(&mut tx, borrow_id).await?;
        self.repository.books.set_available(&mut tx, record.book_id, true).await?;

        let details = self
            .repository
            .borrows
            .get_details(&mut tx, borrow_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!("Borrow record {} vanished during return", borrow_id))
            })?;
        tx.commit().await?;

        tracing::info!("Borrow record returned: {}", borrow_id);
        Ok(details)
    }
}

fn borrow_not_found(id: i32) -> AppError {
    tracing::warn!("Borrow record not found: {}", id);
    AppError::NotFound(format!("Borrow record with id {} not found", id))
}
