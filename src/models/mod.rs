//! Data models for the library server

pub mod book;
pub mod borrow;
pub mod member;
pub mod pagination;

// Re-export commonly used types
pub use book::{Book, BookSummary, CreateBook, UpdateBook};
pub use borrow::{BorrowDetails, BorrowFilter, BorrowQuery, BorrowRecord, CreateBorrow};
pub use member::{CreateMember, Member, MemberSummary, UpdateMember};
pub use pagination::{PageQuery, Paginated, Pagination};
