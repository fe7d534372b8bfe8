//! Business logic services

pub mod books;
pub mod borrows;
pub mod members;

use crate::{config::CatalogConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BooksService,
    pub members: members::MembersService,
    pub borrows: borrows::BorrowsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, catalog_config: CatalogConfig) -> Self {
        Self {
            books: books::BooksService::new(repository.clone(), catalog_config),
            members: members::MembersService::new(repository.clone()),
            borrows: borrows::BorrowsService::new(repository),
        }
    }
}
