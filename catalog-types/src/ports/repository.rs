//! Repository port trait.
//!
//! Adapters (in-memory, or a database later) implement this trait.

use crate::domain::{Author, AuthorId, Book, BookId, Page, PageRequest};
use crate::error::RepoError;

/// Persistence for books and authors.
///
/// Books are returned with their author resolved; a book whose author no
/// longer exists comes back with `author: None`.
#[async_trait::async_trait]
pub trait CatalogRepository: Send + Sync + 'static {
    // ─────────────────────────────────────────────────────────────────────────────
    // Book Operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Gets a book by ID.
    async fn find_book(&self, id: BookId) -> Result<Option<Book>, RepoError>;

    /// Lists one page of books in the requested order.
    async fn find_books(&self, request: PageRequest) -> Result<Page<Book>, RepoError>;

    /// Inserts or replaces a book. The author, if any, must exist.
    async fn save_book(&self, book: Book) -> Result<Book, RepoError>;

    /// Deletes a book. Fails with `DomainError::BookNotFound` if it does not exist.
    async fn delete_book(&self, id: BookId) -> Result<(), RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Author Operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Gets an author by ID.
    async fn find_author(&self, id: AuthorId) -> Result<Option<Author>, RepoError>;

    /// Lists all authors.
    async fn list_authors(&self) -> Result<Vec<Author>, RepoError>;

    /// Inserts or replaces an author.
    async fn save_author(&self, author: Author) -> Result<Author, RepoError>;

    /// Deletes an author. Fails with `DomainError::AuthorNotFound` if it does not exist.
    async fn delete_author(&self, id: AuthorId) -> Result<(), RepoError>;
}
