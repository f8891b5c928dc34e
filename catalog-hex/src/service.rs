//! Catalog Application Service
//!
//! Orchestrates the repository port and the price assembler.
//! Contains no HTTP or storage details.

use std::sync::Arc;

use exchange_rates::{PriceAssembler, RateSnapshot};
use tracing::warn;

use catalog_types::{
    AppError, Author, AuthorId, AuthorRequest, Book, BookId, BookRequest, BookResponse,
    CatalogRepository, CurrencyCode, Page, PageRequest, PriceView,
};

/// Application service for catalog operations.
///
/// Generic over `R: CatalogRepository` so the adapter is chosen at compile time.
pub struct CatalogService<R: CatalogRepository> {
    repo: R,
    prices: PriceAssembler,
}

impl<R: CatalogRepository> CatalogService<R> {
    pub fn new(repo: R, prices: PriceAssembler) -> Self {
        Self { repo, prices }
    }

    fn targets<'a>(&'a self, requested: Option<&'a [CurrencyCode]>) -> &'a [CurrencyCode] {
        requested.unwrap_or_else(|| self.prices.default_targets())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Book Queries
    // ─────────────────────────────────────────────────────────────────────────────

    /// Lists one page of books, every price priced from the same snapshot.
    pub async fn list_books(
        &self,
        request: PageRequest,
        currencies: Option<Vec<CurrencyCode>>,
    ) -> Result<Page<BookResponse>, AppError> {
        let page = self.repo.find_books(request).await?;
        let views = self
            .prices
            .assemble_batch(&page.content, self.targets(currencies.as_deref()))
            .await
            .inspect_err(|e| warn!(error = %e, "Cannot price book page"))?;

        let content = page
            .content
            .iter()
            .zip(views)
            .map(|(book, view)| BookResponse::new(book, view))
            .collect();
        Ok(page.with_content(content))
    }

    /// Gets one priced book. A missing book is reported before rates are read.
    pub async fn get_book(
        &self,
        id: BookId,
        currencies: Option<Vec<CurrencyCode>>,
    ) -> Result<BookResponse, AppError> {
        let book = self.find_book(id).await?;
        let view = self
            .prices
            .assemble(&book, self.targets(currencies.as_deref()))
            .await
            .inspect_err(|e| warn!(book_id = %id, error = %e, "Cannot price book"))?;
        Ok(BookResponse::new(&book, view))
    }

    async fn find_book(&self, id: BookId) -> Result<Book, AppError> {
        self.repo
            .find_book(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book not found: {id}")))
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Book Commands
    // ─────────────────────────────────────────────────────────────────────────────
    //
    // Writes answer with the canonical price only, so they never depend on the
    // rate provider being up.

    /// Creates a new book.
    pub async fn create_book(&self, req: BookRequest) -> Result<BookResponse, AppError> {
        let author = self.resolve_author(req.author_id).await?;
        let book = Book::new(req.title, author, req.price)?;
        let saved = self.repo.save_book(book).await?;
        Ok(self.canonical_response(&saved))
    }

    /// Replaces an existing book.
    pub async fn update_book(&self, id: BookId, req: BookRequest) -> Result<BookResponse, AppError> {
        self.find_book(id).await?;
        let author = self.resolve_author(req.author_id).await?;
        let book = Book::from_parts(id, req.title, author, req.price)?;
        let saved = self.repo.save_book(book).await?;
        Ok(self.canonical_response(&saved))
    }

    /// Deletes a book.
    pub async fn delete_book(&self, id: BookId) -> Result<(), AppError> {
        self.repo.delete_book(id).await.map_err(Into::into)
    }

    async fn resolve_author(&self, id: Option<AuthorId>) -> Result<Option<Author>, AppError> {
        let Some(id) = id else {
            return Ok(None);
        };
        self.repo
            .find_author(id)
            .await?
            .map(Some)
            .ok_or_else(|| AppError::BadRequest(format!("Author not found: {id}")))
    }

    fn canonical_response(&self, book: &Book) -> BookResponse {
        BookResponse::new(book, PriceView::canonical(self.prices.base().clone(), book.price))
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Author Operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Lists all authors.
    pub async fn list_authors(&self) -> Result<Vec<Author>, AppError> {
        self.repo.list_authors().await.map_err(Into::into)
    }

    /// Gets an author by ID.
    pub async fn get_author(&self, id: AuthorId) -> Result<Author, AppError> {
        self.repo
            .find_author(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author not found: {id}")))
    }

    /// Creates a new author.
    pub async fn create_author(&self, req: AuthorRequest) -> Result<Author, AppError> {
        let author = Author::new(req.first_name, req.last_name)?;
        self.repo.save_author(author).await.map_err(Into::into)
    }

    /// Replaces an existing author.
    pub async fn update_author(&self, id: AuthorId, req: AuthorRequest) -> Result<Author, AppError> {
        self.get_author(id).await?;
        let author = Author::from_parts(id, req.first_name, req.last_name)?;
        self.repo.save_author(author).await.map_err(Into::into)
    }

    /// Deletes an author. Their books remain and read as "Unknown Author".
    pub async fn delete_author(&self, id: AuthorId) -> Result<(), AppError> {
        self.repo.delete_author(id).await.map_err(Into::into)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Rates
    // ─────────────────────────────────────────────────────────────────────────────

    /// Snapshot currently in effect, refreshed first if stale.
    pub async fn current_rates(&self) -> Result<Arc<RateSnapshot>, AppError> {
        self.prices.cache().get().await.map_err(Into::into)
    }
}
