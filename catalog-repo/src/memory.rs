//! In-memory repository adapter.

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use catalog_types::{
    Author, AuthorId, Book, BookId, CatalogRepository, DomainError, Money, Page, PageRequest,
    RepoError, SortKey,
};

/// Book row as stored: the author is referenced, not embedded.
#[derive(Debug, Clone)]
struct BookRecord {
    id: BookId,
    title: String,
    author_id: Option<AuthorId>,
    price: Money,
}

impl From<&Book> for BookRecord {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            author_id: book.author.as_ref().map(|a| a.id),
            price: book.price,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// In-Memory Repository
// ─────────────────────────────────────────────────────────────────────────────

/// DashMap-backed repository. Data lives for the lifetime of the process.
#[derive(Debug, Default)]
pub struct InMemoryRepo {
    books: DashMap<BookId, BookRecord>,
    authors: DashMap<AuthorId, Author>,
}

impl InMemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Joins the author in; a dangling reference reads as no author.
    fn resolve(&self, record: &BookRecord) -> Book {
        let author = record
            .author_id
            .and_then(|id| self.authors.get(&id).map(|a| a.value().clone()));

        Book {
            id: record.id,
            title: record.title.clone(),
            author,
            price: record.price,
        }
    }
}

fn sort_books(books: &mut [Book], key: SortKey) {
    match key {
        SortKey::Id => books.sort_by(|a, b| a.id.cmp(&b.id)),
        SortKey::Title => books.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id))),
        SortKey::Price => books.sort_by(|a, b| a.price.cmp(&b.price).then(a.id.cmp(&b.id))),
    }
}

#[async_trait]
impl CatalogRepository for InMemoryRepo {
    async fn find_book(&self, id: BookId) -> Result<Option<Book>, RepoError> {
        Ok(self.books.get(&id).map(|record| self.resolve(&record)))
    }

    async fn find_books(&self, request: PageRequest) -> Result<Page<Book>, RepoError> {
        // collect first so no shard lock is held while authors are joined
        let records: Vec<BookRecord> = self.books.iter().map(|r| r.value().clone()).collect();
        let mut books: Vec<Book> = records.iter().map(|r| self.resolve(r)).collect();
        sort_books(&mut books, request.sort);

        let total = books.len();
        let content = books
            .into_iter()
            .skip(request.offset())
            .take(request.size)
            .collect();

        Ok(Page::new(content, request, total))
    }

    async fn save_book(&self, book: Book) -> Result<Book, RepoError> {
        if let Some(author) = &book.author {
            if !self.authors.contains_key(&author.id) {
                return Err(RepoError::Domain(DomainError::AuthorNotFound(author.id)));
            }
        }

        debug!(book_id = %book.id, "Saving book");
        let record = BookRecord::from(&book);
        self.books.insert(book.id, record.clone());
        Ok(self.resolve(&record))
    }

    async fn delete_book(&self, id: BookId) -> Result<(), RepoError> {
        self.books
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::Domain(DomainError::BookNotFound(id)))
    }

    async fn find_author(&self, id: AuthorId) -> Result<Option<Author>, RepoError> {
        Ok(self.authors.get(&id).map(|a| a.value().clone()))
    }

    async fn list_authors(&self) -> Result<Vec<Author>, RepoError> {
        let mut authors: Vec<Author> = self.authors.iter().map(|a| a.value().clone()).collect();
        authors.sort_by(|a, b| {
            a.last_name
                .cmp(&b.last_name)
                .then_with(|| a.first_name.cmp(&b.first_name))
                .then(a.id.cmp(&b.id))
        });
        Ok(authors)
    }

    async fn save_author(&self, author: Author) -> Result<Author, RepoError> {
        debug!(author_id = %author.id, "Saving author");
        self.authors.insert(author.id, author.clone());
        Ok(author)
    }

    async fn delete_author(&self, id: AuthorId) -> Result<(), RepoError> {
        self.authors
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::Domain(DomainError::AuthorNotFound(id)))
    }
}
