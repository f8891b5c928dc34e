//! Data Transfer Objects (DTOs) for requests and responses.

use exchange_rates::{CurrencyCode, Money, PriceView};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Author, AuthorId, Book, BookId, PageRequest, SortKey};
use crate::error::DomainError;

// ─────────────────────────────────────────────────────────────────────────────
// Book DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to create or replace a book.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookRequest {
    #[schema(example = "Mort")]
    pub title: String,
    /// Existing author, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<AuthorId>,
    /// Price in the canonical currency
    #[schema(value_type = f64, example = 45.0)]
    pub price: Money,
}

/// A book as presented to clients, priced in several currencies.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookResponse {
    pub id: BookId,
    #[schema(example = "Mort")]
    pub title: String,
    /// Author display name
    #[schema(example = "Terry Pratchett")]
    pub author: String,
    pub price: PriceView,
}

impl BookResponse {
    pub fn new(book: &Book, price: PriceView) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            author: book.author_name(),
            price,
        }
    }
}

/// Query parameters for listing books.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListBooksQuery {
    /// Zero-based page index
    pub offset: Option<usize>,
    /// Items per page (default 10)
    pub page_size: Option<usize>,
    /// `id`, `title` or `price`
    pub sort_by: Option<String>,
    /// Comma-separated display currencies, e.g. `USD,GBP`
    pub currencies: Option<String>,
}

impl ListBooksQuery {
    pub fn page_request(&self) -> Result<PageRequest, DomainError> {
        let defaults = PageRequest::default();
        let sort = match &self.sort_by {
            Some(field) => field.parse()?,
            None => SortKey::default(),
        };
        PageRequest::new(
            self.offset.unwrap_or(defaults.page),
            self.page_size.unwrap_or(defaults.size),
            sort,
        )
    }

    pub fn currencies(&self) -> Result<Option<Vec<CurrencyCode>>, DomainError> {
        parse_currencies(self.currencies.as_deref())
    }
}

/// Query parameters for fetching a single book.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PriceQuery {
    /// Comma-separated display currencies, e.g. `USD,GBP`
    pub currencies: Option<String>,
}

impl PriceQuery {
    pub fn currencies(&self) -> Result<Option<Vec<CurrencyCode>>, DomainError> {
        parse_currencies(self.currencies.as_deref())
    }
}

fn parse_currencies(raw: Option<&str>) -> Result<Option<Vec<CurrencyCode>>, DomainError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(list) => CurrencyCode::parse_list(list)
            .map(Some)
            .map_err(DomainError::ValidationError),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Author DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to create or replace an author.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthorRequest {
    #[schema(example = "Terry")]
    pub first_name: String,
    #[schema(example = "Pratchett")]
    pub last_name: String,
}

/// Author as presented to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthorResponse {
    pub id: AuthorId,
    pub first_name: String,
    pub last_name: String,
    #[schema(example = "Terry Pratchett")]
    pub full_name: String,
}

impl From<Author> for AuthorResponse {
    fn from(author: Author) -> Self {
        let full_name = author.full_name();
        Self {
            id: author.id,
            first_name: author.first_name,
            last_name: author.last_name,
            full_name,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Misc
// ─────────────────────────────────────────────────────────────────────────────

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Not found: Book not found")]
    pub error: String,
    #[schema(example = 404)]
    pub code: u16,
}
