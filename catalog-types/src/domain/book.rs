//! Book domain model.

use exchange_rates::{Money, Priced};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::author::{Author, define_id};
use crate::error::DomainError;

/// Author name shown when a book has no (or a deleted) author.
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

define_id!(
    /// Unique identifier for a Book.
    BookId
);

/// A catalog entry. `price` is in the canonical currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: Option<Author>,
    pub price: Money,
}

impl Book {
    /// Creates a book with a fresh id.
    ///
    /// # Validation
    /// - Title cannot be empty
    pub fn new(title: String, author: Option<Author>, price: Money) -> Result<Self, DomainError> {
        Self::from_parts(BookId::new(), title, author, price)
    }

    /// Rebuilds a book under an existing id, applying the same validation.
    pub fn from_parts(
        id: BookId,
        title: String,
        author: Option<Author>,
        price: Money,
    ) -> Result<Self, DomainError> {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(DomainError::ValidationError(
                "Book title cannot be empty".into(),
            ));
        }

        Ok(Self {
            id,
            title,
            author,
            price,
        })
    }

    /// Display name of the author, falling back to [`UNKNOWN_AUTHOR`].
    pub fn author_name(&self) -> String {
        self.author
            .as_ref()
            .map(Author::full_name)
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string())
    }
}

impl Priced for Book {
    fn price(&self) -> Money {
        self.price
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn price(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount).unwrap()
    }

    #[test]
    fn test_book_creation_trims_title() {
        let book = Book::new("  Mort ".into(), None, price(dec!(12.5))).unwrap();
        assert_eq!(book.title, "Mort");
        assert_eq!(book.price.amount(), dec!(12.5));
    }

    #[test]
    fn test_empty_title_fails() {
        let result = Book::new("   ".into(), None, price(dec!(1)));
        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }

    #[test]
    fn test_author_name_fallback() {
        let book = Book::new("Beowulf".into(), None, Money::zero()).unwrap();
        assert_eq!(book.author_name(), UNKNOWN_AUTHOR);
    }

    #[test]
    fn test_author_name() {
        let author = Author::new("Ursula".into(), "Le Guin".into()).unwrap();
        let book = Book::new("Earthsea".into(), Some(author), Money::zero()).unwrap();
        assert_eq!(book.author_name(), "Ursula Le Guin");
    }

    #[test]
    fn test_priced_exposes_canonical_price() {
        let book = Book::new("Mort".into(), None, price(dec!(45.0))).unwrap();
        assert_eq!(Priced::price(&book).amount(), dec!(45.0));
    }
}
