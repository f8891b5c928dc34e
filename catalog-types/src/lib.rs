//! # Catalog Types
//!
//! Domain types and port traits for the book catalog service.
//! No IO lives here: only data structures, validation rules and the
//! repository contract adapters implement.
//!
//! - `domain/` - Books, authors and paging
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Request and response shapes for the HTTP boundary
//! - `error/` - Domain, repository and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

pub use domain::{
    Author, AuthorId, Book, BookId, Page, PageRequest, Role, SortKey, UNKNOWN_AUTHOR,
};
pub use dto::*;
pub use error::{AppError, DomainError, RepoError};
pub use ports::CatalogRepository;

// Money and price views come from the rates crate so every layer agrees on them
pub use exchange_rates::{CurrencyCode, Money, PriceView};
