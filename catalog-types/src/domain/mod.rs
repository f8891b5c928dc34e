//! Domain models for the catalog.

pub mod api_key;
pub mod author;
pub mod book;
pub mod page;

pub use api_key::Role;
pub use author::{Author, AuthorId};
pub use book::{Book, BookId, UNKNOWN_AUTHOR};
pub use page::{Page, PageRequest, SortKey};
