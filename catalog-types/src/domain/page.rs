//! Paging for list queries.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::DomainError;

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

/// Field a book listing is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Id,
    Title,
    Price,
}

impl std::str::FromStr for SortKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "id" => Ok(SortKey::Id),
            "title" => Ok(SortKey::Title),
            "price" => Ok(SortKey::Price),
            other => Err(DomainError::ValidationError(format!(
                "Unsupported sort field: {other}"
            ))),
        }
    }
}

/// Zero-based page index, page size and ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
    pub sort: SortKey,
}

impl PageRequest {
    pub fn new(page: usize, size: usize, sort: SortKey) -> Result<Self, DomainError> {
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(DomainError::ValidationError(format!(
                "Page size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        Ok(Self { page, size, sort })
    }

    /// Index of the first element on this page.
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort: SortKey::Id,
        }
    }
}

/// One page of results plus the totals needed to navigate the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Page<T> {
    pub content: Vec<T>,
    #[schema(example = 0)]
    pub page: usize,
    #[schema(example = 10)]
    pub size: usize,
    #[schema(example = 42)]
    pub total_elements: usize,
    #[schema(example = 5)]
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: usize) -> Self {
        Self {
            content,
            page: request.page,
            size: request.size,
            total_elements,
            total_pages: total_elements.div_ceil(request.size),
        }
    }

    /// Replaces the content, keeping the paging metadata.
    pub fn with_content<U>(self, content: Vec<U>) -> Page<U> {
        Page {
            content,
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}
