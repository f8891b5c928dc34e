//! # Catalog Hex
//!
//! Application service layer and HTTP adapter for the book catalog.
//!
//! ## Architecture
//!
//! - `service/` - Application service (books, authors, pricing)
//! - `inbound/` - HTTP adapter (Axum server, API key auth)
//! - `openapi/` - OpenAPI document
//!
//! The service is generic over `R: CatalogRepository`, allowing
//! different repository implementations to be injected.

pub mod inbound;
pub mod openapi;
pub mod service;

#[cfg(test)]
mod service_tests;

pub use service::CatalogService;
