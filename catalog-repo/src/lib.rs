//! # Catalog Repository
//!
//! Concrete adapters for the catalog service: the in-memory
//! `CatalogRepository` and the static API key store.

pub mod memory;
pub mod security;

pub use memory::InMemoryRepo;
pub use security::ApiKeyStore;
