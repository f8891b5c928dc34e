//! Security utilities for API key hashing and lookup.

use catalog_types::{DomainError, Role};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Hashes an API key using SHA-256.
pub fn hash_api_key(key: &str) -> String {
    let hash = Sha256::digest(key.as_bytes());
    hex::encode(hash)
}

/// Verifies an API key against a stored hash using constant-time comparison.
pub fn verify_api_key(input: &str, stored_hash: &str) -> bool {
    let input_hash = hash_api_key(input);
    input_hash.as_bytes().ct_eq(stored_hash.as_bytes()).into()
}

/// Fixed set of API keys loaded at startup. Only hashes are kept.
#[derive(Debug, Clone, Default)]
pub struct ApiKeyStore {
    keys: Vec<(String, Role)>,
}

impl ApiKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `key:role` pairs separated by commas, e.g. `abc:viewer,def:writer`.
    pub fn parse(pairs: &str) -> Result<Self, DomainError> {
        let mut store = Self::new();
        for pair in pairs.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, role) = pair.rsplit_once(':').ok_or_else(|| {
                DomainError::ValidationError(format!("Expected `key:role`, got `{pair}`"))
            })?;
            if key.is_empty() {
                return Err(DomainError::ValidationError("API key cannot be empty".into()));
            }
            store.insert(key, role.parse()?);
        }
        Ok(store)
    }

    pub fn insert(&mut self, key: &str, role: Role) {
        self.keys.push((hash_api_key(key), role));
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Role bound to `key`, if it is known.
    ///
    /// Every stored hash is compared so the time taken does not depend on
    /// which entry matches.
    pub fn authenticate(&self, key: &str) -> Option<Role> {
        let mut found = None;
        for (hash, role) in &self.keys {
            if verify_api_key(key, hash) && found.is_none() {
                found = Some(*role);
            }
        }
        found
    }
}
