//! Author domain model.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::DomainError;

/// Generates a UUID-backed identifier newtype.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

pub(crate) use define_id;

define_id!(
    /// Unique identifier for an Author.
    AuthorId
);

/// A person credited with one or more books.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Author {
    pub id: AuthorId,
    #[schema(example = "Terry")]
    pub first_name: String,
    #[schema(example = "Pratchett")]
    pub last_name: String,
}

impl Author {
    /// Creates an author with a fresh id.
    ///
    /// # Validation
    /// - First and last name cannot both be empty
    pub fn new(first_name: String, last_name: String) -> Result<Self, DomainError> {
        Self::from_parts(AuthorId::new(), first_name, last_name)
    }

    /// Rebuilds an author under an existing id, applying the same validation.
    pub fn from_parts(
        id: AuthorId,
        first_name: String,
        last_name: String,
    ) -> Result<Self, DomainError> {
        let first_name = first_name.trim().to_string();
        let last_name = last_name.trim().to_string();
        if first_name.is_empty() && last_name.is_empty() {
            return Err(DomainError::ValidationError(
                "Author name cannot be empty".into(),
            ));
        }

        Ok(Self {
            id,
            first_name,
            last_name,
        })
    }

    /// "First Last", or whichever half is present.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name() {
        let author = Author::new("Terry".into(), "Pratchett".into()).unwrap();
        assert_eq!(author.full_name(), "Terry Pratchett");
    }

    #[test]
    fn test_single_name() {
        let author = Author::new("  ".into(), "Homer".into()).unwrap();
        assert_eq!(author.full_name(), "Homer");
    }

    #[test]
    fn test_empty_name_fails() {
        let result = Author::new("".into(), " ".into());
        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }

    #[test]
    fn test_id_round_trips_through_string() {
        let id = AuthorId::new();
        let parsed: AuthorId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }
}
