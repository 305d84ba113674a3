//! Display name type shared by countries, states, and cities.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`EntityName`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// The input is empty or only whitespace.
    #[error("name cannot be empty")]
    Empty,
    /// The input is too long.
    #[error("name must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// A validated catalog entity name.
///
/// ## Constraints
///
/// - Surrounding whitespace is trimmed
/// - Length: 1-50 characters (counted in Unicode scalar values)
///
/// ## Examples
///
/// ```
/// use shopping_core::EntityName;
///
/// assert_eq!(EntityName::parse("  Antioquia ").unwrap().as_str(), "Antioquia");
/// assert!(EntityName::parse("Medellín").is_ok());
///
/// assert!(EntityName::parse("").is_err());
/// assert!(EntityName::parse("   ").is_err());
/// assert!(EntityName::parse(&"x".repeat(51)).is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct EntityName(String);

impl EntityName {
    /// Maximum length of a name, in characters.
    pub const MAX_LENGTH: usize = 50;

    /// Parse an `EntityName` from user input.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty or longer than
    /// [`Self::MAX_LENGTH`] characters.
    pub fn parse(s: &str) -> Result<Self, NameError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(NameError::Empty);
        }

        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(NameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `EntityName` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for EntityName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for EntityName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for EntityName {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for EntityName {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_whitespace() {
        let name = EntityName::parse("\t Colombia \n").unwrap();
        assert_eq!(name.as_str(), "Colombia");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(EntityName::parse(""), Err(NameError::Empty));
        assert_eq!(EntityName::parse("    "), Err(NameError::Empty));
    }

    #[test]
    fn test_parse_length_counts_characters() {
        // 50 multi-byte characters are still within the limit
        let accented = "é".repeat(50);
        assert!(EntityName::parse(&accented).is_ok());

        let too_long = "é".repeat(51);
        assert_eq!(
            EntityName::parse(&too_long),
            Err(NameError::TooLong { max: 50 })
        );
    }

    #[test]
    fn test_display() {
        let name = EntityName::parse("Medellín").unwrap();
        assert_eq!(format!("{name}"), "Medellín");
    }
}
