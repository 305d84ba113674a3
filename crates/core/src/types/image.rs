//! Product image identifiers and URL resolution.
//!
//! Image bytes live in an external blob store. The catalog only keeps an
//! opaque identifier per image; the public URL is derived at read time and
//! never persisted.

use core::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of an image in the external blob store.
///
/// The nil UUID means "no image uploaded".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(Uuid);

impl ImageId {
    /// The empty identifier (no image).
    pub const EMPTY: Self = Self(Uuid::nil());

    /// Wrap a blob identifier.
    #[must_use]
    pub const fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Whether this identifier points at no image.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_nil()
    }

    /// Get the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for ImageId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for ImageId {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Uuid as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Uuid as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ImageId {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let id = <Uuid as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(id))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for ImageId {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Uuid as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

/// URL templates for resolving [`ImageId`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUrls {
    placeholder_url: String,
    blob_base_url: String,
}

impl ImageUrls {
    /// Create URL templates.
    ///
    /// A trailing slash on `blob_base_url` is ignored.
    #[must_use]
    pub fn new(placeholder_url: impl Into<String>, blob_base_url: impl Into<String>) -> Self {
        let blob_base_url: String = blob_base_url.into();
        Self {
            placeholder_url: placeholder_url.into(),
            blob_base_url: blob_base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Resolve the public URL for an image.
    ///
    /// ```
    /// use shopping_core::{ImageId, ImageUrls};
    ///
    /// let urls = ImageUrls::new("/img/none.png", "https://blobs.example.com/products/");
    /// assert_eq!(urls.resolve(ImageId::EMPTY), "/img/none.png");
    /// ```
    #[must_use]
    pub fn resolve(&self, image_id: ImageId) -> String {
        if image_id.is_empty() {
            self.placeholder_url.clone()
        } else {
            format!("{}/{}", self.blob_base_url, image_id)
        }
    }

    /// URL used when a product has no image.
    #[must_use]
    pub fn placeholder_url(&self) -> &str {
        &self.placeholder_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls() -> ImageUrls {
        ImageUrls::new(
            "/static/images/noimage.png",
            "https://blobs.example.com/products/",
        )
    }

    #[test]
    fn test_empty_image_uses_placeholder() {
        assert_eq!(urls().resolve(ImageId::EMPTY), "/static/images/noimage.png");
        assert_eq!(
            urls().resolve(ImageId::default()),
            "/static/images/noimage.png"
        );
    }

    #[test]
    fn test_image_resolves_under_blob_base() {
        let id = Uuid::from_u128(0x1234_5678_9abc_def0_1234_5678_9abc_def0);
        assert_eq!(
            urls().resolve(ImageId::new(id)),
            "https://blobs.example.com/products/12345678-9abc-def0-1234-56789abcdef0"
        );
    }

    #[test]
    fn test_is_empty() {
        assert!(ImageId::EMPTY.is_empty());
        assert!(!ImageId::new(Uuid::new_v4()).is_empty());
    }
}
