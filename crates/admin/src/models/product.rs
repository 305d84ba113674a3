//! Product and product image models.

use serde::{Deserialize, Serialize};

use shopping_core::{ImageId, ImageUrls, Price, ProductId, ProductImageId};

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub stock: i32,
}

/// Image metadata attached to a product.
///
/// Only the blob identifier is persisted; see [`ProductImage::view`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: ProductImageId,
    pub product_id: ProductId,
    pub image_id: ImageId,
}

impl ProductImage {
    /// Attach the derived public URL.
    #[must_use]
    pub fn view(&self, urls: &ImageUrls) -> ProductImageView {
        ProductImageView {
            id: self.id,
            product_id: self.product_id,
            image_id: self.image_id,
            image_url: urls.resolve(self.image_id),
        }
    }
}

/// Product image as returned to clients, with its resolved URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImageView {
    pub id: ProductImageId,
    pub product_id: ProductId,
    pub image_id: ImageId,
    pub image_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn urls() -> ImageUrls {
        ImageUrls::new("/static/images/noimage.png", "https://blobs.example.com/products/")
    }

    #[test]
    fn test_view_uses_placeholder_for_empty_image() {
        let image = ProductImage {
            id: ProductImageId::new(1),
            product_id: ProductId::new(7),
            image_id: ImageId::EMPTY,
        };
        assert_eq!(image.view(&urls()).image_url, "/static/images/noimage.png");
    }

    #[test]
    fn test_view_builds_blob_url() {
        let uuid = Uuid::from_u128(0x1234);
        let image = ProductImage {
            id: ProductImageId::new(2),
            product_id: ProductId::new(7),
            image_id: ImageId::new(uuid),
        };
        assert_eq!(
            image.view(&urls()).image_url,
            format!("https://blobs.example.com/products/{uuid}")
        );
    }
}
