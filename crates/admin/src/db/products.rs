//! Product and product image repository.

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use shopping_core::{CurrencyCode, ImageId, Price, ProductId, ProductImageId};

use super::{RepositoryError, WriteKind, classify_write_error};
use crate::models::{Product, ProductImage};

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: Option<String>,
    price: Decimal,
    currency_code: String,
    stock: i32,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let currency_code = row
            .currency_code
            .parse::<CurrencyCode>()
            .map_err(RepositoryError::StorageFailure)?;

        Ok(Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: Price::new(row.price, currency_code),
            stock: row.stock,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductImageRow {
    id: ProductImageId,
    product_id: ProductId,
    image_id: ImageId,
}

impl From<ProductImageRow> for ProductImage {
    fn from(row: ProductImageRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            image_id: row.image_id,
        }
    }
}

/// Repository for products and their image metadata.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    /// Create a new repository with the given connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or the stored currency
    /// code is unknown.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, currency_code, stock
            FROM catalog.products
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// List images of a product in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    #[instrument(skip(self))]
    pub async fn list_images(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ProductImage>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductImageRow>(
            r"
            SELECT id, product_id, image_id
            FROM catalog.product_images
            WHERE product_id = $1
            ORDER BY id
            ",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ProductImage::from).collect())
    }

    /// Register an uploaded image for a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    #[instrument(skip(self))]
    pub async fn add_image(
        &self,
        product_id: ProductId,
        image_id: ImageId,
    ) -> Result<ProductImage, RepositoryError> {
        let row = sqlx::query_as::<_, ProductImageRow>(
            r"
            INSERT INTO catalog.product_images (product_id, image_id)
            VALUES ($1, $2)
            RETURNING id, product_id, image_id
            ",
        )
        .bind(product_id)
        .bind(image_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify_write_error(&e, WriteKind::Insert))?;

        Ok(ProductImage::from(row))
    }

    /// Remove an image record. The blob itself is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such image exists.
    #[instrument(skip(self))]
    pub async fn delete_image(&self, id: ProductImageId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM catalog.product_images WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| classify_write_error(&e, WriteKind::Delete))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_row_conversion() {
        let row = ProductRow {
            id: ProductId::new(3),
            name: "Café de Colombia".to_string(),
            description: None,
            price: Decimal::new(1_250_000, 2),
            currency_code: "COP".to_string(),
            stock: 12,
        };

        let product = Product::try_from(row).unwrap_or_else(|e| panic!("conversion failed: {e}"));
        assert_eq!(product.price.display(), "COP 12500.00");
    }

    #[test]
    fn test_unknown_currency_is_storage_failure() {
        let row = ProductRow {
            id: ProductId::new(3),
            name: "Café".to_string(),
            description: None,
            price: Decimal::ONE,
            currency_code: "XXX".to_string(),
            stock: 0,
        };

        assert!(matches!(
            Product::try_from(row),
            Err(RepositoryError::StorageFailure(_))
        ));
    }
}
