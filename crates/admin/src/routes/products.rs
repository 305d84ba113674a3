//! Product image route handlers (JSON).

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use shopping_core::{ImageId, ProductId, ProductImageId};

use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::models::{Product, ProductImageView};
use crate::state::AppState;

/// Build the product images router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/Products/{id}/Images", get(list_images).post(add_image))
        .route("/Products/Images/Delete/{id}", post(delete_image))
}

/// A product together with its images.
#[derive(Debug, Serialize)]
pub struct ProductImagesResponse {
    pub product: Product,
    pub images: Vec<ProductImageView>,
}

/// Body for registering an image already uploaded to blob storage.
#[derive(Debug, Deserialize)]
pub struct AddImageRequest {
    pub image_id: Uuid,
}

async fn load_product(state: &AppState, raw_id: &str) -> Result<Product, AppError> {
    let id = ProductId::parse(raw_id).ok_or_else(|| AppError::NotFound("product".to_string()))?;
    state
        .products()
        .get_product(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

/// List a product's images with their resolved URLs.
#[instrument(skip(state, admin), fields(admin = %admin.0.email))]
async fn list_images(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<ProductImagesResponse>, AppError> {
    let product = load_product(&state, &id).await?;
    let urls = state.image_urls();
    let images = state
        .products()
        .list_images(product.id)
        .await?
        .iter()
        .map(|image| image.view(urls))
        .collect();

    Ok(Json(ProductImagesResponse { product, images }))
}

/// Register an uploaded image for a product.
#[instrument(skip(state, admin), fields(admin = %admin.0.email))]
async fn add_image(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<String>,
    Json(request): Json<AddImageRequest>,
) -> Result<(StatusCode, Json<ProductImageView>), AppError> {
    let product = load_product(&state, &id).await?;
    let image_id = ImageId::new(request.image_id);
    if image_id.is_empty() {
        return Err(AppError::BadRequest("image_id must not be empty".to_string()));
    }

    let image = state.products().add_image(product.id, image_id).await?;
    tracing::info!(product_id = %product.id, image_id = %image_id, "Product image added");

    Ok((StatusCode::CREATED, Json(image.view(state.image_urls()))))
}

/// Remove an image record.
#[instrument(skip(state, admin), fields(admin = %admin.0.email))]
async fn delete_image(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = ProductImageId::parse(&id)
        .ok_or_else(|| AppError::NotFound("product image".to_string()))?;
    state.products().delete_image(id).await?;
    tracing::info!(image_id = %id, "Product image deleted");
    Ok(StatusCode::NO_CONTENT)
}
