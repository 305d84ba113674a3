//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                              - Liveness check
//! GET  /health/ready                        - Readiness check (database)
//!
//! # Countries (fragments + pages)
//! GET  /Countries                           - Full hierarchy page
//! GET  /Countries/Details/{id}              - Country page
//! GET  /Countries/DetailsState/{id}         - State page
//! GET  /Countries/AddOrEdit[/{id}]          - Country form
//! POST /Countries/AddOrEdit[/{id}]          - Create/rename country
//! GET  /Countries/AddState/{countryId}      - State form
//! POST /Countries/AddState                  - Create state
//! GET  /Countries/EditState/{id}            - State edit form
//! POST /Countries/EditState/{id}            - Rename state
//! GET  /Countries/AddCity/{stateId}         - City form
//! POST /Countries/AddCity                   - Create city
//! GET  /Countries/EditCity/{id}             - City edit form
//! POST /Countries/EditCity/{id}             - Rename city
//! POST /Countries/Delete/{id}               - Delete country
//! POST /Countries/DeleteState/{id}          - Delete state
//! POST /Countries/DeleteCity/{id}           - Delete city
//!
//! # Product images (JSON)
//! GET  /Products/{id}/Images                - List images with URLs
//! POST /Products/{id}/Images                - Register an uploaded image
//! POST /Products/Images/Delete/{id}         - Remove an image record
//! ```

pub mod countries;
mod extract;
pub mod products;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::get,
};

use crate::state::AppState;

/// Build the catalog router (everything except static files).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(countries::router())
        .merge(products::router())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
mod test_support;
