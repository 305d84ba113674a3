//! Authentication and navigation guards for admin routes.
//!
//! The login flow itself is owned by the external auth service; these
//! extractors only read what it stored in the shared session.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::error::set_sentry_user;
use crate::models::{CurrentAdmin, session_keys};

/// Where the external auth service serves its login page.
pub const LOGIN_PATH: &str = "/auth/login";

/// Where direct navigation to a fragment endpoint is sent.
pub const CATALOG_HOME_PATH: &str = "/Countries";

/// Extractor that requires an admin allowed to manage the catalog.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdmin(admin): RequireAdmin,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.name)
/// }
/// ```
pub struct RequireAdmin(pub CurrentAdmin);

/// Error returned when the request has no catalog-capable admin.
#[derive(Debug)]
pub enum AdminAuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests or a missing session layer).
    Unauthorized,
    /// Logged in, but the role is read-only.
    Forbidden,
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                "Your role cannot manage the catalog",
            )
                .into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AdminAuthRejection::Unauthorized)?;

        let admin: CurrentAdmin = session
            .get(session_keys::CURRENT_ADMIN)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| {
                if wants_json(parts) {
                    AdminAuthRejection::Unauthorized
                } else {
                    AdminAuthRejection::RedirectToLogin
                }
            })?;

        if !admin.role.can_manage_catalog() {
            tracing::warn!(admin_id = %admin.id, role = %admin.role, "Catalog access denied");
            return Err(AdminAuthRejection::Forbidden);
        }

        set_sentry_user(admin.id.as_i32(), Some(&admin.email));
        Ok(Self(admin))
    }
}

/// Extractor that rejects requests typed directly into the address bar.
///
/// Form fragments and delete actions are only meaningful when reached from
/// a catalog page, so a request without a `Referer` header is redirected to
/// the catalog home.
#[derive(Debug, Clone, Copy)]
pub struct NoDirectAccess;

impl<S> FromRequestParts<S> for NoDirectAccess
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let has_referer = parts
            .headers
            .get(header::REFERER)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| !value.trim().is_empty());

        if has_referer {
            Ok(Self)
        } else {
            tracing::debug!(uri = %parts.uri, "Direct access redirected");
            Err(Redirect::to(CATALOG_HOME_PATH))
        }
    }
}

fn wants_json(parts: &Parts) -> bool {
    parts.uri.path().starts_with("/Products/")
        || parts
            .headers
            .get(header::ACCEPT)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.contains("application/json"))
}
