//! Router fixtures for handler tests.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{Request, State},
    http,
    middleware::{Next, from_fn_with_state},
    response::Response,
};
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use tower_sessions::{MemoryStore, Session, SessionManagerLayer};

use shopping_core::{AdminRole, AdminUserId};

use crate::config::{AdminConfig, ImageConfig};
use crate::db::MemoryHierarchyStore;
use crate::i18n::Locale;
use crate::models::{CurrentAdmin, session_keys};
use crate::state::AppState;
use crate::views::ViewFormat;

/// Notice key used by [`test_config`].
pub const TEST_NOTICE_KEY: &str = "test-notice-key";

pub fn test_config(view_format: ViewFormat) -> AdminConfig {
    AdminConfig {
        database_url: SecretString::from("postgres://localhost/shopping_test"),
        host: std::net::IpAddr::from([127, 0, 0, 1]),
        port: 3001,
        base_url: None,
        locale: Locale::Es,
        view_format,
        images: ImageConfig::default(),
        notice_key: Some(SecretString::from(TEST_NOTICE_KEY)),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 1.0,
        tls: None,
    }
}

/// Stand-in for the external auth service: writes `role` into the session.
async fn sign_in(
    State(role): State<Option<AdminRole>>,
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    if let Some(role) = role {
        let admin = CurrentAdmin {
            id: AdminUserId::new(1),
            email: "ops@shopping.test".to_string(),
            name: "Ops".to_string(),
            role,
        };
        if let Err(e) = session.insert(session_keys::CURRENT_ADMIN, admin).await {
            tracing::error!(error = %e, "test session insert failed");
        }
    }
    next.run(request).await
}

/// Full catalog router over `store`, signed in as `role`.
///
/// Must be called inside a Tokio runtime (the lazy pool spawns its
/// maintenance task).
#[allow(clippy::unwrap_used)]
pub fn test_app(
    store: Arc<MemoryHierarchyStore>,
    role: Option<AdminRole>,
    view_format: ViewFormat,
) -> Router {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/shopping_test")
        .unwrap();
    let state = AppState::with_store(test_config(view_format), pool, store);

    super::routes()
        .with_state(state)
        .layer(from_fn_with_state(role, sign_in))
        .layer(SessionManagerLayer::new(MemoryStore::default()))
}

pub fn get(uri: &str, referer: Option<&str>) -> Request {
    let mut builder = http::Request::builder().method("GET").uri(uri);
    if let Some(referer) = referer {
        builder = builder.header("referer", referer);
    }
    builder.body(Body::empty()).unwrap_or_default()
}

pub fn post_form(uri: &str, body: &str) -> Request {
    http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .header("referer", "http://localhost:3001/Countries")
        .body(Body::from(body.to_string()))
        .unwrap_or_default()
}

#[allow(clippy::unwrap_used)]
pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
