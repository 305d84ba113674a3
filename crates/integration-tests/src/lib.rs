//! Integration tests for the Shopping catalog admin.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory controller and store tests
//! cargo test -p shopping-integration-tests
//!
//! # Postgres and live-server tests (need a migrated database and, for the
//! # HTTP tests, a running admin)
//! cargo test -p shopping-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `catalog_hierarchy` - controller scenarios over the in-memory store
//! - `hierarchy_properties` - store invariants checked with `proptest`
//! - `catalog_postgres` - `PgHierarchyRepository` against a real database
//! - `admin_http` - HTTP round trips against a running admin

#![cfg_attr(not(test), forbid(unsafe_code))]

use secrecy::SecretString;
use serde_json::Value;

use shopping_admin::db::MemoryHierarchyStore;
use shopping_admin::i18n::{Locale, Messages};
use shopping_admin::services::CountriesController;
use shopping_admin::views::JsonRenderer;

/// An in-memory store plus the JSON renderer, so controller output can be
/// asserted on as data.
#[derive(Debug, Default)]
pub struct Harness {
    pub store: MemoryHierarchyStore,
    renderer: JsonRenderer,
}

impl Harness {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Controller speaking Spanish, the admin's default locale.
    #[must_use]
    pub fn controller(&self) -> CountriesController<'_> {
        CountriesController::new(&self.store, &self.renderer, Messages::new(Locale::Es))
    }
}

/// Parse a JSON-rendered view (`{"view": .., "model": ..}`).
///
/// Returns `Value::Null` for anything that is not JSON.
#[must_use]
pub fn parse_view(rendered: &str) -> Value {
    serde_json::from_str(rendered).unwrap_or_default()
}

/// Base URL of a running admin (`ADMIN_BASE_URL`).
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// Database URL for Postgres-backed tests (`ADMIN_DATABASE_URL`, then
/// `DATABASE_URL`).
#[must_use]
pub fn database_url() -> SecretString {
    std::env::var("ADMIN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .unwrap_or_else(|_| "postgres://localhost/shopping_test".to_string())
        .into()
}
