//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use shopping_core::ImageUrls;

use crate::config::AdminConfig;
use crate::db::{HierarchyStore, PgHierarchyRepository, ProductRepository};
use crate::i18n::Messages;
use crate::models::NoticeSigner;
use crate::services::CountriesController;
use crate::views::ViewRenderer;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    hierarchy: Arc<dyn HierarchyStore>,
    products: ProductRepository,
    renderer: Arc<dyn ViewRenderer>,
    messages: Messages,
    notices: NoticeSigner,
    image_urls: ImageUrls,
}

impl AppState {
    /// Build the production state: Postgres-backed hierarchy, renderer from
    /// `config.view_format`.
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool) -> Self {
        let hierarchy = Arc::new(PgHierarchyRepository::new(pool.clone()));
        Self::with_store(config, pool, hierarchy)
    }

    /// Build state around an explicit hierarchy store.
    #[must_use]
    pub fn with_store(config: AdminConfig, pool: PgPool, hierarchy: Arc<dyn HierarchyStore>) -> Self {
        let renderer = config.view_format.renderer();
        let messages = Messages::new(config.locale);
        let image_urls = config.images.urls();
        let notices = config
            .notice_key
            .clone()
            .map_or_else(NoticeSigner::ephemeral, NoticeSigner::new);
        let products = ProductRepository::new(pool.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                hierarchy,
                products,
                renderer,
                messages,
                notices,
                image_urls,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn hierarchy(&self) -> &dyn HierarchyStore {
        self.inner.hierarchy.as_ref()
    }

    #[must_use]
    pub fn products(&self) -> &ProductRepository {
        &self.inner.products
    }

    #[must_use]
    pub fn renderer(&self) -> &dyn ViewRenderer {
        self.inner.renderer.as_ref()
    }

    #[must_use]
    pub fn messages(&self) -> Messages {
        self.inner.messages
    }

    /// Signs and verifies redirect notices.
    #[must_use]
    pub fn notices(&self) -> &NoticeSigner {
        &self.inner.notices
    }

    #[must_use]
    pub fn image_urls(&self) -> &ImageUrls {
        &self.inner.image_urls
    }

    /// Controller for the country/state/city screens.
    #[must_use]
    pub fn countries(&self) -> CountriesController<'_> {
        CountriesController::new(self.hierarchy(), self.renderer(), self.messages())
    }
}
