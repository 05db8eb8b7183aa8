//! Application state shared across screens.

use std::sync::Arc;

use crate::catalog::CatalogClient;
use crate::config::ShopConfig;
use crate::db::Store;
use crate::db::cart::CartRepository;
use crate::db::orders::OrderRepository;
use crate::error::AppError;
use crate::services::auth::AuthService;
use crate::services::catalog::Catalog;
use crate::services::checkout::CheckoutService;
use crate::services::orders::OrderService;
use crate::session::SessionStore;

/// Application state shared across all screens.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// store, the catalog client, the session and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ShopConfig,
    store: Store,
    catalog: CatalogClient,
    session: SessionStore,
}

impl AppState {
    /// Assemble state from already-opened parts.
    #[must_use]
    pub fn new(
        config: ShopConfig,
        store: Store,
        catalog: CatalogClient,
        session: SessionStore,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                catalog,
                session,
            }),
        }
    }

    /// Open the store, the catalog client and the session file named by
    /// `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if any of them cannot be opened.
    pub async fn open(config: ShopConfig) -> Result<Self, AppError> {
        let store = Store::open(&config.database).await?;
        let catalog = CatalogClient::new(&config.catalog)?;
        let session = SessionStore::open(&config.session_path).await?;
        Ok(Self::new(config, store, catalog, session))
    }

    /// Get a reference to the shop configuration.
    #[must_use]
    pub fn config(&self) -> &ShopConfig {
        &self.inner.config
    }

    /// Get a reference to the local store.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    /// Get a reference to the session store.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// Failure-tolerant catalog browsing.
    #[must_use]
    pub fn catalog(&self) -> Catalog<'_> {
        Catalog::new(&self.inner.catalog, &self.inner.store)
    }

    /// Cart operations.
    #[must_use]
    pub fn cart(&self) -> CartRepository<'_> {
        CartRepository::new(&self.inner.store)
    }

    /// Order history.
    #[must_use]
    pub fn orders(&self) -> OrderRepository<'_> {
        OrderRepository::new(&self.inner.store)
    }

    /// Order summaries.
    #[must_use]
    pub fn order_summaries(&self) -> OrderService<'_> {
        OrderService::new(&self.inner.store)
    }

    /// Registration and login.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(&self.inner.store)
    }

    /// Checkout.
    #[must_use]
    pub fn checkout(&self) -> CheckoutService<'_> {
        CheckoutService::new(&self.inner.store)
    }
}
