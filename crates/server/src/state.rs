//! Application state shared across handlers.

use std::sync::Arc;

use crate::db::CatalogStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and carries the injected
/// datastore. There is no process-wide database handle.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Box<dyn CatalogStore>,
}

impl AppState {
    /// Create a new application state around a datastore.
    ///
    /// # Arguments
    ///
    /// * `store` - Any [`CatalogStore`], e.g. `PgCatalogStore` in production or
    ///   `InMemoryCatalogStore` in tests
    #[must_use]
    pub fn new(store: impl CatalogStore + 'static) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store: Box::new(store),
            }),
        }
    }

    /// Get a reference to the datastore.
    #[must_use]
    pub fn store(&self) -> &dyn CatalogStore {
        self.inner.store.as_ref()
    }
}
