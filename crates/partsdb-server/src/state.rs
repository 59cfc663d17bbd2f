use std::sync::Arc;

use partsdb_core::store::PartStore;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PartStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn PartStore>) -> Self {
        Self { store }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use partsdb_core::store::MemoryStore;

    #[tokio::test]
    async fn clones_share_the_store() {
        let state = AppState::new(Arc::new(MemoryStore::new()));
        let other = state.clone();
        assert!(Arc::ptr_eq(&state.store, &other.store));
        other.store.ping().await.unwrap();
    }
}
