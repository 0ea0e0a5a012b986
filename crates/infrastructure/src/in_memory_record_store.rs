use async_trait::async_trait;
use capatrack_application::RecordStore;
use capatrack_core::AppResult;
use capatrack_domain::Record;
use tokio::sync::RwLock;

/// In-memory record store implementation.
///
/// Useful for tests and wiring without a data directory; contents die
/// with the process.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore<T> {
    items: RwLock<Vec<T>>,
}

impl<T> InMemoryRecordStore<T> {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
        }
    }

    /// Creates a store pre-seeded with records.
    #[must_use]
    pub fn with(items: Vec<T>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }
}

#[async_trait]
impl<T: Record> RecordStore<T> for InMemoryRecordStore<T> {
    async fn load(&self) -> Vec<T> {
        self.items.read().await.clone()
    }

    async fn save(&self, items: &[T]) -> AppResult<()> {
        *self.items.write().await = items.to_vec();
        Ok(())
    }
}
