use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use capatrack_application::RecordStore;
use capatrack_core::{AppError, AppResult};
use capatrack_domain::Record;
use tracing::warn;

use crate::json_store::JsonDocumentStore;

/// Typed view over one JSON collection document.
///
/// The document has the shape `{ "<plural>": [record, ...] }`; keys other
/// than the record array are carried through saves untouched.
pub struct JsonRecordStore<T> {
    store: Arc<JsonDocumentStore>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> JsonRecordStore<T> {
    /// Creates a typed store over a document store.
    #[must_use]
    pub fn new(store: Arc<JsonDocumentStore>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }
}

impl<T> Clone for JsonRecordStore<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _entity: PhantomData,
        }
    }
}

#[async_trait]
impl<T: Record> RecordStore<T> for JsonRecordStore<T> {
    async fn load(&self) -> Vec<T> {
        let document = self.store.read_document(T::FILE).await;
        let Some(value) = document.get(T::KEY) else {
            return Vec::new();
        };

        match serde_json::from_value(value.clone()) {
            Ok(items) => items,
            Err(error) => {
                warn!(file = T::FILE, %error, "collection does not decode, ignoring it");
                Vec::new()
            }
        }
    }

    async fn save(&self, items: &[T]) -> AppResult<()> {
        let mut document = self.store.read_document(T::FILE).await;
        let encoded = serde_json::to_value(items).map_err(|error| {
            AppError::Persistence(format!("failed to encode '{}': {error}", T::FILE))
        })?;
        document.insert(T::KEY.to_owned(), encoded);
        self.store.write_document(T::FILE, &document).await
    }
}
