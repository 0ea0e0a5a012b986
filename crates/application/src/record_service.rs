use std::sync::Arc;

use capatrack_core::{AppResult, OperationContext};
use capatrack_domain::{Record, find_by_id, find_index_by_id, next_record_id};
use tokio::sync::Mutex;

use crate::ports::RecordStore;

/// Collection-level CRUD with no domain awareness.
///
/// Every mutation runs a full read-modify-write cycle over the collection
/// under a single write lock, so in-process writers are serialized per
/// collection and id assignment always sees a consistent snapshot.
pub struct RecordService<T: Record> {
    store: Arc<dyn RecordStore<T>>,
    write_lock: Arc<Mutex<()>>,
}

impl<T: Record> Clone for RecordService<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            write_lock: Arc::clone(&self.write_lock),
        }
    }
}

impl<T: Record> RecordService<T> {
    /// Creates a record service over a collection store.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore<T>>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Returns all records in stored order.
    pub async fn get_all(&self) -> Vec<T> {
        self.store.load().await
    }

    /// Finds a record by id.
    pub async fn find(&self, id: u64) -> Option<T> {
        let items = self.store.load().await;
        find_by_id(&items, id).cloned()
    }

    /// Finds the first record matching a predicate.
    pub async fn find_where<P>(&self, predicate: P) -> Option<T>
    where
        P: FnMut(&T) -> bool,
    {
        self.store.load().await.into_iter().find(predicate)
    }

    /// Returns all records matching a predicate, in stored order.
    pub async fn find_all_where<P>(&self, predicate: P) -> Vec<T>
    where
        P: FnMut(&T) -> bool,
    {
        self.store.load().await.into_iter().filter(predicate).collect()
    }

    /// Saves a record: id `0` creates (assigning the next id and stamping
    /// creation metadata), a present id replaces in place and stamps
    /// update metadata.
    pub async fn save(&self, context: &OperationContext, mut record: T) -> AppResult<T> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.store.load().await;

        if record.id() == 0 {
            record.assign_id(next_record_id(&items));
            record.touch_created(context);
            record.touch_updated(context);
            items.push(record.clone());
        } else {
            record.touch_updated(context);
            match find_index_by_id(&items, record.id()) {
                Some(index) => items[index] = record.clone(),
                None => items.push(record.clone()),
            }
        }

        self.store.save(&items).await?;
        Ok(record)
    }

    /// Deletes a record by id, keeping the relative order of the rest.
    ///
    /// Returns whether a record was removed; a miss does not rewrite the
    /// collection.
    pub async fn delete(&self, id: u64) -> AppResult<bool> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.store.load().await;

        let Some(index) = find_index_by_id(&items, id) else {
            return Ok(false);
        };

        items.remove(index);
        self.store.save(&items).await?;
        Ok(true)
    }

    /// Counts all records.
    pub async fn count(&self) -> usize {
        self.store.load().await.len()
    }

    /// Returns whether a record with the given id exists.
    pub async fn exists(&self, id: u64) -> bool {
        let items = self.store.load().await;
        find_by_id(&items, id).is_some()
    }

    /// Runs one read-modify-write cycle under the write lock.
    ///
    /// The closure mutates the loaded snapshot; an `Err` aborts the cycle
    /// without writing anything back.
    pub(crate) async fn mutate<R, F>(&self, op: F) -> AppResult<R>
    where
        F: FnOnce(&mut Vec<T>) -> AppResult<R> + Send,
        R: Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut items = self.store.load().await;
        let result = op(&mut items)?;
        self.store.save(&items).await?;
        Ok(result)
    }
}
