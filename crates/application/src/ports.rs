use async_trait::async_trait;
use capatrack_core::AppResult;
use capatrack_domain::{EightDCase, Record};

/// Durable storage for one record collection.
///
/// `load` never fails: a missing or unreadable collection is "no data
/// yet". `save` replaces the whole collection atomically.
#[async_trait]
pub trait RecordStore<T: Record>: Send + Sync {
    /// Returns the current collection snapshot.
    async fn load(&self) -> Vec<T>;

    /// Replaces the stored collection with the given records.
    async fn save(&self, items: &[T]) -> AppResult<()>;
}

/// Blob storage for attachment payloads, keyed by owning action and
/// randomized stored name.
#[async_trait]
pub trait AttachmentFiles: Send + Sync {
    /// Persists the payload of a newly uploaded attachment.
    async fn store(&self, action_id: u64, stored_name: &str, bytes: &[u8]) -> AppResult<()>;

    /// Reads a stored attachment payload.
    async fn read(&self, action_id: u64, stored_name: &str) -> AppResult<Vec<u8>>;

    /// Removes a stored payload; removing a missing payload succeeds.
    async fn remove(&self, action_id: u64, stored_name: &str) -> AppResult<()>;
}

/// A stored 8D case document together with its source filename.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseDocument {
    /// Source filename inside the case directory.
    pub filename: String,
    /// Parsed case content.
    pub case: EightDCase,
}

/// Read-only access to the externally authored 8D case documents.
#[async_trait]
pub trait CaseArchive: Send + Sync {
    /// Returns every readable case document; unreadable files are skipped.
    async fn list(&self) -> Vec<CaseDocument>;

    /// Reads a single case document by filename.
    async fn read(&self, filename: &str) -> Option<CaseDocument>;
}
