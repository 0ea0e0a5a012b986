use std::sync::Arc;

use capatrack_core::{AppResult, OperationContext};
use capatrack_domain::{
    Attachment, extension_of, sanitize_filename, stored_name_for, validate_upload,
};
use tracing::{info, warn};

use crate::ports::{AttachmentFiles, RecordStore};
use crate::record_service::RecordService;

/// One upload handed over by the transport layer, already read into memory.
#[derive(Debug, Clone)]
pub struct AttachmentUpload {
    /// Client-supplied filename, not yet sanitized.
    pub filename: String,
    /// MIME type reported for the upload.
    pub mime_type: String,
    /// Optional description.
    pub description: String,
    /// File payload.
    pub bytes: Vec<u8>,
}

/// Lifecycle of file attachments belonging to actions.
///
/// Metadata records and blob payloads are kept in sync: storing writes the
/// blob before the record, deleting removes the blob alongside the record.
#[derive(Clone)]
pub struct AttachmentService {
    records: RecordService<Attachment>,
    files: Arc<dyn AttachmentFiles>,
}

impl AttachmentService {
    /// Creates an attachment service over a record store and blob store.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore<Attachment>>, files: Arc<dyn AttachmentFiles>) -> Self {
        Self {
            records: RecordService::new(store),
            files,
        }
    }

    /// Returns all attachments of one action, in upload order.
    pub async fn get_for_action(&self, action_id: u64) -> Vec<Attachment> {
        self.records
            .find_all_where(|attachment| attachment.action_id == action_id)
            .await
    }

    /// Finds an attachment by id.
    pub async fn find(&self, id: u64) -> Option<Attachment> {
        self.records.find(id).await
    }

    /// Stores a validated upload and its metadata record.
    pub async fn store(
        &self,
        context: &OperationContext,
        action_id: u64,
        upload: AttachmentUpload,
    ) -> AppResult<Attachment> {
        validate_upload(&upload.filename, upload.bytes.len() as u64).into_result()?;

        let filename = sanitize_filename(&upload.filename);
        let extension = extension_of(&filename).unwrap_or_default();
        let stored_name = stored_name_for(&extension);

        self.files
            .store(action_id, &stored_name, &upload.bytes)
            .await?;

        let record = Attachment {
            action_id,
            filename,
            stored_name,
            mime_type: upload.mime_type,
            size: upload.bytes.len() as u64,
            description: upload.description.trim().to_owned(),
            ..Attachment::default()
        };

        let stored = self.records.save(context, record).await?;
        info!(id = stored.id, action_id, "attachment stored");
        Ok(stored)
    }

    /// Reads the payload of a stored attachment.
    pub async fn open(&self, attachment: &Attachment) -> AppResult<Vec<u8>> {
        self.files
            .read(attachment.action_id, &attachment.stored_name)
            .await
    }

    /// Deletes an attachment and its backing payload.
    ///
    /// A missing payload is tolerated; a failing blob removal is logged
    /// and does not keep the record alive.
    pub async fn delete(&self, id: u64) -> AppResult<bool> {
        let Some(attachment) = self.records.find(id).await else {
            return Ok(false);
        };

        if let Err(error) = self
            .files
            .remove(attachment.action_id, &attachment.stored_name)
            .await
        {
            warn!(%error, id, "failed to remove attachment payload");
        }

        self.records.delete(id).await
    }

    /// Deletes every attachment of one action; returns how many went away.
    pub async fn delete_for_action(&self, action_id: u64) -> AppResult<usize> {
        let doomed = self.get_for_action(action_id).await;
        if doomed.is_empty() {
            return Ok(0);
        }

        for attachment in &doomed {
            if let Err(error) = self
                .files
                .remove(attachment.action_id, &attachment.stored_name)
                .await
            {
                warn!(%error, id = attachment.id, "failed to remove attachment payload");
            }
        }

        self.records
            .mutate(|attachments| {
                attachments.retain(|attachment| attachment.action_id != action_id);
                Ok(())
            })
            .await?;

        Ok(doomed.len())
    }
}
