use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use capatrack_application::AttachmentFiles;
use capatrack_core::{AppError, AppResult};
use tokio::fs;

/// Filesystem blob store for attachment payloads.
///
/// Payloads live under `<base>/<action_id>/<stored_name>`; stored names
/// are generated internally and never taken from user input.
#[derive(Debug, Clone)]
pub struct FsAttachmentFiles {
    base_path: PathBuf,
}

impl FsAttachmentFiles {
    /// Creates a blob store rooted at the given attachments directory.
    #[must_use]
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Returns the directory payloads of one action live in.
    #[must_use]
    pub fn directory_for(&self, action_id: u64) -> PathBuf {
        self.base_path.join(action_id.to_string())
    }

    /// Returns the full payload path for one stored name.
    #[must_use]
    pub fn path_for(&self, action_id: u64, stored_name: &str) -> PathBuf {
        self.directory_for(action_id).join(stored_name)
    }

    /// Returns the attachments base directory.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

#[async_trait]
impl AttachmentFiles for FsAttachmentFiles {
    async fn store(&self, action_id: u64, stored_name: &str, bytes: &[u8]) -> AppResult<()> {
        let directory = self.directory_for(action_id);
        fs::create_dir_all(&directory).await.map_err(|error| {
            AppError::Persistence(format!("failed to create attachment directory: {error}"))
        })?;

        fs::write(self.path_for(action_id, stored_name), bytes)
            .await
            .map_err(|error| {
                AppError::Persistence(format!("failed to write attachment payload: {error}"))
            })
    }

    async fn read(&self, action_id: u64, stored_name: &str) -> AppResult<Vec<u8>> {
        fs::read(self.path_for(action_id, stored_name))
            .await
            .map_err(|error| match error.kind() {
                ErrorKind::NotFound => AppError::NotFound("Soubor nebyl nalezen.".to_owned()),
                _ => AppError::Persistence(format!("failed to read attachment payload: {error}")),
            })
    }

    async fn remove(&self, action_id: u64, stored_name: &str) -> AppResult<()> {
        match fs::remove_file(self.path_for(action_id, stored_name)).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(AppError::Persistence(format!(
                "failed to remove attachment payload: {error}"
            ))),
        }
    }
}
