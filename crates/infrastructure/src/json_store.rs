use std::path::{Path, PathBuf};

use capatrack_core::{AppError, AppResult};
use serde_json::{Map, Value};
use tokio::fs;
use tracing::warn;
use uuid::Uuid;

/// Durable, atomic read/write of JSON document files under one directory.
///
/// Writes go to a freshly named temporary file in the same directory and
/// are renamed over the target, so readers never observe a partially
/// written document. No locking happens at this level; callers serialize
/// writers per collection.
#[derive(Debug, Clone)]
pub struct JsonDocumentStore {
    base_path: PathBuf,
}

impl JsonDocumentStore {
    /// Creates a store rooted at the given data directory.
    #[must_use]
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Returns the data directory this store reads and writes under.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Reads a document, treating absence and corruption as "no data yet".
    pub async fn read_document(&self, file: &str) -> Map<String, Value> {
        let path = self.base_path.join(file);

        let Ok(bytes) = fs::read(&path).await else {
            return Map::new();
        };

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(document)) => document,
            Ok(_) => {
                warn!(file, "stored document is not a JSON object, ignoring it");
                Map::new()
            }
            Err(error) => {
                warn!(file, %error, "stored document is unparsable, ignoring it");
                Map::new()
            }
        }
    }

    /// Writes a document atomically.
    ///
    /// On rename failure the temporary file is removed and the original
    /// document is left untouched.
    pub async fn write_document(&self, file: &str, document: &Map<String, Value>) -> AppResult<()> {
        let path = self.base_path.join(file);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|error| {
                AppError::Persistence(format!("failed to create data directory: {error}"))
            })?;
        }

        let payload = serde_json::to_vec_pretty(document)
            .map_err(|error| AppError::Persistence(format!("failed to encode '{file}': {error}")))?;

        let mut temp_name = path.clone().into_os_string();
        temp_name.push(format!(".tmp.{}", Uuid::new_v4().simple()));
        let temp_path = PathBuf::from(temp_name);

        fs::write(&temp_path, &payload).await.map_err(|error| {
            AppError::Persistence(format!("failed to write temporary file for '{file}': {error}"))
        })?;

        if let Err(error) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(AppError::Persistence(format!(
                "failed to replace '{file}': {error}"
            )));
        }

        Ok(())
    }
}
