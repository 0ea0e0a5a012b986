use capatrack_core::{FieldErrors, OperationContext};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::record::Record;

/// Maximum accepted upload size in bytes (10 MiB).
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// File extensions accepted for attachment uploads.
pub const ALLOWED_EXTENSIONS: [&str; 11] = [
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "jpg", "jpeg", "png", "txt",
];

/// Metadata record for one uploaded file belonging to an action.
///
/// The blob itself lives outside the collection file under the randomized
/// `stored_name`; the original `filename` is kept only for display and
/// download headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attachment {
    /// Process-assigned record id.
    pub id: u64,
    /// Owning action.
    pub action_id: u64,
    /// Sanitized original filename.
    pub filename: String,
    /// Randomized on-disk name.
    pub stored_name: String,
    /// MIME type reported for the upload.
    pub mime_type: String,
    /// Size in bytes.
    pub size: u64,
    /// Optional description.
    pub description: String,
    /// Upload instant.
    pub uploaded_at: DateTime<Utc>,
    /// Display name of the uploading user.
    pub uploaded_by: String,
}

impl Default for Attachment {
    fn default() -> Self {
        Self {
            id: 0,
            action_id: 0,
            filename: String::new(),
            stored_name: String::new(),
            mime_type: String::new(),
            size: 0,
            description: String::new(),
            uploaded_at: DateTime::UNIX_EPOCH,
            uploaded_by: String::new(),
        }
    }
}

impl Record for Attachment {
    const FILE: &'static str = "attachments.json";
    const KEY: &'static str = "attachments";

    fn id(&self) -> u64 {
        self.id
    }

    fn assign_id(&mut self, id: u64) {
        self.id = id;
    }

    fn touch_created(&mut self, context: &OperationContext) {
        self.uploaded_at = context.now();
        self.uploaded_by = context.identity().display_name().to_owned();
    }
}

/// Sanitizes an uploaded filename for storage and display.
///
/// Strips any path components and NUL bytes, replaces characters outside
/// `[A-Za-z0-9_. -]` with underscores and caps the length at 200 bytes
/// while preserving the extension.
#[must_use]
pub fn sanitize_filename(raw: &str) -> String {
    let base = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .replace('\0', "");

    let mut cleaned: String = base
        .chars()
        .map(|character| {
            if character.is_ascii_alphanumeric() || matches!(character, '_' | '-' | '.' | ' ') {
                character
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.len() > 200 {
        let (stem, extension) = match cleaned.rsplit_once('.') {
            Some((stem, extension)) => (stem.to_owned(), Some(extension.to_owned())),
            None => (cleaned.clone(), None),
        };
        cleaned = stem.chars().take(195).collect();
        if let Some(extension) = extension {
            cleaned.push('.');
            cleaned.push_str(&extension);
        }
    }

    cleaned
}

/// Returns the lowercased extension of a filename, if it has one.
#[must_use]
pub fn extension_of(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, extension)| extension.to_ascii_lowercase())
        .filter(|extension| !extension.is_empty())
}

/// Generates a random collision-resistant stored name.
#[must_use]
pub fn stored_name_for(extension: &str) -> String {
    format!(
        "{}.{}",
        Uuid::new_v4().simple(),
        extension.to_ascii_lowercase()
    )
}

/// Validates upload metadata against the size cap and extension whitelist.
#[must_use]
pub fn validate_upload(filename: &str, size: u64) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if sanitize_filename(filename).trim_matches(['_', '.', ' ']).is_empty() {
        errors.insert("file", "Nebyl vybrán žádný soubor.");
        return errors;
    }

    if size > MAX_FILE_SIZE {
        errors.insert("file", "Soubor je příliš velký. Maximum je 10 MB.");
        return errors;
    }

    match extension_of(filename) {
        Some(extension) if ALLOWED_EXTENSIONS.contains(&extension.as_str()) => {}
        _ => {
            errors.insert(
                "file",
                format!(
                    "Nepodporovaný typ souboru. Povolené: {}",
                    ALLOWED_EXTENSIONS.join(", ")
                ),
            );
        }
    }

    errors
}
