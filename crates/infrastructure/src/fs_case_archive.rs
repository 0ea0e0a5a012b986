use std::path::{Path, PathBuf};

use async_trait::async_trait;
use capatrack_application::{CaseArchive, CaseDocument};
use capatrack_domain::EightDCase;
use tokio::fs;
use tracing::warn;

/// Directory reader for externally authored 8D case documents.
///
/// Case files are named `8D_*.json`; the structure template and
/// `*_template*` files are skipped, as is anything that fails to parse.
#[derive(Debug, Clone)]
pub struct FsCaseArchive {
    case_dir: PathBuf,
}

impl FsCaseArchive {
    /// Creates an archive over the given case directory.
    #[must_use]
    pub fn new(case_dir: impl Into<PathBuf>) -> Self {
        Self {
            case_dir: case_dir.into(),
        }
    }

    /// Returns the directory cases are read from.
    #[must_use]
    pub fn case_dir(&self) -> &Path {
        &self.case_dir
    }

    fn is_case_file(filename: &str) -> bool {
        filename.starts_with("8D_")
            && filename.ends_with(".json")
            && filename != "8D_structure.json"
            && !filename.contains("_template")
    }

    async fn read_case(&self, filename: &str) -> Option<EightDCase> {
        let path = self.case_dir.join(filename);
        let bytes = fs::read(&path).await.ok()?;

        match serde_json::from_slice(&bytes) {
            Ok(case) => Some(case),
            Err(error) => {
                warn!(filename, %error, "skipping unparsable 8D case file");
                None
            }
        }
    }
}

#[async_trait]
impl CaseArchive for FsCaseArchive {
    async fn list(&self) -> Vec<CaseDocument> {
        let Ok(mut entries) = fs::read_dir(&self.case_dir).await else {
            return Vec::new();
        };

        let mut filenames = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            let filename = entry.file_name().to_string_lossy().into_owned();
            if Self::is_case_file(&filename) {
                filenames.push(filename);
            }
        }
        filenames.sort();

        let mut documents = Vec::new();
        for filename in filenames {
            if let Some(case) = self.read_case(&filename).await {
                documents.push(CaseDocument { filename, case });
            }
        }
        documents
    }

    async fn read(&self, filename: &str) -> Option<CaseDocument> {
        // Filenames come from routes; never let them escape the case dir.
        if filename.contains(['/', '\\']) || filename.contains("..") {
            return None;
        }

        let case = self.read_case(filename).await?;
        Some(CaseDocument {
            filename: filename.to_owned(),
            case,
        })
    }
}
