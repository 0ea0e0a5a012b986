use std::path::{Path, PathBuf};

/// Filesystem layout of the persisted state.
///
/// Collection documents live directly in the data directory, attachment
/// payloads and 8D case documents in subdirectories of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    data_dir: PathBuf,
}

impl StorageConfig {
    /// Environment variable overriding the data directory.
    pub const DATA_DIR_ENV: &'static str = "CAPATRACK_DATA_DIR";

    /// Creates a configuration rooted at an explicit data directory.
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Resolves the data directory from the environment, defaulting to
    /// `data/` relative to the working directory.
    #[must_use]
    pub fn from_env() -> Self {
        let data_dir = std::env::var_os(Self::DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data"));
        Self { data_dir }
    }

    /// Returns the directory collection documents live in.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Returns the directory attachment payloads live in.
    #[must_use]
    pub fn attachments_dir(&self) -> PathBuf {
        self.data_dir.join("attachments")
    }

    /// Returns the directory 8D case documents are read from.
    #[must_use]
    pub fn cases_dir(&self) -> PathBuf {
        self.data_dir.join("8d")
    }
}
