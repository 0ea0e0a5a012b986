use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ports::{CaseArchive, CaseDocument};

/// Aggregate counters over the 8D case archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EightDStats {
    /// All readable cases.
    pub total: usize,
    /// Cases still being worked on.
    pub open: usize,
    /// Concluded cases.
    pub closed: usize,
}

/// Read-only view over the externally authored 8D case documents.
#[derive(Clone)]
pub struct EightDService {
    archive: Arc<dyn CaseArchive>,
}

impl EightDService {
    /// Creates an 8D service over a case archive.
    #[must_use]
    pub fn new(archive: Arc<dyn CaseArchive>) -> Self {
        Self { archive }
    }

    /// Returns all cases, newest creation date first.
    pub async fn get_all(&self) -> Vec<CaseDocument> {
        let mut documents = self.archive.list().await;
        documents.sort_by(|left, right| {
            right
                .case
                .meta
                .created_date
                .cmp(&left.case.meta.created_date)
        });
        documents
    }

    /// Finds a case by its business case number.
    pub async fn find_by_case_number(&self, case_number: &str) -> Option<CaseDocument> {
        self.get_all()
            .await
            .into_iter()
            .find(|document| document.case.meta.case_number == case_number)
    }

    /// Finds a case by its source filename.
    pub async fn find_by_filename(&self, filename: &str) -> Option<CaseDocument> {
        self.archive.read(filename).await
    }

    /// Computes the open/closed counters for the dashboard.
    pub async fn get_stats(&self) -> EightDStats {
        let documents = self.archive.list().await;
        let mut stats = EightDStats {
            total: documents.len(),
            ..EightDStats::default()
        };

        for document in &documents {
            if document.case.is_closed() {
                stats.closed += 1;
            } else {
                stats.open += 1;
            }
        }

        stats
    }
}
