use capatrack_core::{FieldErrors, OperationContext};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::{Record, is_strict_date};

/// Audit types offered for selection; the last entry stands for free text.
pub const AUDIT_TYPES: [&str; 6] = [
    "Interní audit",
    "Externí audit (certifikace)",
    "Zákaznický audit",
    "Procesní audit",
    "Neohlášená kontrola",
    "Vlastní typ",
];

/// One audit event grouping the findings raised during it.
///
/// Actions reference a session through `audit_session_id`; deleting a
/// session leaves those references dangling on purpose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditSession {
    /// Process-assigned record id.
    pub id: u64,
    /// Session name.
    pub name: String,
    /// Audit type, one of [`AUDIT_TYPES`] or free text.
    #[serde(rename = "type")]
    pub session_type: String,
    /// Audit date (`YYYY-MM-DD`).
    pub date: String,
    /// Auditor name.
    pub auditor: Option<String>,
    /// Audited standard.
    pub standard: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Last-update instant.
    pub updated_at: DateTime<Utc>,
}

impl Default for AuditSession {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            session_type: String::new(),
            date: String::new(),
            auditor: None,
            standard: None,
            notes: None,
            created_at: DateTime::UNIX_EPOCH,
            updated_at: DateTime::UNIX_EPOCH,
        }
    }
}

impl AuditSession {
    /// Validates required fields and the audit date format.
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        for (field, label, value) in [
            ("name", "Název auditu", self.name.as_str()),
            ("type", "Typ auditu", self.session_type.as_str()),
            ("date", "Datum auditu", self.date.as_str()),
        ] {
            if value.trim().is_empty() {
                errors.insert(field, format!("{label} je povinné pole."));
            }
        }

        if !self.date.is_empty() && !is_strict_date(&self.date) {
            errors.insert("date", "Neplatný formát data auditu.");
        }

        errors
    }
}

impl Record for AuditSession {
    const FILE: &'static str = "audit_sessions.json";
    const KEY: &'static str = "audit_sessions";

    fn id(&self) -> u64 {
        self.id
    }

    fn assign_id(&mut self, id: u64) {
        self.id = id;
    }

    fn touch_created(&mut self, context: &OperationContext) {
        self.created_at = context.now();
    }

    fn touch_updated(&mut self, context: &OperationContext) {
        self.updated_at = context.now();
    }
}

/// Externally writable fields of an [`AuditSession`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AuditSessionPatch {
    /// Session name.
    pub name: Option<String>,
    /// Audit type.
    #[serde(rename = "type")]
    pub session_type: Option<String>,
    /// Audit date.
    pub date: Option<String>,
    /// Auditor name.
    pub auditor: Option<String>,
    /// Audited standard.
    pub standard: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
}

impl AuditSessionPatch {
    /// Applies every present field onto the target session.
    pub fn apply(&self, session: &mut AuditSession) {
        if let Some(value) = &self.name {
            session.name = value.clone();
        }
        if let Some(value) = &self.session_type {
            session.session_type = value.clone();
        }
        if let Some(value) = &self.date {
            session.date = value.clone();
        }
        if let Some(value) = &self.auditor {
            session.auditor = Some(value.clone());
        }
        if let Some(value) = &self.standard {
            session.standard = Some(value.clone());
        }
        if let Some(value) = &self.notes {
            session.notes = Some(value.clone());
        }
    }
}
