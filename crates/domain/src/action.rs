use capatrack_core::{FieldErrors, OperationContext};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::casting;
use crate::record::{Record, is_strict_date};

/// One audit finding together with its planned corrective measure.
///
/// `number` is the business-visible sequence shown to auditors; it is
/// assigned independently of `id` and both are never reused. The four
/// `status_*` flags are the PDCA completion gates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Action {
    /// Process-assigned record id.
    pub id: u64,
    /// Business-visible sequential number.
    pub number: u64,
    /// Severity rating of the finding.
    pub rating: String,
    /// Finding summary.
    pub finding: String,
    /// Optional long-form description.
    pub description: Option<String>,
    /// Standard chapter the finding relates to.
    pub chapter: String,
    /// Root cause of the problem.
    pub problem_cause: Option<String>,
    /// Corrective measure taken or planned.
    pub measure: Option<String>,
    /// Affected process.
    pub process: Option<String>,
    /// Owner of the affected process.
    pub process_owner: String,
    /// Person responsible for the corrective measure.
    pub responsible: Option<String>,
    /// Realization deadline (`YYYY-MM-DD`).
    pub deadline: Option<String>,
    /// Planning deadline (`YYYY-MM-DD`).
    pub deadline_plan: Option<String>,
    /// Date the finding was recorded (`YYYY-MM-DD`).
    pub finding_date: String,
    /// Audit session this finding was raised in, if any.
    pub audit_session_id: Option<u64>,
    /// Plan gate.
    pub status_plan: bool,
    /// Do gate.
    pub status_do: bool,
    /// Check gate.
    pub status_check: bool,
    /// Act gate.
    pub status_act: bool,
    /// Soft-archival flag; archived records are hidden from default views.
    pub archived: bool,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Login of the creating user.
    pub created_by: String,
    /// Last-update instant.
    pub updated_at: DateTime<Utc>,
    /// Login of the last updating user.
    pub updated_by: String,
    /// Instant all four PDCA gates first became true; set at most once.
    pub completed_at: Option<DateTime<Utc>>,
    /// Whether completion happened on or before the deadline.
    pub on_time: Option<bool>,
    /// Human-readable timeliness verdict.
    pub timeliness: Option<String>,
}

impl Default for Action {
    fn default() -> Self {
        Self {
            id: 0,
            number: 0,
            rating: String::new(),
            finding: String::new(),
            description: None,
            chapter: String::new(),
            problem_cause: None,
            measure: None,
            process: None,
            process_owner: String::new(),
            responsible: None,
            deadline: None,
            deadline_plan: None,
            finding_date: String::new(),
            audit_session_id: None,
            status_plan: false,
            status_do: false,
            status_check: false,
            status_act: false,
            archived: false,
            created_at: DateTime::UNIX_EPOCH,
            created_by: String::new(),
            updated_at: DateTime::UNIX_EPOCH,
            updated_by: String::new(),
            completed_at: None,
            on_time: None,
            timeliness: None,
        }
    }
}

impl Action {
    /// Validates required fields and date formats.
    ///
    /// Pure check with no side effects; an empty map means valid.
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        for (field, value) in [
            ("rating", self.rating.as_str()),
            ("finding_date", self.finding_date.as_str()),
            ("finding", self.finding.as_str()),
            ("process_owner", self.process_owner.as_str()),
            ("chapter", self.chapter.as_str()),
        ] {
            if value.trim().is_empty() {
                errors.insert(field, format!("{} je povinné pole.", field_label(field)));
            }
        }

        if let Some(deadline) = self.deadline.as_deref()
            && !deadline.is_empty()
            && !is_strict_date(deadline)
        {
            errors.insert("deadline", "Neplatný formát data termínu.");
        }

        if !self.finding_date.is_empty() && !is_strict_date(&self.finding_date) {
            errors.insert("finding_date", "Neplatný formát data zjištění.");
        }

        errors
    }

    /// Returns whether all four PDCA gates are set.
    #[must_use]
    pub fn pdca_complete(&self) -> bool {
        self.status_plan && self.status_do && self.status_check && self.status_act
    }

    /// Returns the PDCA gate snapshot.
    #[must_use]
    pub fn pdca_status(&self) -> PdcaStatus {
        PdcaStatus {
            plan: self.status_plan,
            r#do: self.status_do,
            check: self.status_check,
            act: self.status_act,
            complete: self.pdca_complete(),
        }
    }
}

impl Record for Action {
    const FILE: &'static str = "actions.json";
    const KEY: &'static str = "actions";

    fn id(&self) -> u64 {
        self.id
    }

    fn assign_id(&mut self, id: u64) {
        self.id = id;
    }

    fn touch_created(&mut self, context: &OperationContext) {
        self.created_at = context.now();
        self.created_by = context.login().to_owned();
    }

    fn touch_updated(&mut self, context: &OperationContext) {
        self.updated_at = context.now();
        self.updated_by = context.login().to_owned();
    }
}

/// Snapshot of the four PDCA gates plus the combined verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdcaStatus {
    /// Plan gate.
    pub plan: bool,
    /// Do gate.
    pub r#do: bool,
    /// Check gate.
    pub check: bool,
    /// Act gate.
    pub act: bool,
    /// All four gates set.
    pub complete: bool,
}

/// Externally writable fields of an [`Action`].
///
/// Absent fields leave the target unchanged, which gives updates their
/// partial semantics. System fields (`id`, `number`, audit stamps,
/// completion state) are not expressible here, so untrusted input can
/// never reach them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ActionPatch {
    /// Severity rating.
    pub rating: Option<String>,
    /// Finding summary.
    pub finding: Option<String>,
    /// Long-form description.
    pub description: Option<String>,
    /// Standard chapter.
    pub chapter: Option<String>,
    /// Root cause.
    pub problem_cause: Option<String>,
    /// Corrective measure.
    pub measure: Option<String>,
    /// Affected process.
    pub process: Option<String>,
    /// Process owner.
    pub process_owner: Option<String>,
    /// Responsible person.
    pub responsible: Option<String>,
    /// Realization deadline.
    pub deadline: Option<String>,
    /// Planning deadline.
    pub deadline_plan: Option<String>,
    /// Date of the finding.
    pub finding_date: Option<String>,
    /// Linked audit session.
    #[serde(deserialize_with = "casting::lenient_id")]
    pub audit_session_id: Option<u64>,
    /// Plan gate.
    #[serde(deserialize_with = "casting::lenient_flag")]
    pub status_plan: Option<bool>,
    /// Do gate.
    #[serde(deserialize_with = "casting::lenient_flag")]
    pub status_do: Option<bool>,
    /// Check gate.
    #[serde(deserialize_with = "casting::lenient_flag")]
    pub status_check: Option<bool>,
    /// Act gate.
    #[serde(deserialize_with = "casting::lenient_flag")]
    pub status_act: Option<bool>,
    /// Soft-archival flag.
    #[serde(deserialize_with = "casting::lenient_flag")]
    pub archived: Option<bool>,
}

impl ActionPatch {
    /// Applies every present field onto the target action.
    pub fn apply(&self, action: &mut Action) {
        if let Some(value) = &self.rating {
            action.rating = value.clone();
        }
        if let Some(value) = &self.finding {
            action.finding = value.clone();
        }
        if let Some(value) = &self.description {
            action.description = Some(value.clone());
        }
        if let Some(value) = &self.chapter {
            action.chapter = value.clone();
        }
        if let Some(value) = &self.problem_cause {
            action.problem_cause = Some(value.clone());
        }
        if let Some(value) = &self.measure {
            action.measure = Some(value.clone());
        }
        if let Some(value) = &self.process {
            action.process = Some(value.clone());
        }
        if let Some(value) = &self.process_owner {
            action.process_owner = value.clone();
        }
        if let Some(value) = &self.responsible {
            action.responsible = Some(value.clone());
        }
        if let Some(value) = &self.deadline {
            action.deadline = Some(value.clone());
        }
        if let Some(value) = &self.deadline_plan {
            action.deadline_plan = Some(value.clone());
        }
        if let Some(value) = &self.finding_date {
            action.finding_date = value.clone();
        }
        if let Some(value) = self.audit_session_id {
            action.audit_session_id = Some(value);
        }
        if let Some(value) = self.status_plan {
            action.status_plan = value;
        }
        if let Some(value) = self.status_do {
            action.status_do = value;
        }
        if let Some(value) = self.status_check {
            action.status_check = value;
        }
        if let Some(value) = self.status_act {
            action.status_act = value;
        }
        if let Some(value) = self.archived {
            action.archived = value;
        }
    }
}

/// Dashboard aggregates over the non-archived action collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionStats {
    /// Count of all non-archived actions.
    pub total_open: usize,
    /// Not completed and past their deadline.
    pub overdue: usize,
    /// Not completed with a deadline within the next seven days.
    pub due_this_week: usize,
    /// Completed within the current calendar month.
    pub completed_this_month: usize,
}

fn field_label(field: &str) -> &'static str {
    match field {
        "rating" => "Hodnocení",
        "finding" => "Zjištění",
        "description" => "Popis",
        "chapter" => "Kapitola normy",
        "problem_cause" => "Příčina problému",
        "measure" => "Opatření",
        "process" => "Proces",
        "process_owner" => "Majitel procesu",
        "responsible" => "Odpovědný",
        "deadline" => "Termín realizace",
        "deadline_plan" => "Termín plánu",
        "finding_date" => "Datum zjištění",
        _ => "Pole",
    }
}
