use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle status recorded in an 8D case header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    /// Case is still being worked on.
    #[default]
    InProgress,
    /// Case has been concluded.
    Closed,
    /// Unrecognized status value; treated as open.
    #[serde(other)]
    Other,
}

/// The eight disciplines of an 8D report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DStep {
    /// Team assembly.
    D1,
    /// Problem description.
    D2,
    /// Interim containment actions.
    D3,
    /// Root-cause analysis.
    D4,
    /// Corrective actions.
    D5,
    /// Implementation and validation.
    D6,
    /// Recurrence prevention.
    D7,
    /// Closure and recognition.
    D8,
}

impl DStep {
    /// All steps in report order.
    pub const ALL: [DStep; 8] = [
        DStep::D1,
        DStep::D2,
        DStep::D3,
        DStep::D4,
        DStep::D5,
        DStep::D6,
        DStep::D7,
        DStep::D8,
    ];

    /// Returns the step key used in case documents.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            DStep::D1 => "D1",
            DStep::D2 => "D2",
            DStep::D3 => "D3",
            DStep::D4 => "D4",
            DStep::D5 => "D5",
            DStep::D6 => "D6",
            DStep::D7 => "D7",
            DStep::D8 => "D8",
        }
    }

    /// Returns the Czech step label shown in report headers.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            DStep::D1 => "Sestavení týmu",
            DStep::D2 => "Popis problému",
            DStep::D3 => "Okamžitá opatření",
            DStep::D4 => "Analýza příčin",
            DStep::D5 => "Nápravná opatření",
            DStep::D6 => "Realizace a validace",
            DStep::D7 => "Prevence opakování",
            DStep::D8 => "Závěr a ocenění",
        }
    }
}

/// Header block of an 8D case document.
///
/// Wire names follow the Czech keys of the authoring tool's file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseMeta {
    /// Case number, e.g. `PC-123`.
    #[serde(rename = "cislo_pripadu")]
    pub case_number: String,
    /// Case title.
    #[serde(rename = "nazev")]
    pub name: String,
    /// Customer the case was raised for.
    #[serde(rename = "zakaznik")]
    pub customer: String,
    /// Lifecycle status.
    pub status: CaseStatus,
    /// Creation date string.
    #[serde(rename = "datum_vzniku")]
    pub created_date: String,
    /// Last-update date string.
    #[serde(rename = "posledni_aktualizace")]
    pub updated_date: String,
    /// Document format version.
    #[serde(rename = "verze")]
    pub version: String,
}

impl Default for CaseMeta {
    fn default() -> Self {
        Self {
            case_number: String::new(),
            name: String::new(),
            customer: String::new(),
            status: CaseStatus::InProgress,
            created_date: String::new(),
            updated_date: String::new(),
            version: "1.0".to_owned(),
        }
    }
}

/// One 8D problem-solving report loaded from a case document.
///
/// Step payloads are kept as raw JSON; their inner structure belongs to
/// the authoring tool and is only inspected for presence of content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EightDCase {
    /// Header block.
    #[serde(default)]
    pub meta: CaseMeta,
    #[serde(flatten)]
    steps: BTreeMap<String, Value>,
}

impl EightDCase {
    /// Returns the raw payload of a step, if the document carries one.
    #[must_use]
    pub fn step(&self, step: DStep) -> Option<&Value> {
        self.steps.get(step.key())
    }

    /// Returns the `must_have` block of a step.
    #[must_use]
    pub fn must_have(&self, step: DStep) -> Option<&Value> {
        self.step(step).and_then(|payload| payload.get("must_have"))
    }

    /// Returns whether a step carries meaningful content.
    ///
    /// A step whose `must_have` block holds only empty strings, empty
    /// containers and nulls counts as absent.
    #[must_use]
    pub fn has_step(&self, step: DStep) -> bool {
        self.must_have(step).is_some_and(has_content)
    }

    /// Counts the steps that carry meaningful content.
    #[must_use]
    pub fn completed_steps(&self) -> usize {
        DStep::ALL
            .into_iter()
            .filter(|step| self.has_step(*step))
            .count()
    }

    /// Returns whether the case is concluded.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.meta.status == CaseStatus::Closed
    }
}

fn has_content(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(text) => !text.trim().is_empty(),
        Value::Array(items) => items.iter().any(has_content),
        Value::Object(entries) => entries.values().any(has_content),
        Value::Bool(_) | Value::Number(_) => true,
    }
}
