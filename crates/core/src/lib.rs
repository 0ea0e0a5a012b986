//! Shared primitives for all Rust crates in Capatrack.

#![forbid(unsafe_code)]

/// Acting-user identity and per-request operation context.
pub mod context;

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use context::{OperationContext, UserIdentity};

/// Result type used across Capatrack crates.
pub type AppResult<T> = Result<T, AppError>;

/// Ordered field-name to message map carried by validation failures.
///
/// Empty means valid. Iteration order is the sorted field order, so error
/// rendering is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Creates an empty error map.
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Records a message for a field, replacing any earlier message.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    /// Returns the message recorded for a field, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Returns whether no field has an error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of fields with an error.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over `(field, message)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(field, message)| (field.as_str(), message.as_str()))
    }

    /// Converts a non-empty map into a validation error, or `Ok(())`.
    pub fn into_result(self) -> AppResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

impl Display for FieldErrors {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                write!(formatter, "; ")?;
            }
            write!(formatter, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input; carries the per-field messages.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Durable write to the backing store failed.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Builds a validation error for a single field.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field, message);
        Self::Validation(errors)
    }
}
