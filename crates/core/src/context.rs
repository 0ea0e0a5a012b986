use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// User information resolved by the authentication layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    login: String,
    display_name: String,
}

impl UserIdentity {
    /// Creates a user identity from authentication data.
    #[must_use]
    pub fn new(login: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            display_name: display_name.into(),
        }
    }

    /// Returns the stable login identifier used for audit stamping.
    #[must_use]
    pub fn login(&self) -> &str {
        self.login.as_str()
    }

    /// Returns the display name for the current user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }
}

/// Per-operation context passed explicitly to every mutating service call.
///
/// Carries the acting identity and the wall-clock instant of the request,
/// so services never read ambient globals and tests can pin both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationContext {
    identity: UserIdentity,
    now: DateTime<Utc>,
}

impl OperationContext {
    /// Creates a context for one logical operation.
    #[must_use]
    pub fn new(identity: UserIdentity, now: DateTime<Utc>) -> Self {
        Self { identity, now }
    }

    /// Returns the acting identity.
    #[must_use]
    pub fn identity(&self) -> &UserIdentity {
        &self.identity
    }

    /// Returns the acting login identifier.
    #[must_use]
    pub fn login(&self) -> &str {
        self.identity.login()
    }

    /// Returns the instant this operation executes at.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Returns the calendar date of [`Self::now`].
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }
}
