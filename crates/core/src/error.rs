//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// state-machine guards, conflicts). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed or missing input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A state-machine transition was attempted from a state that does not
    /// permit it. Names both sides so the caller can tell a stale read from
    /// a programming error.
    #[error("invalid transition: cannot {attempted} from state {from}")]
    InvalidTransition { from: String, attempted: String },

    /// A status value was not recognized, or is not permitted through the
    /// attempted path (system-controlled milestone statuses).
    #[error("invalid status: {0}")]
    InvalidStatus(String),

    /// A once-only milestone tracking event already exists for the shipment.
    /// Non-retryable: signals a logic or race error upstream.
    #[error("system status conflict: {0}")]
    SystemStatusConflict(String),

    /// Mutation attempted on a shipment whose delivered latch is set.
    #[error("shipment locked: {0}")]
    Locked(String),

    /// A conflict occurred (e.g. uniqueness violation, lost write race).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Authorization failure at the domain boundary.
    #[error("unauthorized")]
    Unauthorized,

    /// An external collaborator (geocoder, mailer) failed. Logged and
    /// swallowed by the operation it was enriching, never surfaced to its
    /// caller.
    #[error("dependency failure: {0}")]
    Dependency(String),

    /// Storage-layer fault outside the domain taxonomy.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn invalid_transition(from: impl Into<String>, attempted: impl Into<String>) -> Self {
        Self::InvalidTransition {
            from: from.into(),
            attempted: attempted.into(),
        }
    }

    pub fn invalid_status(msg: impl Into<String>) -> Self {
        Self::InvalidStatus(msg.into())
    }

    pub fn system_status_conflict(msg: impl Into<String>) -> Self {
        Self::SystemStatusConflict(msg.into())
    }

    pub fn locked(msg: impl Into<String>) -> Self {
        Self::Locked(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn dependency(msg: impl Into<String>) -> Self {
        Self::Dependency(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
