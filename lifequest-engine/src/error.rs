//! Error taxonomy for session mutations.
use thiserror::Error;

/// Gauge a mission or action can run short of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Energy,
    Mood,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Energy => write!(f, "energy"),
            Self::Mood => write!(f, "mood"),
        }
    }
}

/// Failure of a single session operation.
///
/// None of these are fatal: callers surface the message and leave the
/// session usable. Only `Persistence` is worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifeError {
    #[error("{field} {reason}")]
    Validation {
        field: &'static str,
        reason: &'static str,
    },
    #[error("not enough {resource}: need {needed}, have {available}")]
    InsufficientResource {
        resource: Resource,
        needed: i32,
        available: i32,
    },
    #[error("{what} '{id}' not found")]
    NotFound { what: &'static str, id: String },
    #[error("zone '{0}' is locked")]
    ZoneLocked(String),
    #[error("zone '{zone}' requires level {required_level} (current level {level})")]
    ZoneNotUnlockable {
        zone: String,
        required_level: u32,
        level: u32,
    },
    #[error("persistence failed: {0}")]
    Persistence(String),
}

impl LifeError {
    pub(crate) const fn validation(field: &'static str, reason: &'static str) -> Self {
        Self::Validation { field, reason }
    }

    pub(crate) fn not_found(what: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            what,
            id: id.into(),
        }
    }

    /// Whether retrying the same call can succeed without other changes.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}
