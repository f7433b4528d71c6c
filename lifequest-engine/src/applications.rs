//! Internship and job application pipeline.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::constants::LOG_APPLICATIONS;
use crate::error::LifeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    Screening,
    Interview,
    Offer,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: &'static [Self] = &[
        Self::Applied,
        Self::Screening,
        Self::Interview,
        Self::Offer,
        Self::Rejected,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Screening => "screening",
            Self::Interview => "interview",
            Self::Offer => "offer",
            Self::Rejected => "rejected",
        }
    }

    /// Offers and rejections end the pipeline.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Offer | Self::Rejected)
    }

    const fn stage(self) -> u8 {
        match self {
            Self::Applied => 0,
            Self::Screening => 1,
            Self::Interview => 2,
            Self::Offer => 3,
            Self::Rejected => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub u64);

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "app-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: ApplicationId,
    pub company: String,
    pub role: String,
    pub status: ApplicationStatus,
    /// Statuses whose reward has already been paid.
    #[serde(default)]
    pub paid: SmallVec<[ApplicationStatus; 5]>,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    /// Open a new application in the `Applied` state.
    ///
    /// # Errors
    ///
    /// Returns `LifeError::Validation` when company or role is blank.
    pub fn open(
        id: ApplicationId,
        company: impl Into<String>,
        role: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<Self, LifeError> {
        let company = company.into();
        let role = role.into();
        if company.trim().is_empty() {
            return Err(LifeError::validation("company", "must not be empty"));
        }
        if role.trim().is_empty() {
            return Err(LifeError::validation("role", "must not be empty"));
        }
        Ok(Self {
            id,
            company,
            role,
            status: ApplicationStatus::Applied,
            paid: SmallVec::new(),
            applied_at: at,
            updated_at: at,
        })
    }

    /// Move to `status`. Returns true when that status has not been paid
    /// before and the caller should award its XP.
    ///
    /// # Errors
    ///
    /// Returns `LifeError::Validation` when the pipeline is already closed
    /// or the move goes backwards.
    pub fn advance(
        &mut self,
        status: ApplicationStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, LifeError> {
        if status == self.status {
            return Ok(self.claim(status));
        }
        if self.status.is_terminal() {
            return Err(LifeError::validation("status", "application is closed"));
        }
        if status != ApplicationStatus::Rejected && status.stage() < self.status.stage() {
            return Err(LifeError::validation("status", "cannot move backwards"));
        }
        log::debug!(
            target: LOG_APPLICATIONS,
            "{} at {}: {:?} -> {:?}",
            self.role,
            self.company,
            self.status,
            status
        );
        self.status = status;
        self.updated_at = at;
        Ok(self.claim(status))
    }

    /// Record that `status` was paid; false if it already was.
    pub(crate) fn claim(&mut self, status: ApplicationStatus) -> bool {
        if self.paid.contains(&status) {
            return false;
        }
        self.paid.push(status);
        true
    }
}
