//! Savings, business, learning, and commitment goals.
//!
//! A goal pays its `xp_reward` exactly once, on the contribution (or
//! target edit) that first brings `current` up to `target`. After that,
//! `completed` stays true no matter what happens to `current`.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{GOAL_COMPLETION_TOLERANCE, LOG_GOALS};
use crate::error::LifeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalKind {
    Savings,
    Business,
    Learning,
    /// A public commitment; can also be failed.
    Commitment,
}

impl GoalKind {
    pub const ALL: &'static [Self] = &[
        Self::Savings,
        Self::Business,
        Self::Learning,
        Self::Commitment,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Savings => "savings",
            Self::Business => "business",
            Self::Learning => "learning",
            Self::Commitment => "commitment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoalId(pub u64);

impl std::fmt::Display for GoalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "goal-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: GoalId,
    pub title: String,
    pub kind: GoalKind,
    pub target: f64,
    pub current: f64,
    pub xp_reward: i64,
    pub completed: bool,
    #[serde(default)]
    pub failed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

/// Result of a contribution or target edit.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GoalContribution {
    /// One-time completion payout; zero unless this call completed the goal.
    pub bonus_xp: i64,
    /// Actual change to `current` after clamping.
    pub applied: f64,
}

impl Goal {
    /// Build a validated goal with nothing contributed yet.
    ///
    /// # Errors
    ///
    /// Returns `LifeError::Validation` for an empty title, a non-positive
    /// target, or a negative reward.
    pub fn new(
        id: GoalId,
        title: impl Into<String>,
        kind: GoalKind,
        target: f64,
        xp_reward: i64,
        created_at: DateTime<Utc>,
    ) -> Result<Self, LifeError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(LifeError::validation("title", "must not be empty"));
        }
        validate_target(target)?;
        if xp_reward < 0 {
            return Err(LifeError::validation("xp_reward", "must not be negative"));
        }
        Ok(Self {
            id,
            title,
            kind,
            target,
            current: 0.0,
            xp_reward,
            completed: false,
            failed: false,
            created_at,
            deadline: None,
        })
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Add `amount` (negative withdraws), clamping `current` to `[0, target]`.
    ///
    /// # Errors
    ///
    /// Returns `LifeError::Validation` for a non-finite amount or a failed
    /// commitment.
    pub fn contribute(&mut self, amount: f64) -> Result<GoalContribution, LifeError> {
        if !amount.is_finite() {
            return Err(LifeError::validation("amount", "must be a finite number"));
        }
        if self.failed {
            return Err(LifeError::validation("goal", "is closed after failure"));
        }
        let before = self.current;
        self.current = (self.current + amount).clamp(0.0, self.target);
        Ok(GoalContribution {
            bonus_xp: self.settle(),
            applied: self.current - before,
        })
    }

    /// Change the target and re-clamp `current`.
    ///
    /// # Errors
    ///
    /// Returns `LifeError::Validation` for a non-positive target.
    pub fn edit_target(&mut self, target: f64) -> Result<GoalContribution, LifeError> {
        validate_target(target)?;
        let before = self.current;
        self.target = target;
        self.current = self.current.clamp(0.0, target);
        let bonus_xp = if self.failed { 0 } else { self.settle() };
        Ok(GoalContribution {
            bonus_xp,
            applied: self.current - before,
        })
    }

    /// Mark a commitment as failed; returns true the first time only.
    pub fn fail(&mut self) -> bool {
        if self.kind != GoalKind::Commitment || self.completed || self.failed {
            return false;
        }
        self.failed = true;
        log::info!(target: LOG_GOALS, "commitment '{}' failed", self.title);
        true
    }

    /// Re-establish the invariants of a goal read back from storage.
    ///
    /// Returns `None` when the target is unusable. `current` is clamped into
    /// `[0, target]`, and a goal already at its target is marked complete
    /// without a payout, since any payout would already be in the ledger.
    #[must_use]
    pub fn sanitized(mut self) -> Option<Self> {
        if validate_target(self.target).is_err() {
            log::warn!(target: LOG_GOALS, "dropped stored {}: invalid target", self.id);
            return None;
        }
        self.current = if self.current.is_finite() {
            self.current.clamp(0.0, self.target)
        } else {
            0.0
        };
        self.xp_reward = self.xp_reward.max(0);
        if !self.completed && !self.failed && reached(self.current, self.target) {
            log::warn!(target: LOG_GOALS, "stored {} was at target; closing it", self.id);
            self.current = self.target;
            self.completed = true;
        }
        Some(self)
    }

    /// Percent of target reached, 0-100.
    #[must_use]
    pub fn progress_pct(&self) -> f64 {
        if self.target > 0.0 {
            (self.current / self.target * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        }
    }

    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.deadline.is_some_and(|deadline| now > deadline)
    }

    /// Flip `completed` on first reaching the target, returning the payout.
    fn settle(&mut self) -> i64 {
        if self.completed || !reached(self.current, self.target) {
            return 0;
        }
        self.current = self.target;
        self.completed = true;
        log::info!(
            target: LOG_GOALS,
            "goal '{}' completed (+{} XP)",
            self.title,
            self.xp_reward
        );
        self.xp_reward
    }
}

/// Float sums such as ten contributions of 0.1 land a hair below 1.0.
fn reached(current: f64, target: f64) -> bool {
    target - current <= target * GOAL_COMPLETION_TOLERANCE
}

fn validate_target(target: f64) -> Result<(), LifeError> {
    if target.is_finite() && target > 0.0 {
        Ok(())
    } else {
        Err(LifeError::validation("target", "must be greater than zero"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn savings(target: f64) -> Goal {
        let created = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        Goal::new(GoalId(1), "Emergency fund", GoalKind::Savings, target, 500, created).unwrap()
    }

    #[test]
    fn reaching_target_pays_once() {
        let mut goal = savings(10_000.0);
        for _ in 0..4 {
            assert_eq!(goal.contribute(1_000.0).unwrap().bonus_xp, 0);
        }
        let done = goal.contribute(6_000.0).unwrap();
        assert_eq!(done.bonus_xp, 500);
        assert!(goal.completed);
        assert!((goal.current - 10_000.0).abs() < f64::EPSILON);

        let after = goal.contribute(1_000.0).unwrap();
        assert_eq!(after.bonus_xp, 0);
        assert!(after.applied.abs() < f64::EPSILON);
        assert!((goal.current - 10_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn withdrawals_clamp_at_zero_and_keep_completion() {
        let mut goal = savings(100.0);
        goal.contribute(150.0).unwrap();
        assert!(goal.completed);
        let out = goal.contribute(-500.0).unwrap();
        assert!((goal.current).abs() < f64::EPSILON);
        assert!((out.applied + 100.0).abs() < f64::EPSILON);
        assert!(goal.completed);
        assert_eq!(goal.contribute(100.0).unwrap().bonus_xp, 0);
    }

    #[test]
    fn lowering_target_can_complete_but_never_twice() {
        let mut goal = savings(1_000.0);
        goal.contribute(600.0).unwrap();
        assert_eq!(goal.edit_target(500.0).unwrap().bonus_xp, 500);
        assert!((goal.current - 500.0).abs() < f64::EPSILON);
        assert_eq!(goal.edit_target(400.0).unwrap().bonus_xp, 0);
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let created = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert!(Goal::new(GoalId(2), "  ", GoalKind::Learning, 10.0, 0, created).is_err());
        assert!(Goal::new(GoalId(2), "Read", GoalKind::Learning, 0.0, 0, created).is_err());
        let mut goal = savings(10.0);
        assert!(goal.contribute(f64::NAN).is_err());
        assert!(goal.edit_target(-1.0).is_err());
    }

    #[test]
    fn only_open_commitments_fail() {
        let created = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut pledge =
            Goal::new(GoalId(3), "Ship MVP", GoalKind::Commitment, 1.0, 250, created).unwrap();
        assert!(pledge.fail());
        assert!(!pledge.fail());
        assert!(pledge.contribute(1.0).is_err());
        assert!(!savings(10.0).fail());
    }

    #[test]
    fn overdue_needs_deadline_and_open_goal() {
        let deadline = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let mut goal = savings(10.0).with_deadline(deadline);
        assert!(goal.is_overdue(later));
        goal.contribute(10.0).unwrap();
        assert!(!goal.is_overdue(later));
    }

    #[test]
    fn fractional_contributions_reach_the_target() {
        let mut goal = savings(1.0);
        let bonus: i64 = (0..10).map(|_| goal.contribute(0.1).unwrap().bonus_xp).sum();
        assert_eq!(bonus, 500);
        assert!(goal.completed);
        assert!((goal.current - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn sanitized_restores_stored_invariants() {
        let mut over = savings(100.0);
        over.current = 250.0;
        let over = over.sanitized().unwrap();
        assert!((over.current - 100.0).abs() < f64::EPSILON);
        assert!(over.completed);
        let mut over = over;
        assert_eq!(over.contribute(5.0).unwrap().bonus_xp, 0);

        let mut negative = savings(100.0);
        negative.current = -40.0;
        negative.xp_reward = -10;
        let negative = negative.sanitized().unwrap();
        assert!(negative.current.abs() < f64::EPSILON);
        assert_eq!(negative.xp_reward, 0);
        assert!(!negative.completed);

        let mut broken = savings(100.0);
        broken.target = f64::NAN;
        assert!(broken.sanitized().is_none());
        let mut zero = savings(100.0);
        zero.target = 0.0;
        assert!(zero.sanitized().is_none());
    }
}
