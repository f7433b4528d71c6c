//! Declarative XP tables.
//!
//! The rule book is plain data: a base reward, multiplier, or penalty per
//! category. It is loaded once at startup and validated so that every
//! category variant has an entry; lookups after validation never miss.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::activity::{
    ExpenseCategory, IncomeCategory, Intensity, LearningCategory, SocialCategory, TimeWaster,
    WorkoutType,
};
use crate::applications::ApplicationStatus;
use crate::constants::LOG_RULES;
use crate::goals::GoalKind;

const DEFAULT_RULES_DATA: &str = include_str!("../assets/rules.json");

/// Goal payout tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GoalRules {
    /// Default completion reward per goal kind, used when a goal is
    /// created without an explicit reward.
    pub rewards: BTreeMap<GoalKind, i64>,
    /// XP deducted once when a public commitment is marked failed.
    #[serde(default)]
    pub commitment_penalty: i64,
}

/// Complete set of pricing tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RuleBook {
    /// Base XP per workout type.
    pub workouts: BTreeMap<WorkoutType, i64>,
    pub intensities: BTreeMap<Intensity, f64>,
    /// XP per currency unit of income.
    pub income: BTreeMap<IncomeCategory, f64>,
    /// XP lost per currency unit spent; zero for essentials.
    pub expenses: BTreeMap<ExpenseCategory, f64>,
    pub learning: BTreeMap<LearningCategory, i64>,
    pub social: BTreeMap<SocialCategory, i64>,
    /// XP lost per hour.
    pub time_wasters: BTreeMap<TimeWaster, i64>,
    pub applications: BTreeMap<ApplicationStatus, i64>,
    pub goals: GoalRules,
}

#[derive(Debug, Error)]
pub enum RuleBookError {
    #[error("rule table '{table}' is missing category '{key}'")]
    MissingCategory {
        table: &'static str,
        key: &'static str,
    },
    #[error("rule table '{table}' has invalid value {value} for '{key}' (must be finite and >= 0)")]
    InvalidValue {
        table: &'static str,
        key: &'static str,
        value: f64,
    },
    #[error("rule book JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

impl RuleBook {
    /// Parse and validate a rule book from JSON.
    ///
    /// # Errors
    ///
    /// Returns `RuleBookError` when the JSON is malformed or any table is
    /// incomplete or carries a negative value.
    pub fn from_json(json: &str) -> Result<Self, RuleBookError> {
        let rules: Self = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Load the rule book bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns `RuleBookError` if the embedded asset fails validation.
    pub fn load_from_static() -> Result<Self, RuleBookError> {
        Self::from_json(DEFAULT_RULES_DATA)
    }

    /// Check every table against the full list of its category variants.
    ///
    /// # Errors
    ///
    /// Returns the first missing or invalid entry found.
    pub fn validate(&self) -> Result<(), RuleBookError> {
        check_table("workouts", &self.workouts, WorkoutType::ALL, WorkoutType::key)?;
        check_table("intensities", &self.intensities, Intensity::ALL, Intensity::key)?;
        check_table("income", &self.income, IncomeCategory::ALL, IncomeCategory::key)?;
        check_table("expenses", &self.expenses, ExpenseCategory::ALL, ExpenseCategory::key)?;
        check_table("learning", &self.learning, LearningCategory::ALL, LearningCategory::key)?;
        check_table("social", &self.social, SocialCategory::ALL, SocialCategory::key)?;
        check_table("time_wasters", &self.time_wasters, TimeWaster::ALL, TimeWaster::key)?;
        check_table(
            "applications",
            &self.applications,
            ApplicationStatus::ALL,
            ApplicationStatus::key,
        )?;
        check_table("goals.rewards", &self.goals.rewards, GoalKind::ALL, GoalKind::key)?;
        if self.goals.commitment_penalty < 0 {
            return Err(RuleBookError::InvalidValue {
                table: "goals",
                key: "commitment_penalty",
                value: crate::numbers::i64_to_f64(self.goals.commitment_penalty),
            });
        }
        log::debug!(target: LOG_RULES, "rule book validated");
        Ok(())
    }

    #[must_use]
    pub fn workout_base(&self, workout: WorkoutType) -> i64 {
        self.workouts.get(&workout).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn intensity_multiplier(&self, intensity: Intensity) -> f64 {
        self.intensities.get(&intensity).copied().unwrap_or(1.0)
    }

    #[must_use]
    pub fn income_multiplier(&self, category: IncomeCategory) -> f64 {
        self.income.get(&category).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn expense_penalty_rate(&self, category: ExpenseCategory) -> f64 {
        self.expenses.get(&category).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn learning_base(&self, category: LearningCategory) -> i64 {
        self.learning.get(&category).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn social_base(&self, category: SocialCategory) -> i64 {
        self.social.get(&category).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn penalty_per_hour(&self, category: TimeWaster) -> i64 {
        self.time_wasters.get(&category).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn application_reward(&self, status: ApplicationStatus) -> i64 {
        self.applications.get(&status).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn goal_reward(&self, kind: GoalKind) -> i64 {
        self.goals.rewards.get(&kind).copied().unwrap_or_default()
    }

    #[must_use]
    pub const fn commitment_penalty(&self) -> i64 {
        self.goals.commitment_penalty
    }
}

/// Values a rule table may hold.
trait RuleValue: Copy {
    fn as_f64(self) -> f64;
}

impl RuleValue for i64 {
    fn as_f64(self) -> f64 {
        crate::numbers::i64_to_f64(self)
    }
}

impl RuleValue for f64 {
    fn as_f64(self) -> f64 {
        self
    }
}

fn check_table<K, V>(
    table: &'static str,
    entries: &BTreeMap<K, V>,
    all: &[K],
    key: fn(K) -> &'static str,
) -> Result<(), RuleBookError>
where
    K: Ord + Copy,
    V: RuleValue,
{
    for &category in all {
        let Some(value) = entries.get(&category) else {
            return Err(RuleBookError::MissingCategory {
                table,
                key: key(category),
            });
        };
        let value = value.as_f64();
        if !value.is_finite() || value < 0.0 {
            return Err(RuleBookError::InvalidValue {
                table,
                key: key(category),
                value,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_rules_validate() {
        let rules = RuleBook::load_from_static().unwrap();
        assert_eq!(rules.workout_base(WorkoutType::GymWorkout), 100);
        assert!((rules.intensity_multiplier(Intensity::Moderate) - 1.5).abs() < f64::EPSILON);
        assert_eq!(rules.penalty_per_hour(TimeWaster::SocialMediaReels), 50);
        assert_eq!(rules.application_reward(ApplicationStatus::Offer), 200);
        assert_eq!(rules.goal_reward(GoalKind::Savings), 500);
    }

    #[test]
    fn missing_category_is_named() {
        let mut rules = RuleBook::load_from_static().unwrap();
        rules.time_wasters.remove(&TimeWaster::Gossip);
        let err = rules.validate().unwrap_err();
        assert!(
            matches!(
                err,
                RuleBookError::MissingCategory {
                    table: "time_wasters",
                    key: "gossip"
                }
            ),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn negative_multiplier_rejected() {
        let mut rules = RuleBook::load_from_static().unwrap();
        rules.income.insert(IncomeCategory::Salary, -0.5);
        assert!(matches!(
            rules.validate(),
            Err(RuleBookError::InvalidValue { table: "income", .. })
        ));
    }

    #[test]
    fn malformed_json_reports_parse_error() {
        assert!(matches!(
            RuleBook::from_json("{ not json"),
            Err(RuleBookError::Json(_))
        ));
        assert!(matches!(
            RuleBook::from_json("{}"),
            Err(RuleBookError::Json(_))
        ));
    }
}
