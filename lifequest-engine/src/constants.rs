//! Centralized tuning constants for LifeQuest progression logic.
//!
//! Category tables live in `assets/rules.json`; the values here cover the
//! numeric defaults that shape gauges, levels, and persistence batching.
//! Every default can be overridden through [`crate::EngineConfig`].

// Logging targets ----------------------------------------------------------
pub(crate) const LOG_XP: &str = "lifequest::xp";
pub(crate) const LOG_LEDGER: &str = "lifequest::ledger";
pub(crate) const LOG_LEVEL: &str = "lifequest::level";
pub(crate) const LOG_GOALS: &str = "lifequest::goals";
pub(crate) const LOG_APPLICATIONS: &str = "lifequest::applications";
pub(crate) const LOG_LIFEMAP: &str = "lifequest::lifemap";
pub(crate) const LOG_GAUGES: &str = "lifequest::gauges";
pub(crate) const LOG_PERSISTENCE: &str = "lifequest::persistence";
pub(crate) const LOG_RULES: &str = "lifequest::rules";

// Workout tuning -----------------------------------------------------------
pub(crate) const WORKOUT_BLOCK_MINUTES: f64 = 15.0;
pub(crate) const WORKOUT_BLOCK_XP: i64 = 10;

// Learning tuning ----------------------------------------------------------
pub(crate) const LEARNING_BLOCK_MINUTES: f64 = 30.0;
pub(crate) const LEARNING_BLOCK_XP: i64 = 15;
pub(crate) const LEARNING_QUALITY_SLOPE: f64 = 0.2;
pub(crate) const LEARNING_QUALITY_OFFSET: f64 = 0.6;

// Social tuning ------------------------------------------------------------
pub(crate) const SOCIAL_BLOCK_MINUTES: f64 = 30.0;
pub(crate) const SOCIAL_BLOCK_XP: f64 = 10.0;
pub(crate) const SOCIAL_QUALITY_SLOPE: f64 = 0.3;
pub(crate) const SOCIAL_QUALITY_OFFSET: f64 = 0.7;

// Quality ratings are 1-5 stars.
pub(crate) const QUALITY_MIN: f64 = 1.0;
pub(crate) const QUALITY_MAX: f64 = 5.0;

// Goals --------------------------------------------------------------------
// Relative gap to the target still treated as reached.
pub(crate) const GOAL_COMPLETION_TOLERANCE: f64 = 1e-9;

// Level curve --------------------------------------------------------------
pub(crate) const LEVEL_BASE_XP: i64 = 500;

// LifeMap ------------------------------------------------------------------
pub(crate) const ZONE_UNLOCK_BONUS_XP: i64 = 100;

// Gauges -------------------------------------------------------------------
pub(crate) const ENERGY_MAX: i32 = 100;
pub(crate) const ENERGY_REGEN_PER_TICK: i32 = 5;
pub(crate) const MOOD_MAX: i32 = 100;
pub(crate) const MOOD_START: i32 = 70;
pub(crate) const MOOD_REGEN_PER_TICK: i32 = 2;

// Persistence --------------------------------------------------------------
pub(crate) const SAVE_DEBOUNCE_MS: i64 = 750;
