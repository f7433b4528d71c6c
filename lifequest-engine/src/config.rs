//! Engine tuning overrides.
use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    ENERGY_MAX, ENERGY_REGEN_PER_TICK, LEVEL_BASE_XP, MOOD_MAX, MOOD_REGEN_PER_TICK, MOOD_START,
    SAVE_DEBOUNCE_MS, ZONE_UNLOCK_BONUS_XP,
};
use crate::gauges::{Gauges, ResourceGauge};
use crate::level::LevelCurve;

/// Numeric knobs; any field missing from JSON falls back to its default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub level_base_xp: i64,
    pub zone_unlock_bonus_xp: i64,
    pub energy_max: i32,
    pub energy_regen_per_tick: i32,
    pub mood_max: i32,
    pub mood_start: i32,
    pub mood_regen_per_tick: i32,
    pub save_debounce_ms: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            level_base_xp: LEVEL_BASE_XP,
            zone_unlock_bonus_xp: ZONE_UNLOCK_BONUS_XP,
            energy_max: ENERGY_MAX,
            energy_regen_per_tick: ENERGY_REGEN_PER_TICK,
            mood_max: MOOD_MAX,
            mood_start: MOOD_START,
            mood_regen_per_tick: MOOD_REGEN_PER_TICK,
            save_debounce_ms: SAVE_DEBOUNCE_MS,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineConfigError {
    #[error("{field} must be at least {min} (got {value})")]
    MinViolation {
        field: &'static str,
        min: i64,
        value: i64,
    },
    #[error("{field} must be between {min} and {max} (got {value})")]
    RangeViolation {
        field: &'static str,
        min: i64,
        max: i64,
        value: i64,
    },
}

impl EngineConfig {
    /// # Errors
    ///
    /// Returns `EngineConfigError` when any field violates its bounds.
    pub fn validate(&self) -> Result<(), EngineConfigError> {
        min("level_base_xp", 1, self.level_base_xp)?;
        min("zone_unlock_bonus_xp", 0, self.zone_unlock_bonus_xp)?;
        min("energy_max", 1, i64::from(self.energy_max))?;
        min("energy_regen_per_tick", 0, i64::from(self.energy_regen_per_tick))?;
        min("mood_max", 1, i64::from(self.mood_max))?;
        min("mood_regen_per_tick", 0, i64::from(self.mood_regen_per_tick))?;
        min("save_debounce_ms", 0, self.save_debounce_ms)?;
        let mood_start = i64::from(self.mood_start);
        let mood_max = i64::from(self.mood_max);
        if !(0..=mood_max).contains(&mood_start) {
            return Err(EngineConfigError::RangeViolation {
                field: "mood_start",
                min: 0,
                max: mood_max,
                value: mood_start,
            });
        }
        Ok(())
    }

    #[must_use]
    pub const fn level_curve(&self) -> LevelCurve {
        LevelCurve {
            base_xp: self.level_base_xp,
        }
    }

    /// Fresh gauges: full energy, mood at its starting value.
    #[must_use]
    pub fn starting_gauges(&self) -> Gauges {
        let energy_max = self.energy_max;
        Gauges {
            energy: ResourceGauge::new(energy_max, energy_max, self.energy_regen_per_tick),
            mood: ResourceGauge::new(self.mood_start, self.mood_max, self.mood_regen_per_tick),
        }
    }

    #[must_use]
    pub fn save_window(&self) -> Duration {
        Duration::milliseconds(self.save_debounce_ms.max(0))
    }
}

fn min(field: &'static str, min: i64, value: i64) -> Result<(), EngineConfigError> {
    if value < min {
        return Err(EngineConfigError::MinViolation { field, min, value });
    }
    Ok(())
}
