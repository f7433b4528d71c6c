//! Bounded Energy and Mood gauges.
use serde::{Deserialize, Serialize};

use crate::constants::{
    ENERGY_MAX, ENERGY_REGEN_PER_TICK, LOG_GAUGES, MOOD_MAX, MOOD_REGEN_PER_TICK, MOOD_START,
};
use crate::error::{LifeError, Resource};

/// A value held within `[0, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "GaugeRecord")]
pub struct ResourceGauge {
    value: i32,
    max: i32,
    regen_per_tick: i32,
}

/// Unchecked wire shape; rehydration goes through [`ResourceGauge::new`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GaugeRecord {
    value: i32,
    max: i32,
    regen_per_tick: i32,
}

impl From<GaugeRecord> for ResourceGauge {
    fn from(record: GaugeRecord) -> Self {
        Self::new(record.value, record.max, record.regen_per_tick)
    }
}

impl ResourceGauge {
    /// Build a gauge; `max` and `regen_per_tick` floor at zero and `value`
    /// is clamped into range.
    #[must_use]
    pub fn new(value: i32, max: i32, regen_per_tick: i32) -> Self {
        let max = max.max(0);
        Self {
            value: value.clamp(0, max),
            max,
            regen_per_tick: regen_per_tick.max(0),
        }
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.value
    }

    #[must_use]
    pub const fn max(&self) -> i32 {
        self.max
    }

    #[must_use]
    pub const fn regen_per_tick(&self) -> i32 {
        self.regen_per_tick
    }

    /// Regenerate `ticks` times; returns the applied change.
    pub fn tick(&mut self, ticks: u32) -> i32 {
        let gain = i64::from(self.regen_per_tick).saturating_mul(i64::from(ticks));
        let gain = i32::try_from(gain).unwrap_or(i32::MAX);
        self.adjust(gain)
    }

    /// Move by `delta`, clamping to `[0, max]`; returns the applied change.
    pub fn adjust(&mut self, delta: i32) -> i32 {
        let before = self.value;
        self.value = before.saturating_add(delta).clamp(0, self.max);
        self.value - before
    }

    #[must_use]
    pub const fn can_spend(&self, cost: i32) -> bool {
        self.value >= cost
    }

    /// Deduct `cost` in full or not at all.
    ///
    /// # Errors
    ///
    /// Returns `LifeError::InsufficientResource` when `value < cost`.
    pub fn spend(&mut self, resource: Resource, cost: i32) -> Result<i32, LifeError> {
        let cost = cost.max(0);
        if !self.can_spend(cost) {
            return Err(LifeError::InsufficientResource {
                resource,
                needed: cost,
                available: self.value,
            });
        }
        self.value -= cost;
        Ok(-cost)
    }
}

/// Energy and Mood as one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gauges {
    pub energy: ResourceGauge,
    pub mood: ResourceGauge,
}

impl Default for Gauges {
    fn default() -> Self {
        Self {
            energy: ResourceGauge::new(ENERGY_MAX, ENERGY_MAX, ENERGY_REGEN_PER_TICK),
            mood: ResourceGauge::new(MOOD_START, MOOD_MAX, MOOD_REGEN_PER_TICK),
        }
    }
}

impl Gauges {
    /// Advance time; both gauges regenerate.
    pub fn tick(&mut self, ticks: u32) {
        let energy = self.energy.tick(ticks);
        let mood = self.mood.tick(ticks);
        log::debug!(target: LOG_GAUGES, "tick x{ticks}: energy {energy:+}, mood {mood:+}");
    }
}
