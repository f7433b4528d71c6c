//! LifeMap: level-gated zones holding one-time missions.
//!
//! Zone status is derived, never stored:
//! `Locked -> Unlockable` once the level and prerequisite allow it,
//! `Unlockable -> Unlocked` only through [`LifeMap::unlock`], and
//! `Unlocked -> Completed` as soon as every mission is done.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::constants::LOG_LIFEMAP;
use crate::error::{LifeError, Resource};
use crate::gauges::Gauges;

const DEFAULT_LIFEMAP_DATA: &str = include_str!("../assets/lifemap.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mission {
    pub id: String,
    pub title: String,
    pub xp_reward: i64,
    pub energy_cost: i32,
    pub mood_effect: i32,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub required_level: u32,
    /// Zone that must be unlocked first.
    #[serde(default)]
    pub prerequisite: Option<String>,
    #[serde(default)]
    pub unlocked: bool,
    pub missions: Vec<Mission>,
}

impl Zone {
    /// Whole percent of missions completed.
    #[must_use]
    pub fn progress_pct(&self) -> u8 {
        if self.missions.is_empty() {
            return 100;
        }
        let done = self.missions.iter().filter(|m| m.completed).count();
        u8::try_from(done * 100 / self.missions.len()).unwrap_or(100)
    }

    #[must_use]
    pub fn all_missions_done(&self) -> bool {
        self.missions.iter().all(|m| m.completed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneStatus {
    Locked,
    Unlockable,
    Unlocked,
    Completed,
}

/// Deltas produced by completing a mission. All zero on a repeat call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MissionOutcome {
    pub xp_delta: i64,
    pub energy_delta: i32,
    pub mood_delta: i32,
    /// True when this mission finished its zone.
    pub zone_completed: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifeMapError {
    #[error("duplicate zone id '{0}'")]
    DuplicateZone(String),
    #[error("duplicate mission id '{mission}' in zone '{zone}'")]
    DuplicateMission { zone: String, mission: String },
    #[error("zone '{zone}' lists prerequisite '{prerequisite}' which is not declared before it")]
    UnknownPrerequisite { zone: String, prerequisite: String },
    #[error("mission '{mission}' has negative {field}")]
    NegativeValue {
        mission: String,
        field: &'static str,
    },
    #[error("life map JSON is malformed: {0}")]
    Json(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LifeMap {
    pub zones: Vec<Zone>,
}

impl LifeMap {
    /// Parse and validate a map.
    ///
    /// # Errors
    ///
    /// Returns `LifeMapError` when the JSON is malformed or the graph is
    /// inconsistent.
    pub fn from_json(json: &str) -> Result<Self, LifeMapError> {
        let map: Self =
            serde_json::from_str(json).map_err(|e| LifeMapError::Json(e.to_string()))?;
        map.validate()?;
        Ok(map)
    }

    /// The map bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns `LifeMapError` if the embedded asset is invalid.
    pub fn load_from_static() -> Result<Self, LifeMapError> {
        Self::from_json(DEFAULT_LIFEMAP_DATA)
    }

    /// Ids must be unique and prerequisites must point at an earlier zone,
    /// which keeps the unlock graph acyclic.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn validate(&self) -> Result<(), LifeMapError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for zone in &self.zones {
            if let Some(prerequisite) = zone.prerequisite.as_deref()
                && !seen.contains(prerequisite)
            {
                return Err(LifeMapError::UnknownPrerequisite {
                    zone: zone.id.clone(),
                    prerequisite: prerequisite.to_string(),
                });
            }
            if !seen.insert(zone.id.as_str()) {
                return Err(LifeMapError::DuplicateZone(zone.id.clone()));
            }
            let mut missions: HashSet<&str> = HashSet::new();
            for mission in &zone.missions {
                if !missions.insert(mission.id.as_str()) {
                    return Err(LifeMapError::DuplicateMission {
                        zone: zone.id.clone(),
                        mission: mission.id.clone(),
                    });
                }
                if mission.energy_cost < 0 {
                    return Err(LifeMapError::NegativeValue {
                        mission: mission.id.clone(),
                        field: "energyCost",
                    });
                }
                if mission.xp_reward < 0 {
                    return Err(LifeMapError::NegativeValue {
                        mission: mission.id.clone(),
                        field: "xpReward",
                    });
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn zone(&self, zone_id: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == zone_id)
    }

    fn zone_index(&self, zone_id: &str) -> Result<usize, LifeError> {
        self.zones
            .iter()
            .position(|z| z.id == zone_id)
            .ok_or_else(|| LifeError::not_found("zone", zone_id))
    }

    /// Derived status of a zone at `level`.
    ///
    /// # Errors
    ///
    /// Returns `LifeError::NotFound` for an unknown zone.
    pub fn status(&self, zone_id: &str, level: u32) -> Result<ZoneStatus, LifeError> {
        let zone = &self.zones[self.zone_index(zone_id)?];
        Ok(self.status_of(zone, level))
    }

    fn status_of(&self, zone: &Zone, level: u32) -> ZoneStatus {
        if zone.unlocked {
            if zone.all_missions_done() {
                ZoneStatus::Completed
            } else {
                ZoneStatus::Unlocked
            }
        } else if level >= zone.required_level && self.prerequisite_met(zone) {
            ZoneStatus::Unlockable
        } else {
            ZoneStatus::Locked
        }
    }

    fn prerequisite_met(&self, zone: &Zone) -> bool {
        zone.prerequisite
            .as_deref()
            .is_none_or(|id| self.zone(id).is_some_and(|p| p.unlocked))
    }

    /// Statuses of every zone, in map order.
    #[must_use]
    pub fn overview(&self, level: u32) -> Vec<(&str, ZoneStatus)> {
        self.zones
            .iter()
            .map(|z| (z.id.as_str(), self.status_of(z, level)))
            .collect()
    }

    /// Unlock a zone, returning `bonus_xp` the first time and 0 afterwards.
    ///
    /// # Errors
    ///
    /// Returns `LifeError::NotFound` for an unknown zone and
    /// `LifeError::ZoneNotUnlockable` while it is still locked.
    pub fn unlock(&mut self, zone_id: &str, level: u32, bonus_xp: i64) -> Result<i64, LifeError> {
        let index = self.zone_index(zone_id)?;
        match self.status_of(&self.zones[index], level) {
            ZoneStatus::Unlocked | ZoneStatus::Completed => Ok(0),
            ZoneStatus::Locked => Err(LifeError::ZoneNotUnlockable {
                zone: zone_id.to_string(),
                required_level: self.zones[index].required_level,
                level,
            }),
            ZoneStatus::Unlockable => {
                self.zones[index].unlocked = true;
                log::info!(target: LOG_LIFEMAP, "zone '{zone_id}' unlocked (+{bonus_xp} XP)");
                Ok(bonus_xp)
            }
        }
    }

    /// Complete a mission, paying its XP and applying its energy and mood
    /// effects exactly once.
    ///
    /// # Errors
    ///
    /// Returns `LifeError::NotFound` for unknown ids, `LifeError::ZoneLocked`
    /// when the zone is not unlocked, and
    /// `LifeError::InsufficientResource` when energy is below the cost; in
    /// every error case nothing changes.
    pub fn complete_mission(
        &mut self,
        zone_id: &str,
        mission_id: &str,
        gauges: &mut Gauges,
    ) -> Result<MissionOutcome, LifeError> {
        let index = self.zone_index(zone_id)?;
        let zone = &mut self.zones[index];
        let Some(mission) = zone.missions.iter_mut().find(|m| m.id == mission_id) else {
            return Err(LifeError::not_found("mission", mission_id));
        };
        if !zone.unlocked {
            return Err(LifeError::ZoneLocked(zone_id.to_string()));
        }
        if mission.completed {
            return Ok(MissionOutcome::default());
        }

        let energy_delta = gauges.energy.spend(Resource::Energy, mission.energy_cost)?;
        let mood_delta = gauges.mood.adjust(mission.mood_effect);
        mission.completed = true;
        let xp_delta = mission.xp_reward;
        log::info!(
            target: LOG_LIFEMAP,
            "mission '{mission_id}' in '{zone_id}' completed (+{xp_delta} XP)"
        );

        let zone_completed = zone.all_missions_done();
        if zone_completed {
            log::info!(target: LOG_LIFEMAP, "zone '{zone_id}' completed");
        }
        Ok(MissionOutcome {
            xp_delta,
            energy_delta,
            mood_delta,
            zone_completed,
        })
    }
}
