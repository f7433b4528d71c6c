//! LifeQuest Engine
//!
//! Platform-agnostic progression rules for the LifeQuest life tracker.
//! Activities are priced into XP, recorded in a ledger, and rolled up into
//! levels, goals, applications and the LifeMap. Storage and rule data are
//! injected through [`RuleSource`] and [`ProfileStore`].

pub mod activity;
pub mod applications;
pub mod config;
pub mod constants;
pub mod error;
pub mod gauges;
pub mod goals;
pub mod ledger;
pub mod level;
pub mod numbers;
pub mod persistence;
pub mod rules;
pub mod session;
pub mod xp;
pub mod zones;

use chrono::{DateTime, Utc};
use thiserror::Error;

pub use activity::{
    Activity, ActivityKind, CashFlow, Category, Classification, ExpenseCategory, IncomeCategory,
    Intensity, LearningCategory, SocialCategory, TimeWaster, WorkoutType, classify,
};
pub use applications::{Application, ApplicationId, ApplicationStatus};
pub use config::{EngineConfig, EngineConfigError};
pub use error::{LifeError, Resource};
pub use gauges::{Gauges, ResourceGauge};
pub use goals::{Goal, GoalContribution, GoalId, GoalKind};
pub use ledger::{ActivityEvent, EventDraft, EventId, Ledger, Totals};
pub use level::{LevelCurve, LevelInfo};
pub use persistence::{
    MemoryStore, MemoryStoreError, PartialRecord, ProfileRecord, ProfileStore, SaveQueue,
    SyncStatus,
};
pub use rules::{GoalRules, RuleBook, RuleBookError};
pub use session::{ApplicationReceipt, LifeSession};
pub use xp::{compute_xp, price};
pub use zones::{LifeMap, LifeMapError, Mission, MissionOutcome, Zone, ZoneStatus};

use constants::LOG_PERSISTENCE;

/// Source of the rule book and the LifeMap template.
/// Platform-specific implementations decide where the JSON comes from.
pub trait RuleSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load and validate the rule book.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule data cannot be read or fails validation.
    fn load_rules(&self) -> Result<RuleBook, Self::Error>;

    /// Load and validate the LifeMap template for new profiles.
    ///
    /// # Errors
    ///
    /// Returns an error if the map data cannot be read or fails validation.
    fn load_life_map(&self) -> Result<LifeMap, Self::Error>;
}

#[derive(Debug, Error)]
pub enum RuleSourceError {
    #[error(transparent)]
    Rules(#[from] RuleBookError),
    #[error(transparent)]
    LifeMap(#[from] LifeMapError),
}

/// Rule data compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedRules;

impl RuleSource for EmbeddedRules {
    type Error = RuleSourceError;

    fn load_rules(&self) -> Result<RuleBook, Self::Error> {
        Ok(RuleBook::load_from_static()?)
    }

    fn load_life_map(&self) -> Result<LifeMap, Self::Error> {
        Ok(LifeMap::load_from_static()?)
    }
}

/// Creates, saves and loads sessions against injected collaborators.
pub struct LifeEngine<R, S>
where
    R: RuleSource,
    S: ProfileStore,
{
    rules: R,
    store: S,
    config: EngineConfig,
}

impl<R, S> LifeEngine<R, S>
where
    R: RuleSource,
    S: ProfileStore,
{
    /// Engine with default tuning.
    pub fn new(rules: R, store: S) -> Self {
        Self {
            rules,
            store,
            config: EngineConfig::default(),
        }
    }

    /// Engine with custom tuning.
    ///
    /// # Errors
    ///
    /// Returns `EngineConfigError` when `config` fails validation.
    pub fn with_config(
        rules: R,
        store: S,
        config: EngineConfig,
    ) -> Result<Self, EngineConfigError> {
        config.validate()?;
        Ok(Self {
            rules,
            store,
            config,
        })
    }

    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Start a fresh profile. Every domain is queued so the first flush
    /// writes a complete record.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule data cannot be loaded.
    pub fn create_session(
        &self,
        user_id: &str,
        at: DateTime<Utc>,
    ) -> Result<LifeSession, R::Error> {
        let rules = self.rules.load_rules()?;
        let map = self.rules.load_life_map()?;
        let mut session = LifeSession::new(user_id, rules, map, self.config);
        session.enqueue_full_save(at);
        Ok(session)
    }

    /// Flush the session's pending writes right away.
    ///
    /// # Errors
    ///
    /// Returns `LifeError::Persistence` when the store rejects the write.
    pub fn save_session(
        &self,
        session: &mut LifeSession,
        now: DateTime<Utc>,
    ) -> Result<(), LifeError> {
        session.flush(&self.store, now)
    }

    /// Flush the session's pending writes if the debounce window passed.
    ///
    /// # Errors
    ///
    /// Returns `LifeError::Persistence` when the store rejects the write.
    pub fn flush_due(
        &self,
        session: &mut LifeSession,
        now: DateTime<Utc>,
    ) -> Result<bool, LifeError> {
        session.flush_due(&self.store, now)
    }

    /// Load a stored profile into a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be loaded or rehydrated.
    pub fn load_session(&self, user_id: &str) -> Result<Option<LifeSession>, anyhow::Error>
    where
        R::Error: Into<anyhow::Error>,
        S::Error: Into<anyhow::Error>,
    {
        let Some(record) = self.store.load(user_id).map_err(Into::into)? else {
            return Ok(None);
        };
        // Rehydrate with fresh rules
        let rules = self.rules.load_rules().map_err(Into::into)?;
        let map = self.rules.load_life_map().map_err(Into::into)?;
        log::debug!(target: LOG_PERSISTENCE, "loaded profile for '{user_id}'");
        Ok(Some(LifeSession::from_record(
            user_id,
            record,
            rules,
            map,
            self.config,
        )))
    }

    /// Load the profile, or start a fresh one if none is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if loading fails or the rule data cannot be loaded.
    pub fn open_session(
        &self,
        user_id: &str,
        at: DateTime<Utc>,
    ) -> Result<LifeSession, anyhow::Error>
    where
        R::Error: Into<anyhow::Error>,
        S::Error: Into<anyhow::Error>,
    {
        match self.load_session(user_id)? {
            Some(session) => Ok(session),
            None => self.create_session(user_id, at).map_err(Into::into),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 2, 9, 0, 0).unwrap()
    }

    #[test]
    fn engine_creates_saves_and_reloads_sessions() {
        let engine = LifeEngine::new(EmbeddedRules, MemoryStore::new());
        let mut session = engine.create_session("ada", now()).unwrap();
        session
            .log_activity(
                &Activity::Workout {
                    workout: WorkoutType::Running,
                    intensity: Intensity::Intense,
                    minutes: 30.0,
                },
                now(),
            )
            .unwrap();
        engine.save_session(&mut session, now()).unwrap();

        let loaded = engine.load_session("ada").unwrap().expect("profile exists");
        assert_eq!(loaded.totals(), session.totals());
        assert_eq!(loaded.life_map().zones.len(), 6);
        assert!(engine.load_session("nobody").unwrap().is_none());
    }

    #[test]
    fn open_session_falls_back_to_fresh_profile() {
        let engine = LifeEngine::new(EmbeddedRules, MemoryStore::new());
        let session = engine.open_session("new-user", now()).unwrap();
        assert_eq!(session.level(), 1);
        assert!(session.save_queue().has_pending());
    }

    #[test]
    fn offline_store_surfaces_through_anyhow() {
        let store = MemoryStore::new();
        store.set_offline(true);
        let engine = LifeEngine::new(EmbeddedRules, store);
        let err = engine.load_session("ada").err().expect("store is offline");
        assert!(err.to_string().contains("offline"));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = EngineConfig {
            energy_max: 0,
            ..EngineConfig::default()
        };
        assert!(LifeEngine::with_config(EmbeddedRules, MemoryStore::new(), config).is_err());
    }
}
