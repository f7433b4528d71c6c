//! Storage boundary: wire records, the store trait, and debounced saves.
//!
//! Writes are last-write-wins per domain. Nothing is rolled back when a
//! save fails; the queue keeps the pending domains and reports a
//! retryable [`SyncStatus::Failed`].
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;

use crate::applications::Application;
use crate::constants::{LOG_PERSISTENCE, SAVE_DEBOUNCE_MS};
use crate::error::LifeError;
use crate::gauges::Gauges;
use crate::goals::Goal;
use crate::ledger::ActivityEvent;
use crate::zones::Zone;

/// Everything stored for one user. Timestamps travel as RFC 3339 strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    #[serde(default)]
    pub workouts: Vec<ActivityEvent>,
    #[serde(default)]
    pub transactions: Vec<ActivityEvent>,
    #[serde(default)]
    pub learning_sessions: Vec<ActivityEvent>,
    #[serde(default)]
    pub social_interactions: Vec<ActivityEvent>,
    #[serde(default)]
    pub networking_events: Vec<ActivityEvent>,
    #[serde(default)]
    pub time_wasters: Vec<ActivityEvent>,
    /// Mission, unlock, goal, and application XP events.
    #[serde(default)]
    pub progress_events: Vec<ActivityEvent>,
    #[serde(default)]
    pub savings_goals: Vec<Goal>,
    #[serde(default)]
    pub business_goals: Vec<Goal>,
    #[serde(default)]
    pub learning_goals: Vec<Goal>,
    #[serde(default)]
    pub public_commitments: Vec<Goal>,
    #[serde(default)]
    pub internship_applications: Vec<Application>,
    #[serde(default)]
    pub life_map: Vec<Zone>,
    #[serde(default)]
    pub gauges: Option<Gauges>,
}

/// A subset of domains to write. `None` leaves the stored domain alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workouts: Option<Vec<ActivityEvent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transactions: Option<Vec<ActivityEvent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_sessions: Option<Vec<ActivityEvent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_interactions: Option<Vec<ActivityEvent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub networking_events: Option<Vec<ActivityEvent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_wasters: Option<Vec<ActivityEvent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_events: Option<Vec<ActivityEvent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub savings_goals: Option<Vec<Goal>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_goals: Option<Vec<Goal>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_goals: Option<Vec<Goal>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_commitments: Option<Vec<Goal>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internship_applications: Option<Vec<Application>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub life_map: Option<Vec<Zone>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gauges: Option<Gauges>,
}

macro_rules! for_each_domain {
    ($apply:ident) => {
        $apply!(workouts);
        $apply!(transactions);
        $apply!(learning_sessions);
        $apply!(social_interactions);
        $apply!(networking_events);
        $apply!(time_wasters);
        $apply!(progress_events);
        $apply!(savings_goals);
        $apply!(business_goals);
        $apply!(learning_goals);
        $apply!(public_commitments);
        $apply!(internship_applications);
        $apply!(life_map);
    };
}

impl PartialRecord {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Fold a newer partial into this one; newer domains win.
    pub fn absorb(&mut self, newer: Self) {
        macro_rules! take {
            ($field:ident) => {
                if newer.$field.is_some() {
                    self.$field = newer.$field;
                }
            };
        }
        for_each_domain!(take);
        if newer.gauges.is_some() {
            self.gauges = newer.gauges;
        }
    }

    /// A partial carrying every domain of `record`.
    #[must_use]
    pub fn full(record: ProfileRecord) -> Self {
        macro_rules! wrap {
            ($field:ident) => {
                Some(record.$field)
            };
        }
        Self {
            workouts: wrap!(workouts),
            transactions: wrap!(transactions),
            learning_sessions: wrap!(learning_sessions),
            social_interactions: wrap!(social_interactions),
            networking_events: wrap!(networking_events),
            time_wasters: wrap!(time_wasters),
            progress_events: wrap!(progress_events),
            savings_goals: wrap!(savings_goals),
            business_goals: wrap!(business_goals),
            learning_goals: wrap!(learning_goals),
            public_commitments: wrap!(public_commitments),
            internship_applications: wrap!(internship_applications),
            life_map: wrap!(life_map),
            gauges: record.gauges,
        }
    }
}

impl ProfileRecord {
    /// Overwrite every domain present in `partial`.
    pub fn apply(&mut self, partial: &PartialRecord) {
        macro_rules! overwrite {
            ($field:ident) => {
                if let Some(value) = &partial.$field {
                    self.$field = value.clone();
                }
            };
        }
        for_each_domain!(overwrite);
        if partial.gauges.is_some() {
            self.gauges = partial.gauges;
        }
    }
}

/// Storage collaborator keyed by user id.
pub trait ProfileStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load a user's record.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read or parsed.
    fn load(&self, user_id: &str) -> Result<Option<ProfileRecord>, Self::Error>;

    /// Merge `partial` into the user's record.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn save(&self, user_id: &str, partial: &PartialRecord) -> Result<(), Self::Error>;
}

#[derive(Debug, Error)]
pub enum MemoryStoreError {
    #[error("store is offline")]
    Offline,
}

/// In-process store. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Rc<RefCell<HashMap<String, ProfileRecord>>>,
    offline: Rc<Cell<bool>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every call fails with `MemoryStoreError::Offline`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.set(offline);
    }

    #[must_use]
    pub fn snapshot(&self, user_id: &str) -> Option<ProfileRecord> {
        self.records.borrow().get(user_id).cloned()
    }
}

impl ProfileStore for MemoryStore {
    type Error = MemoryStoreError;

    fn load(&self, user_id: &str) -> Result<Option<ProfileRecord>, Self::Error> {
        if self.offline.get() {
            return Err(MemoryStoreError::Offline);
        }
        Ok(self.records.borrow().get(user_id).cloned())
    }

    fn save(&self, user_id: &str, partial: &PartialRecord) -> Result<(), Self::Error> {
        if self.offline.get() {
            return Err(MemoryStoreError::Offline);
        }
        self.records
            .borrow_mut()
            .entry(user_id.to_string())
            .or_default()
            .apply(partial);
        Ok(())
    }
}

/// What the UI should show about background saving.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SyncStatus {
    #[default]
    Idle,
    Pending,
    Synced {
        at: DateTime<Utc>,
    },
    Failed {
        message: String,
        retryable: bool,
    },
}

/// Coalesces partial writes and flushes them after a quiet window.
#[derive(Debug, Clone)]
pub struct SaveQueue {
    pending: PartialRecord,
    last_enqueued: Option<DateTime<Utc>>,
    window: Duration,
    status: SyncStatus,
}

impl Default for SaveQueue {
    fn default() -> Self {
        Self::new(Duration::milliseconds(SAVE_DEBOUNCE_MS))
    }
}

impl SaveQueue {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            pending: PartialRecord::default(),
            last_enqueued: None,
            window,
            status: SyncStatus::Idle,
        }
    }

    pub fn enqueue(&mut self, partial: PartialRecord, now: DateTime<Utc>) {
        if partial.is_empty() {
            return;
        }
        self.pending.absorb(partial);
        self.last_enqueued = Some(now);
        if !matches!(self.status, SyncStatus::Failed { .. }) {
            self.status = SyncStatus::Pending;
        }
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    #[must_use]
    pub const fn pending(&self) -> &PartialRecord {
        &self.pending
    }

    #[must_use]
    pub const fn status(&self) -> &SyncStatus {
        &self.status
    }

    /// True once the window has passed since the last enqueue.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.has_pending()
            && self
                .last_enqueued
                .is_none_or(|last| now.signed_duration_since(last) >= self.window)
    }

    /// Flush if the debounce window has elapsed. Returns whether a write
    /// was attempted and succeeded.
    ///
    /// # Errors
    ///
    /// Returns `LifeError::Persistence` when the store rejects the write.
    pub fn flush_due<S: ProfileStore>(
        &mut self,
        store: &S,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, LifeError> {
        if !self.is_due(now) {
            return Ok(false);
        }
        self.flush(store, user_id, now).map(|()| true)
    }

    /// Write everything pending right away. Also serves as the retry.
    ///
    /// # Errors
    ///
    /// Returns `LifeError::Persistence` when the store rejects the write;
    /// pending domains are kept for the next attempt.
    pub fn flush<S: ProfileStore>(
        &mut self,
        store: &S,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(), LifeError> {
        if !self.has_pending() {
            return Ok(());
        }
        match store.save(user_id, &self.pending) {
            Ok(()) => {
                log::debug!(target: LOG_PERSISTENCE, "saved profile for '{user_id}'");
                self.pending = PartialRecord::default();
                self.last_enqueued = None;
                self.status = SyncStatus::Synced { at: now };
                Ok(())
            }
            Err(err) => {
                let message = err.to_string();
                log::warn!(target: LOG_PERSISTENCE, "save for '{user_id}' failed: {message}");
                self.status = SyncStatus::Failed {
                    message: message.clone(),
                    retryable: true,
                };
                Err(LifeError::Persistence(message))
            }
        }
    }
}
