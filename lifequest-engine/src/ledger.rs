//! Append-only record of XP-affecting events with running totals.
use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::activity::ActivityKind;
use crate::constants::LOG_LEDGER;

/// Identifier assigned by the ledger on append.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub u64);

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "evt-{}", self.0)
    }
}

/// An event as stored in the ledger. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEvent {
    pub id: EventId,
    pub kind: ActivityKind,
    pub category: String,
    pub magnitude: f64,
    pub timestamp: DateTime<Utc>,
    pub xp_delta: i64,
}

/// Event contents before the ledger assigns an id.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub kind: ActivityKind,
    pub category: String,
    pub magnitude: f64,
    pub timestamp: DateTime<Utc>,
    pub xp_delta: i64,
}

/// Aggregated XP: `earned` and `lost` are both non-negative and
/// `net == earned - lost`, so `net` always fits once the other two do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Totals {
    pub earned: i64,
    pub lost: i64,
    pub net: i64,
}

impl Totals {
    /// Totals with `delta` added, or `None` if `earned` or `lost` would overflow.
    fn with(self, delta: i64) -> Option<Self> {
        let (earned, lost) = if delta >= 0 {
            (self.earned.checked_add(delta)?, self.lost)
        } else {
            (self.earned, self.lost.checked_add(delta.checked_neg()?)?)
        };
        Some(Self {
            earned,
            lost,
            net: earned - lost,
        })
    }

    // Only deltas already folded in are reverted, so neither side underflows.
    fn revert(&mut self, delta: i64) {
        if delta >= 0 {
            self.earned = self.earned.saturating_sub(delta).max(0);
        } else {
            self.lost = self.lost.saturating_add(delta).max(0);
        }
        self.net = self.earned - self.lost;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    events: Vec<ActivityEvent>,
    next_id: u64,
    totals: Totals,
}

impl Ledger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from stored events, recomputing totals. Events whose
    /// delta no longer fits the totals are dropped.
    #[must_use]
    pub fn from_events(mut events: Vec<ActivityEvent>) -> Self {
        events.sort_by_key(|e| e.id);
        let next_id = events.last().map_or(0, |e| e.id.0.saturating_add(1));
        let mut totals = Totals::default();
        events.retain(|event| match totals.with(event.xp_delta) {
            Some(next) => {
                totals = next;
                true
            }
            None => {
                log::warn!(
                    target: LOG_LEDGER,
                    "dropped stored {} ({:+} XP): totals would overflow",
                    event.id,
                    event.xp_delta
                );
                false
            }
        });
        Self {
            events,
            next_id,
            totals,
        }
    }

    /// Whether `delta` can be recorded without overflowing the totals.
    #[must_use]
    pub fn has_room_for(&self, delta: i64) -> bool {
        self.totals.with(delta).is_some()
    }

    /// Append an event and return the stored copy; `None` (and nothing
    /// recorded) when its delta would overflow the totals.
    pub fn record(&mut self, draft: EventDraft) -> Option<ActivityEvent> {
        self.totals = self.totals.with(draft.xp_delta)?;
        let event = ActivityEvent {
            id: EventId(self.next_id),
            kind: draft.kind,
            category: draft.category,
            magnitude: draft.magnitude,
            timestamp: draft.timestamp,
            xp_delta: draft.xp_delta,
        };
        self.next_id = self.next_id.saturating_add(1);
        log::debug!(
            target: LOG_LEDGER,
            "recorded {} {:?} '{}' {:+} XP",
            event.id,
            event.kind,
            event.category,
            event.xp_delta
        );
        self.events.push(event.clone());
        Some(event)
    }

    /// Delete an event, returning the correction that reverses its delta.
    pub fn remove(&mut self, id: EventId) -> Option<i64> {
        let index = self.events.iter().position(|e| e.id == id)?;
        let event = self.events.remove(index);
        self.totals.revert(event.xp_delta);
        log::debug!(target: LOG_LEDGER, "removed {} ({:+} XP reversed)", id, -event.xp_delta);
        Some(-event.xp_delta)
    }

    #[must_use]
    pub const fn totals(&self) -> Totals {
        self.totals
    }

    #[must_use]
    pub fn get(&self, id: EventId) -> Option<&ActivityEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    #[must_use]
    pub fn events(&self) -> &[ActivityEvent] {
        &self.events
    }

    pub fn events_of(&self, kind: ActivityKind) -> impl Iterator<Item = &ActivityEvent> {
        self.events.iter().filter(move |e| e.kind == kind)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Consecutive days with at least one XP-earning event.
    ///
    /// The run must end today or yesterday; an older run counts as broken.
    #[must_use]
    pub fn streak_days(&self, today: NaiveDate) -> u32 {
        let active: BTreeSet<NaiveDate> = self
            .events
            .iter()
            .filter(|e| e.xp_delta > 0)
            .map(|e| e.timestamp.date_naive())
            .collect();

        let mut cursor = if active.contains(&today) {
            today
        } else {
            match today.checked_sub_days(Days::new(1)) {
                Some(yesterday) if active.contains(&yesterday) => yesterday,
                _ => return 0,
            }
        };

        let mut streak = 0;
        while active.contains(&cursor) {
            streak += 1;
            match cursor.checked_sub_days(Days::new(1)) {
                Some(prev) => cursor = prev,
                None => break,
            }
        }
        streak
    }
}
